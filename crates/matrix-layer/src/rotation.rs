//! Logical-to-physical coordinate mapping
//!
//! The application draws in *logical* coordinates, which are rotated relative
//! to the panel. Pixels are stored in *physical* (hardware) order, row-major,
//! `physical_width` pixels per row.
//!
//! With physical width `W` and height `H`:
//!
//! | Rotation | `(hwx, hwy)`          | Logical size |
//! |----------|-----------------------|--------------|
//! | 0°       | `(x, y)`              | `W × H`      |
//! | 90°      | `(W-1-y, x)`          | `H × W`      |
//! | 180°     | `(W-1-x, H-1-y)`      | `W × H`      |
//! | 270°     | `(y, H-1-x)`          | `H × W`      |
//!
//! The mapping function is chosen once when the mapper is built and stored
//! as a plain function pointer, so the per-pixel path never re-branches on
//! the rotation.

// Logical coordinates are bounds-checked against dimensions that fit in u16
// before any subtraction, so none of the arithmetic below can overflow i32.
#![allow(
    clippy::arithmetic_side_effects,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

/// Panel rotation of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    /// No rotation.
    #[default]
    Deg0,
    /// 90° clockwise.
    Deg90,
    /// 180°.
    Deg180,
    /// 270° clockwise.
    Deg270,
}

impl Rotation {
    /// All four rotations, in increasing angle.
    pub const ALL: [Self; 4] = [Self::Deg0, Self::Deg90, Self::Deg180, Self::Deg270];

    /// `true` when logical width/height are the physical height/width.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    /// Rotation angle in degrees.
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

type MapFn = fn(i32, i32, i32, i32) -> (i32, i32);

fn map_deg0(x: i32, y: i32, _w: i32, _h: i32) -> (i32, i32) {
    (x, y)
}

fn map_deg90(x: i32, y: i32, w: i32, _h: i32) -> (i32, i32) {
    (w - 1 - y, x)
}

fn map_deg180(x: i32, y: i32, w: i32, h: i32) -> (i32, i32) {
    (w - 1 - x, h - 1 - y)
}

fn map_deg270(x: i32, y: i32, _w: i32, h: i32) -> (i32, i32) {
    (y, h - 1 - x)
}

/// Translates logical coordinates into physical buffer coordinates.
#[derive(Clone, Copy)]
pub struct CoordinateMapper {
    rotation: Rotation,
    physical_width: u16,
    physical_height: u16,
    map: MapFn,
}

impl core::fmt::Debug for CoordinateMapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CoordinateMapper")
            .field("rotation", &self.rotation)
            .field("physical_width", &self.physical_width)
            .field("physical_height", &self.physical_height)
            .finish_non_exhaustive()
    }
}

impl CoordinateMapper {
    /// Build a mapper for a panel of the given physical size.
    pub fn new(physical_width: u16, physical_height: u16, rotation: Rotation) -> Self {
        let map: MapFn = match rotation {
            Rotation::Deg0 => map_deg0,
            Rotation::Deg90 => map_deg90,
            Rotation::Deg180 => map_deg180,
            Rotation::Deg270 => map_deg270,
        };
        Self {
            rotation,
            physical_width,
            physical_height,
            map,
        }
    }

    /// The same panel with a different rotation.
    #[must_use]
    pub fn rotated(&self, rotation: Rotation) -> Self {
        Self::new(self.physical_width, self.physical_height, rotation)
    }

    /// Rotation this mapper applies.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Physical (hardware) width in pixels.
    pub fn physical_width(&self) -> u16 {
        self.physical_width
    }

    /// Physical (hardware) height in pixels.
    pub fn physical_height(&self) -> u16 {
        self.physical_height
    }

    /// Logical width in pixels, as seen by drawing calls.
    pub fn logical_width(&self) -> u16 {
        if self.rotation.swaps_axes() {
            self.physical_height
        } else {
            self.physical_width
        }
    }

    /// Logical height in pixels, as seen by drawing calls.
    pub fn logical_height(&self) -> u16 {
        if self.rotation.swaps_axes() {
            self.physical_width
        } else {
            self.physical_height
        }
    }

    /// `true` if `(x, y)` lies inside the logical rectangle.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0
            && y >= 0
            && x < i32::from(self.logical_width())
            && y < i32::from(self.logical_height())
    }

    /// Map a logical coordinate to `(hwx, hwy)`, or `None` when it falls
    /// outside the logical rectangle.
    #[inline]
    pub fn to_physical(&self, x: i32, y: i32) -> Option<(usize, usize)> {
        if !self.contains(x, y) {
            return None;
        }
        let (hwx, hwy) = (self.map)(
            x,
            y,
            i32::from(self.physical_width),
            i32::from(self.physical_height),
        );
        Some((hwx as usize, hwy as usize))
    }

    /// Map a logical coordinate straight to its index in the physical,
    /// row-major pixel buffer.
    #[inline]
    pub fn to_index(&self, x: i32, y: i32) -> Option<usize> {
        self.to_physical(x, y)
            .map(|(hwx, hwy)| hwy * usize::from(self.physical_width) + hwx)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn logical_size_swaps_for_quarter_turns() {
        let m = CoordinateMapper::new(32, 16, Rotation::Deg90);
        assert_eq!((m.logical_width(), m.logical_height()), (16, 32));
        let m = m.rotated(Rotation::Deg180);
        assert_eq!((m.logical_width(), m.logical_height()), (32, 16));
    }

    #[test]
    fn corners_map_to_physical_corners() {
        let (w, h) = (8u16, 4u16);
        let pw = usize::from(w) - 1;
        let ph = usize::from(h) - 1;
        let cases = [
            (Rotation::Deg0, [(0, 0), (pw, 0), (0, ph), (pw, ph)]),
            (Rotation::Deg90, [(pw, 0), (pw, ph), (0, 0), (0, ph)]),
            (Rotation::Deg180, [(pw, ph), (0, ph), (pw, 0), (0, 0)]),
            (Rotation::Deg270, [(0, ph), (0, 0), (pw, ph), (pw, 0)]),
        ];
        for (rotation, expected) in cases {
            let m = CoordinateMapper::new(w, h, rotation);
            let lw = i32::from(m.logical_width()) - 1;
            let lh = i32::from(m.logical_height()) - 1;
            let corners = [(0, 0), (lw, 0), (0, lh), (lw, lh)];
            for ((x, y), want) in corners.into_iter().zip(expected) {
                assert_eq!(
                    m.to_physical(x, y),
                    Some(want),
                    "{rotation:?} logical ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn out_of_bounds_is_none() {
        let m = CoordinateMapper::new(8, 4, Rotation::Deg270);
        assert_eq!(m.to_physical(-1, 0), None);
        assert_eq!(m.to_physical(0, 8), None);
        assert_eq!(m.to_physical(4, 0), None);
        assert!(m.to_physical(3, 7).is_some());
    }

    #[test]
    fn index_is_row_major_in_physical_space() {
        let m = CoordinateMapper::new(8, 4, Rotation::Deg0);
        assert_eq!(m.to_index(3, 2), Some(2 * 8 + 3));
        let m = m.rotated(Rotation::Deg90);
        // (x=1, y=2) -> (hwx = 8-1-2 = 5, hwy = 1)
        assert_eq!(m.to_index(1, 2), Some(8 + 5));
    }
}
