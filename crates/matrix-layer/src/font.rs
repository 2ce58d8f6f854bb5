//! Glyph and bitmap resources consumed by the rasterizer
//!
//! The layer never owns glyph data. A font is anything that can report its
//! fixed glyph size and answer "is this bit set" for a glyph cell; the
//! built-in choices are the ASCII tables shipped with `embedded-graphics`.

use embedded_graphics::image::GetPixel;
use embedded_graphics::mono_font::{ascii, MonoFont};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{OriginDimensions, Point};

/// Fixed-size bitmap font contract.
pub trait BitmapFont {
    /// Glyph cell width in pixels (also the horizontal advance).
    fn glyph_width(&self) -> u32;

    /// Glyph cell height in pixels.
    fn glyph_height(&self) -> u32;

    /// `true` if the pixel at `(x, y)` inside the cell for `ch` is set.
    ///
    /// Coordinates outside the cell return `false`.
    fn glyph_pixel(&self, ch: char, x: u32, y: u32) -> bool;
}

impl BitmapFont for MonoFont<'_> {
    fn glyph_width(&self) -> u32 {
        self.character_size.width
    }

    fn glyph_height(&self) -> u32 {
        self.character_size.height
    }

    // Glyphs are packed left-to-right, top-to-bottom in the font image;
    // all quantities are bounded by the image size, which fits in i32.
    #[allow(
        clippy::arithmetic_side_effects,
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap
    )]
    fn glyph_pixel(&self, ch: char, x: u32, y: u32) -> bool {
        let cell = self.character_size;
        if x >= cell.width || y >= cell.height || cell.width == 0 {
            return false;
        }
        let glyphs_per_row = self.image.size().width / cell.width;
        if glyphs_per_row == 0 {
            return false;
        }
        let index = self.glyph_mapping.index(ch) as u32;
        let row = index / glyphs_per_row;
        let col = index % glyphs_per_row;
        let px = col * cell.width + x;
        let py = row * cell.height + y;
        self.image.pixel(Point::new(px as i32, py as i32)) == Some(BinaryColor::On)
    }
}

/// Font identifiers resolvable to a glyph table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FontChoice {
    /// 4×6 ASCII.
    #[default]
    Font4x6,
    /// 5×7 ASCII.
    Font5x7,
    /// 5×8 ASCII.
    Font5x8,
    /// 6×9 ASCII.
    Font6x9,
    /// 6×10 ASCII.
    Font6x10,
    /// 6×12 ASCII.
    Font6x12,
    /// 6×13 ASCII.
    Font6x13,
    /// 7×13 ASCII.
    Font7x13,
    /// 8×13 ASCII.
    Font8x13,
    /// 9×15 ASCII.
    Font9x15,
    /// 10×20 ASCII.
    Font10x20,
}

impl FontChoice {
    /// Look up the glyph table for this identifier.
    pub fn mono_font(self) -> MonoFont<'static> {
        match self {
            Self::Font4x6 => ascii::FONT_4X6,
            Self::Font5x7 => ascii::FONT_5X7,
            Self::Font5x8 => ascii::FONT_5X8,
            Self::Font6x9 => ascii::FONT_6X9,
            Self::Font6x10 => ascii::FONT_6X10,
            Self::Font6x12 => ascii::FONT_6X12,
            Self::Font6x13 => ascii::FONT_6X13,
            Self::Font7x13 => ascii::FONT_7X13,
            Self::Font8x13 => ascii::FONT_8X13,
            Self::Font9x15 => ascii::FONT_9X15,
            Self::Font10x20 => ascii::FONT_10X20,
        }
    }
}

/// A 1bpp bitmap, rows padded to whole bytes, MSB first.
#[derive(Debug, Clone, Copy)]
pub struct MonoBitmap<'a> {
    width: u16,
    height: u16,
    data: &'a [u8],
}

impl<'a> MonoBitmap<'a> {
    /// Wrap `data` as a `width × height` bitmap.
    ///
    /// Bits past the end of `data` read as unset.
    pub const fn new(width: u16, height: u16, data: &'a [u8]) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Bitmap width in pixels.
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Bitmap height in pixels.
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Bytes per row.
    pub const fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// `true` if the bit at `(x, y)` is set.
    // x < width and y < height are checked; stride * height bounds the index.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn pixel(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = usize::from(y) * self.stride() + usize::from(x / 8);
        let mask = 0x80u8 >> (x % 8);
        self.data.get(byte).is_some_and(|b| b & mask != 0)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
