//! Composited frame snapshots

use std::path::Path;

use anyhow::Context;
use image::{Rgb, RgbImage};
use matrix_layer::{Rgb24, Rgb48};

/// One fully composited frame, in physical row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    pixels: Vec<Rgb24>,
}

impl Frame {
    /// Assemble a frame from 48-bit scanlines, narrowing to 8 bits per channel.
    pub(crate) fn from_rows(width: u16, height: u16, rows: &[Rgb48]) -> Self {
        Self {
            width,
            height,
            pixels: rows.iter().copied().map(Rgb24::from).collect(),
        }
    }

    /// Physical width.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Physical height.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// All pixels, row-major.
    pub fn pixels(&self) -> &[Rgb24] {
        &self.pixels
    }

    /// Pixel at physical `(x, y)`.
    #[allow(clippy::arithmetic_side_effects)] // bounds checked first
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb24> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = usize::from(y) * usize::from(self.width) + usize::from(x);
        self.pixels.get(index).copied()
    }

    /// Physical row `y`.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn row(&self, y: u16) -> Option<&[Rgb24]> {
        let width = usize::from(self.width);
        let start = usize::from(y) * width;
        self.pixels.get(start..start + width)
    }

    /// Number of pixels that differ from `color`.
    pub fn count_not(&self, color: Rgb24) -> usize {
        self.pixels.iter().filter(|p| **p != color).count()
    }

    /// Convert to an `image` RGB buffer.
    pub fn to_image(&self) -> RgbImage {
        let width = u32::from(self.width);
        RgbImage::from_fn(width, u32::from(self.height), |x, y| {
            let px = self
                .pixel(x as u16, y as u16)
                .unwrap_or(Rgb24::BLACK);
            Rgb([px.red, px.green, px.blue])
        })
    }

    /// Write the frame as a PNG file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be created or encoded.
    pub fn save_png(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        self.to_image()
            .save(path)
            .with_context(|| format!("failed to write frame to {}", path.display()))?;
        tracing::debug!(path = %path.display(), "frame saved");
        Ok(())
    }
}
