//! Gamma-curve colour-correction tables
//!
//! LED brightness is roughly linear in drive current while perceived
//! brightness is not, so panels are usually driven through a power curve
//! `out = in^gamma`. [`GammaLut`] rebuilds that table for the layer's depth
//! at every frame boundary.

use matrix_layer::{LutBuilder, PixelDepth};

/// Power-curve LUT builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaLut {
    /// Exponent of the curve; 1.0 is linear.
    pub gamma: f32,
}

impl Default for GammaLut {
    fn default() -> Self {
        Self { gamma: 2.2 }
    }
}

impl GammaLut {
    /// Builder for a given exponent.
    pub fn new(gamma: f32) -> Self {
        Self { gamma }
    }

    /// Curve value for `index` in a table of `len` entries.
    #[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
    pub fn level(&self, index: usize, len: usize) -> u16 {
        let max = len.saturating_sub(1).max(1) as f32;
        let x = (index as f32 / max).clamp(0.0, 1.0);
        (x.powf(self.gamma) * f32::from(u16::MAX)).round() as u16
    }
}

impl LutBuilder for GammaLut {
    fn build(&mut self, lut: &mut [u16], _brightness: u8, depth: PixelDepth) {
        let len = depth.lut_len();
        for (index, entry) in lut.iter_mut().enumerate() {
            *entry = self.level(index, len);
        }
    }
}
