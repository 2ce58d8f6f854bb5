//! Layer configuration
//!
//! A [`LayerConfig`] describes a layer before it exists: physical panel
//! size, rotation and the initial values of the producer-side settings.

use crate::error::LayerError;
use crate::font::FontChoice;
use crate::rotation::Rotation;
use crate::DEFAULT_BRIGHTNESS;

/// Construction-time settings of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayerConfig {
    /// Physical panel width in pixels
    pub width: u16,

    /// Physical panel height in pixels
    pub height: u16,

    /// Rotation applied to drawing coordinates
    pub rotation: Rotation,

    /// Initial brightness (0 = transparent, 255 = opaque)
    pub brightness: u8,

    /// Whether compositing passes pixels through the correction LUT
    pub color_correction: bool,

    /// Font used by `draw_char` / `draw_string`
    pub font: FontChoice,
}

impl Default for LayerConfig {
    /// A 32×32 panel, unrotated, fully opaque, colour-corrected.
    fn default() -> Self {
        Self::new(32, 32)
    }
}

impl LayerConfig {
    /// Configuration for a `width × height` physical panel with default
    /// settings.
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            rotation: Rotation::Deg0,
            brightness: DEFAULT_BRIGHTNESS,
            color_correction: true,
            font: FontChoice::Font4x6,
        }
    }

    /// Set the rotation.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the initial brightness.
    #[must_use]
    pub const fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    /// Enable or disable colour correction.
    #[must_use]
    pub const fn with_color_correction(mut self, enabled: bool) -> Self {
        self.color_correction = enabled;
        self
    }

    /// Set the text font.
    #[must_use]
    pub const fn with_font(mut self, font: FontChoice) -> Self {
        self.font = font;
        self
    }

    /// Pixels in one buffer.
    // u16 × u16 × 2 fits in usize on 32-bit and wider targets
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn buffer_len(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Pixels needed for both buffers.
    #[allow(clippy::arithmetic_side_effects)]
    pub const fn storage_len(&self) -> usize {
        self.buffer_len() * 2
    }

    /// Check the dimensions are usable.
    pub fn validate(&self) -> Result<(), LayerError> {
        if self.width == 0 || self.height == 0 {
            return Err(LayerError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
