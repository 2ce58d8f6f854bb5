//! Refresh driver configuration

use std::time::Duration;

use matrix_layer::Rgb48;

/// Settings of a [`RefreshDriver`](crate::RefreshDriver).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverConfig {
    /// Scanline content the layer is composited over (the layers beneath).
    pub underlay: Rgb48,

    /// Time between frames in [`RefreshDriver::run_until`](crate::RefreshDriver::run_until).
    pub frame_period: Duration,
}

impl Default for DriverConfig {
    /// Black underlay, ~60 frames per second.
    fn default() -> Self {
        Self {
            underlay: Rgb48::BLACK,
            frame_period: Duration::from_millis(16),
        }
    }
}

impl DriverConfig {
    /// Set the underlay colour.
    #[must_use]
    pub fn with_underlay(mut self, underlay: Rgb48) -> Self {
        self.underlay = underlay;
        self
    }

    /// Set the frame period.
    #[must_use]
    pub fn with_frame_period(mut self, frame_period: Duration) -> Self {
        self.frame_period = frame_period;
        self
    }
}
