//! Layer construction and configuration errors

/// Errors returned by layer construction and buffer operations.
///
/// Drawing never fails: out-of-bounds coordinates are clipped. Only setup
/// and whole-buffer operations can report an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerError {
    /// Width or height is zero.
    InvalidDimensions {
        /// Requested physical width.
        width: u16,
        /// Requested physical height.
        height: u16,
    },
    /// Caller-provided storage cannot hold both buffers.
    StorageTooSmall {
        /// Pixels needed (`2 × width × height`).
        required: usize,
        /// Pixels provided.
        actual: usize,
    },
    /// A replacement back buffer does not match the panel size.
    BackBufferSize {
        /// Pixels in one buffer.
        expected: usize,
        /// Pixels provided.
        actual: usize,
    },
    /// Allocating the pixel buffers failed.
    OutOfMemory {
        /// Pixels requested.
        pixels: usize,
    },
}

#[cfg(feature = "std")]
impl std::error::Error for LayerError {}

impl core::fmt::Display for LayerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "Invalid layer dimensions {width}x{height}")
            }
            Self::StorageTooSmall { required, actual } => {
                write!(
                    f,
                    "Layer storage too small: need {required} pixels, got {actual}"
                )
            }
            Self::BackBufferSize { expected, actual } => {
                write!(
                    f,
                    "Back buffer size mismatch: expected {expected} pixels, got {actual}"
                )
            }
            Self::OutOfMemory { pixels } => {
                write!(f, "Failed to allocate {pixels} layer pixels")
            }
        }
    }
}
