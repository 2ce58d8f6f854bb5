//! Desktop refresh driver for the matrix layer
//!
//! Stands in for the hardware timer that, on a real panel, fires once per
//! scanline. A [`RefreshDriver`] owns the consumer half of a layer and, once
//! per simulated frame:
//!
//! - runs the frame-boundary callback (buffer exchange, LUT rebuild)
//! - composites every physical row over a configurable underlay colour
//! - collects the rows into a [`Frame`] that can be inspected or saved as PNG
//!
//! # Example
//!
//! ```no_run
//! use matrix_layer::{Layer, LayerConfig, Rgb24};
//! use matrix_sim::{DriverConfig, GammaLut, RefreshDriver};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut layer = Layer::<Rgb24>::allocate(LayerConfig::new(64, 32))?;
//! let (mut canvas, refresher) = layer.split();
//! let mut driver = RefreshDriver::new(refresher, GammaLut::default(), DriverConfig::default());
//!
//! canvas.raster().draw_string(1, 1, Rgb24::WHITE, "hello");
//! canvas.swap_buffers(false);
//!
//! let frame = driver.tick();
//! frame.save_png("hello.png")?;
//! # Ok(())
//! # }
//! ```

// Desktop crate: casts in colour conversion and frame indexing are bounded
// by u16 panel sizes.
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

mod config;
mod driver;
mod frame;
mod gamma;
mod logging;

pub use config::DriverConfig;
pub use driver::RefreshDriver;
pub use frame::Frame;
pub use gamma::GammaLut;
pub use logging::init_tracing;
