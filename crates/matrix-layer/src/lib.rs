//! Background pixel layer for scan-driven RGB LED matrices
//!
//! One compositable layer of a multi-layer matrix driver: the application
//! draws into a *draw* buffer while a hardware-timed refresh process reads the
//! *refresh* buffer one physical scanline at a time and blends it into the
//! output row.
//!
//! # Architecture
//!
//! ```text
//!  application (producer)                 refresh ISR / thread (consumer)
//!         │                                        │
//!      Canvas ── Rasterizer ── CoordinateMapper    Refresher
//!         │            │                           │      │
//!         │      draw buffer ◄── SwapCoordinator ──► refresh buffer
//!         │                                        │
//!         └── brightness / chroma key ───────► ColorPipeline ──► output row
//! ```
//!
//! A [`Layer`] owns both pixel buffers and is [`split`](Layer::split) into a
//! [`Canvas`] (drawing, swap requests, layer settings) and a [`Refresher`]
//! (buffer exchange, LUT regeneration, row compositing). The two halves share
//! only atomics; buffer ownership is partitioned by role.
//!
//! # Pixel depth
//!
//! The layer is generic over [`LayerPixel`], implemented for [`Rgb24`]
//! (8 bits per channel, 256-entry LUT) and [`Rgb48`] (16 bits per channel,
//! 4096-entry LUT). The depth is a compile-time parameter, so the compositing
//! loop is monomorphised with no indirect calls.
//!
//! # Features
//!
//! - `alloc` (default): [`Layer::allocate`] for internally allocated storage
//! - `std`: `std::error::Error` impls, waits yield the thread
//! - `serde`: `Serialize`/`Deserialize` on [`LayerConfig`]
//! - `defmt`: `defmt::Format` derives and log statements
//!
//! # Example
//!
//! ```
//! use matrix_layer::{Layer, LayerConfig, Rgb24, Rgb48};
//!
//! let mut storage = [Rgb24::BLACK; 2 * 32 * 16];
//! let mut layer = Layer::new(&mut storage, LayerConfig::new(32, 16)).unwrap();
//! let (mut canvas, mut refresher) = layer.split();
//!
//! canvas.raster().fill_circle(16, 8, 5, Rgb24::WHITE);
//! canvas.swap_buffers(false);
//! refresher.exchange_if_pending();
//!
//! let mut row = [Rgb48::BLACK; 32];
//! refresher.fill_refresh_row(8, &mut row, 0);
//! assert_eq!(row[16], Rgb48::WHITE);
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)] // drawing calls return (); accessors are cheap
#![allow(clippy::similar_names)] // x0/x1/y0/y1 geometry naming

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod buffer;
pub mod config;
mod draw_target;
pub mod error;
pub mod font;
pub mod layer;
pub mod pipeline;
pub mod pixel;
pub mod raster;
pub mod rotation;
pub mod swap;

pub use config::LayerConfig;
pub use error::LayerError;
pub use font::{BitmapFont, FontChoice, MonoBitmap};
pub use layer::{Canvas, Layer, Refresher};
pub use pipeline::{ChromaKey, ColorPipeline, IdentityLut, LutBuilder};
pub use pixel::{LayerPixel, PixelDepth, Rgb24, Rgb48, ScanlinePixel};
pub use raster::Rasterizer;
pub use rotation::{CoordinateMapper, Rotation};
pub use swap::{SwapCoordinator, SwapState};

/// Largest brightness shift count the LUT indexing supports.
pub const MAX_BRIGHTNESS_SHIFTS: u8 = 4;

/// Brightness of a freshly constructed layer (fully opaque).
pub const DEFAULT_BRIGHTNESS: u8 = 255;
