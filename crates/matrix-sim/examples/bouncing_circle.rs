//! Bouncing circle over a blue underlay
//!
//! A producer thread animates a circle and a caption while the refresh
//! driver composites frames on the main thread. Every tenth frame is written
//! to the system temp directory as a PNG.
//!
//! ```text
//! RUST_LOG=debug cargo run -p matrix-sim --example bouncing_circle
//! ```

#![allow(missing_docs, clippy::arithmetic_side_effects)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use matrix_layer::{Layer, LayerConfig, Rgb24, Rgb48, Rotation};
use matrix_sim::{init_tracing, DriverConfig, GammaLut, RefreshDriver};

const WIDTH: u16 = 64;
const HEIGHT: u16 = 32;
const RADIUS: u16 = 5;
const FRAMES: u32 = 120;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = LayerConfig::new(WIDTH, HEIGHT).with_rotation(Rotation::Deg0);
    let mut layer = Layer::<Rgb24>::allocate(config).context("allocating layer")?;
    let (mut canvas, refresher) = layer.split();
    canvas.set_chroma_key(Rgb24::BLACK);

    let out_dir = std::env::temp_dir().join("matrix-sim-bouncing");
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let driver_config = DriverConfig::default()
        .with_underlay(Rgb48::new(0, 0, 0x4000))
        .with_frame_period(Duration::from_millis(16));
    let mut driver = RefreshDriver::new(refresher, GammaLut::default(), driver_config);
    let stop = AtomicBool::new(false);

    let mut saved = 0u32;
    let mut write_error = None;
    std::thread::scope(|s| {
        s.spawn(|| {
            let (mut x, mut y) = (i32::from(RADIUS), i32::from(RADIUS));
            let (mut dx, mut dy) = (1, 1);
            let max_x = i32::from(WIDTH) - 1 - i32::from(RADIUS);
            let max_y = i32::from(HEIGHT) - 1 - i32::from(RADIUS);

            for frame in 0..FRAMES {
                let mut raster = canvas.raster();
                raster.fill_screen(Rgb24::BLACK);
                raster.fill_circle_outlined(x, y, RADIUS, Rgb24::WHITE, Rgb24::RED);
                raster.draw_string(1, 1, Rgb24::GREEN, &format!("{frame:03}"));
                canvas.swap_buffers(false);

                if x <= i32::from(RADIUS) || x >= max_x {
                    dx = -dx;
                }
                if y <= i32::from(RADIUS) || y >= max_y {
                    dy = -dy;
                }
                x += dx;
                y += dy;
            }
            while canvas.is_swap_pending() {
                std::thread::yield_now();
            }
            stop.store(true, Ordering::Release);
        });

        driver.run_until(&stop, |frame| {
            if driver_frame_is_sampled(saved) && write_error.is_none() {
                let path = out_dir.join(format!("frame-{saved:04}.png"));
                if let Err(err) = frame.save_png(&path) {
                    write_error = Some(err);
                }
            }
            saved += 1;
        });
    });

    if let Some(err) = write_error {
        return Err(err);
    }
    tracing::info!(frames = driver.frames(), dir = %out_dir.display(), "done");
    Ok(())
}

fn driver_frame_is_sampled(index: u32) -> bool {
    index % 10 == 0
}
