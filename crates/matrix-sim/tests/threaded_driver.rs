//! Producer and refresh driver on separate threads
#![allow(clippy::expect_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use matrix_layer::{Layer, LayerConfig, Rgb24, Rgb48};
use matrix_sim::{DriverConfig, Frame, GammaLut, RefreshDriver};

const W: u16 = 32;
const H: u16 = 16;

#[test]
fn last_frame_shows_last_swap() {
    let mut mem = vec![Rgb24::BLACK; 2 * usize::from(W) * usize::from(H)];
    let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
    let (mut canvas, refresher) = layer.split();
    let stop = AtomicBool::new(false);

    let config = DriverConfig::default()
        .with_underlay(Rgb48::BLACK)
        .with_frame_period(Duration::from_millis(1));
    let mut driver = RefreshDriver::new(refresher, GammaLut::default(), config);

    let last: Frame = std::thread::scope(|s| {
        let consumer = s.spawn(|| {
            let mut last = None;
            driver.run_until(&stop, |frame| last = Some(frame.clone()));
            last.expect("at least one frame")
        });

        for x in 0..8 {
            let mut raster = canvas.raster();
            raster.fill_screen(Rgb24::BLACK);
            raster.fill_rectangle(x, 4, x + 3, 7, Rgb24::WHITE);
            canvas.swap_buffers(false);
        }
        while canvas.is_swap_pending() {
            std::thread::yield_now();
        }
        stop.store(true, Ordering::Release);
        consumer.join().expect("driver thread")
    });

    // final rectangle spans x = 7..=10 on rows 4..=7
    assert_eq!(last.count_not(Rgb24::BLACK), 4 * 4);
    assert_eq!(last.pixel(7, 4), Some(Rgb24::WHITE));
    assert_eq!(last.pixel(10, 7), Some(Rgb24::WHITE));
    assert_eq!(last.pixel(6, 4), Some(Rgb24::BLACK));
    assert!(driver.frames() >= 8);
}

#[test]
fn overlay_lines_limit_chroma_keying() {
    let mut mem = vec![Rgb24::BLACK; 2 * 8 * 4];
    let mut layer = Layer::new(&mut mem, LayerConfig::new(8, 4)).expect("fits");
    let (mut canvas, refresher) = layer.split();

    let mut raster = canvas.raster();
    raster.fill_screen(Rgb24::RED);
    raster.fill_rectangle(0, 0, 3, 3, Rgb24::BLACK);
    canvas.set_chroma_key(Rgb24::BLACK);
    canvas.set_overlay_lines(2, 1);
    canvas.swap_buffers(false);

    let config = DriverConfig::default().with_underlay(Rgb48::GREEN);
    let mut driver = RefreshDriver::new(refresher, GammaLut::new(1.0), config);
    let frame = driver.tick();

    // rows outside the overlay band keep the underlay
    assert!(frame.row(0).expect("row 0").iter().all(|p| *p == Rgb24::GREEN));
    assert!(frame.row(3).expect("row 3").iter().all(|p| *p == Rgb24::GREEN));
    for y in 1..=2 {
        let row = frame.row(y).expect("band row");
        assert!(row[..4].iter().all(|p| *p == Rgb24::GREEN));
        assert!(row[4..].iter().all(|p| *p == Rgb24::RED));
    }
}
