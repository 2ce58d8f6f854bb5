//! End-to-end tests: draw, swap, composite.
//! Each test drives both layer handles the way a frame driver would.

#![allow(clippy::indexing_slicing, clippy::expect_used)]

use matrix_layer::{IdentityLut, Layer, LayerConfig, Rgb24, Rgb48, Rotation};

const W: u16 = 32;
const H: u16 = 16;
const LEN: usize = (W as usize) * (H as usize);

#[test]
fn filled_circle_reaches_row_eight_after_swap() {
    let mut mem = vec![Rgb24::WHITE; 2 * LEN];
    let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("storage fits");
    let (mut canvas, mut refresher) = layer.split();

    canvas.raster().fill_circle(16, 8, 5, Rgb24::WHITE);
    canvas.swap_buffers(false);
    refresher.frame_refresh_callback(&mut IdentityLut);

    let underlay = Rgb48::new(0x1234, 0x5678, 0x9ABC);
    let mut row = [underlay; W as usize];
    refresher.fill_refresh_row(8, &mut row, 0);

    for (x, px) in row.iter().enumerate() {
        if (11..=21).contains(&x) {
            assert_eq!(*px, Rgb48::WHITE, "column {x}");
        } else {
            // black pixels are opaque at full brightness
            assert_eq!(*px, Rgb48::BLACK, "column {x}");
        }
    }
}

#[test]
fn filled_circle_with_chroma_key_leaves_background_alone() {
    let mut mem = vec![Rgb24::BLACK; 2 * LEN];
    let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("storage fits");
    let (mut canvas, mut refresher) = layer.split();

    canvas.set_chroma_key(Rgb24::BLACK);
    canvas.raster().fill_circle(16, 8, 5, Rgb24::WHITE);
    canvas.swap_buffers(false);
    refresher.frame_refresh_callback(&mut IdentityLut);

    let underlay = Rgb24::new(10, 20, 30);
    let mut row = [underlay; W as usize];
    refresher.fill_refresh_row(8, &mut row, 0);
    for (x, px) in row.iter().enumerate() {
        let want = if (11..=21).contains(&x) {
            Rgb24::WHITE
        } else {
            underlay
        };
        assert_eq!(*px, want, "column {x}");
    }
}

#[test]
fn zero_brightness_never_touches_output() {
    let mut mem = vec![Rgb24::BLACK; 2 * LEN];
    let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H).with_brightness(0))
        .expect("storage fits");
    let (mut canvas, mut refresher) = layer.split();

    canvas.raster().fill_screen(Rgb24::RED);
    canvas.swap_buffers(false);
    refresher.frame_refresh_callback(&mut IdentityLut);
    for y in 0..H {
        let mut row = [Rgb48::new(1, 2, 3); W as usize];
        refresher.fill_refresh_row(y, &mut row, 2);
        assert!(row.iter().all(|p| *p == Rgb48::new(1, 2, 3)), "row {y}");
    }
}

#[test]
fn rotated_drawing_lands_on_physical_scanline() {
    let mut mem = vec![Rgb24::BLACK; 2 * LEN];
    let mut layer = Layer::new(
        &mut mem,
        LayerConfig::new(W, H).with_rotation(Rotation::Deg180),
    )
    .expect("storage fits");
    let (mut canvas, mut refresher) = layer.split();

    // logical (0, 0) is the physical bottom-right corner under 180°
    canvas.raster().draw_pixel(0, 0, Rgb24::BLUE);
    canvas.swap_buffers(false);
    refresher.exchange_if_pending();

    let mut row = [Rgb24::BLACK; W as usize];
    refresher.fill_refresh_row(H - 1, &mut row, 0);
    assert_eq!(row[usize::from(W) - 1], Rgb24::BLUE);
}

#[test]
fn swap_exchanges_roles_exactly_once() {
    let mut mem = vec![Rgb24::BLACK; 2 * LEN];
    let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("storage fits");
    let (mut canvas, mut refresher) = layer.split();

    canvas.raster().fill_screen(Rgb24::GREEN);
    canvas.swap_buffers(false);
    assert!(refresher.is_layer_changed());
    assert!(refresher.exchange_if_pending());
    assert!(!refresher.exchange_if_pending());
    assert!(!canvas.is_swap_pending());

    // the drawn frame is now refreshed, the old refresh buffer is drawn on
    assert!(refresher
        .refresh_row(0)
        .expect("row 0")
        .iter()
        .all(|p| *p == Rgb24::GREEN));
    assert!(canvas.back_buffer().iter().all(|p| *p == Rgb24::BLACK));
}

#[test]
fn copying_swap_replicates_frame_into_new_draw_buffer() {
    let mut mem = vec![Rgb24::BLACK; 2 * LEN];
    let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("storage fits");
    let (mut canvas, mut refresher) = layer.split();

    std::thread::scope(|s| {
        let consumer = s.spawn(move || {
            let mut exchanges = 0;
            while exchanges < 2 {
                if refresher.exchange_if_pending() {
                    exchanges += 1;
                }
                std::thread::yield_now();
            }
            refresher
        });

        canvas.raster().fill_round_rectangle(2, 2, 29, 13, 4, Rgb24::RED);
        canvas.swap_buffers(true);
        // incremental drawing on top of the copied frame
        canvas.raster().draw_pixel(0, 0, Rgb24::BLUE);
        canvas.swap_buffers(true);

        let refresher = consumer.join().expect("consumer thread");
        let refreshed: Vec<Rgb24> = (0..H)
            .flat_map(|y| refresher.refresh_row(y).expect("row").to_vec())
            .collect();
        assert_eq!(canvas.real_back_buffer(), refreshed.as_slice());
        assert_eq!(refreshed[0], Rgb24::BLUE);
        assert_eq!(refreshed[2 * usize::from(W) + 16], Rgb24::RED);
    });
}

#[test]
fn allocated_layer_composites_48_bit_pixels() {
    let mut layer = Layer::<Rgb48>::allocate(LayerConfig::new(8, 2)).expect("allocates");
    let (mut canvas, mut refresher) = layer.split();

    canvas.raster().draw_fast_hline(0, 7, 1, Rgb48::new(0x8000, 0, 0xFFFF));
    canvas.swap_buffers(false);
    refresher.frame_refresh_callback(&mut IdentityLut);

    let mut row = [Rgb24::BLACK; 8];
    refresher.fill_refresh_row(1, &mut row, 0);
    assert!(row.iter().all(|p| p.red == 0x80 && p.blue == 0xFF));
}
