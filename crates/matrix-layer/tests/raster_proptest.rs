//! Property-based tests for coordinate mapping and rasterization.
//! Checks invariants across rotations, panel sizes and shape coordinates.

#![allow(
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::expect_used,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use matrix_layer::{CoordinateMapper, Rasterizer, Rgb24, Rotation};

const PANEL_W: u16 = 20;
const PANEL_H: u16 = 14;

fn rotation(index: usize) -> Rotation {
    Rotation::ALL[index % Rotation::ALL.len()]
}

fn blank() -> Vec<Rgb24> {
    vec![Rgb24::BLACK; usize::from(PANEL_W) * usize::from(PANEL_H)]
}

type Point = (i32, i32);

fn fill_and_outline(rotation: Rotation, [a, b, c]: [Point; 3]) -> Vec<Rgb24> {
    let mut buf = blank();
    let mut r = Rasterizer::new(&mut buf, CoordinateMapper::new(PANEL_W, PANEL_H, rotation));
    r.fill_triangle(a.0, a.1, b.0, b.1, c.0, c.1, Rgb24::WHITE);
    r.draw_triangle(a.0, a.1, b.0, b.1, c.0, c.1, Rgb24::WHITE);
    buf
}

/// Margin of the oversized panel used as an unclipped reference.
const MARGIN: i32 = 100;

/// Draw on a panel large enough that nothing clips, translated by
/// `MARGIN`, then crop back to the visible panel.
fn unclipped_reference(draw: impl Fn(&mut Rasterizer<'_, Rgb24>, i32)) -> Vec<Rgb24> {
    let big_w = PANEL_W + 2 * MARGIN as u16;
    let big_h = PANEL_H + 2 * MARGIN as u16;
    let mut big = vec![Rgb24::BLACK; usize::from(big_w) * usize::from(big_h)];
    let mut r = Rasterizer::new(&mut big, CoordinateMapper::new(big_w, big_h, Rotation::Deg0));
    draw(&mut r, MARGIN);

    let mut out = blank();
    for y in 0..i32::from(PANEL_H) {
        for x in 0..i32::from(PANEL_W) {
            let px = r.read_pixel(x + MARGIN, y + MARGIN).expect("inside big panel");
            out[(y * i32::from(PANEL_W) + x) as usize] = px;
        }
    }
    out
}

proptest::proptest! {
    /// Every logical pixel maps to a distinct physical pixel inside the panel.
    #[test]
    fn mapper_is_a_bijection(w in 1u16..24, h in 1u16..24, rot in 0usize..4) {
        let m = CoordinateMapper::new(w, h, rotation(rot));
        let total = usize::from(w) * usize::from(h);
        let mut seen = vec![false; total];
        for y in 0..i32::from(m.logical_height()) {
            for x in 0..i32::from(m.logical_width()) {
                let index = m.to_index(x, y).expect("logical coordinate in range");
                assert!(index < total, "({x}, {y}) -> {index} out of {total}");
                assert!(!seen[index], "({x}, {y}) collides at {index}");
                seen[index] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    /// fill_rectangle paints exactly the normalised rectangle, clipped.
    #[test]
    fn fill_rectangle_paints_exact_region(
        x0 in -6i32..26, y0 in -6i32..26,
        x1 in -6i32..26, y1 in -6i32..26,
        rot in 0usize..4,
    ) {
        let mut buf = blank();
        let mut r = Rasterizer::new(&mut buf, CoordinateMapper::new(PANEL_W, PANEL_H, rotation(rot)));
        r.fill_rectangle(x0, y0, x1, y1, Rgb24::RED);

        let (lx, hx) = (x0.min(x1), x0.max(x1));
        let (ly, hy) = (y0.min(y1), y0.max(y1));
        for y in 0..i32::from(r.mapper().logical_height()) {
            for x in 0..i32::from(r.mapper().logical_width()) {
                let inside = (lx..=hx).contains(&x) && (ly..=hy).contains(&y);
                let want = if inside { Rgb24::RED } else { Rgb24::BLACK };
                assert_eq!(r.read_pixel(x, y), Some(want), "({x}, {y})");
            }
        }
    }

    /// Filled-plus-outlined triangles do not depend on vertex order.
    #[test]
    fn triangle_is_permutation_invariant(
        ax in -4i32..24, ay in -4i32..18,
        bx in -4i32..24, by in -4i32..18,
        cx in -4i32..24, cy in -4i32..18,
        rot in 0usize..4,
    ) {
        let (a, b, c) = ((ax, ay), (bx, by), (cx, cy));
        let rot = rotation(rot);
        let reference = fill_and_outline(rot, [a, b, c]);
        for order in [[a, c, b], [b, a, c], [b, c, a], [c, a, b], [c, b, a]] {
            assert_eq!(fill_and_outline(rot, order), reference, "{order:?}");
        }
    }

    /// Circles of radius 0 set exactly one pixel.
    #[test]
    fn zero_radius_circle_is_one_pixel(cx in 0i32..20, cy in 0i32..14) {
        let mut buf = blank();
        let mut r = Rasterizer::new(&mut buf, CoordinateMapper::new(PANEL_W, PANEL_H, Rotation::Deg0));
        r.draw_circle(cx, cy, 0, Rgb24::GREEN);
        assert_eq!(r.read_pixel(cx, cy), Some(Rgb24::GREEN));
        drop(r);
        assert_eq!(buf.iter().filter(|p| **p == Rgb24::GREEN).count(), 1);
    }

    /// Shapes entirely off-screen write nothing.
    #[test]
    fn offscreen_shapes_write_nothing(dx in 40i32..200, radius in 1u16..30) {
        let mut buf = blank();
        let mut r = Rasterizer::new(&mut buf, CoordinateMapper::new(PANEL_W, PANEL_H, Rotation::Deg0));
        let far = i32::from(PANEL_W) + dx + i32::from(radius);
        r.fill_circle(far, 5, radius, Rgb24::WHITE);
        r.draw_ellipse(-far, 5, radius, radius, Rgb24::WHITE);
        r.fill_round_rectangle(far, far, far + 10, far + 10, radius, Rgb24::WHITE);
        r.draw_line(-far, -far, -far + 3, -far - 9, Rgb24::WHITE);
        drop(r);
        assert!(buf.iter().all(|p| *p == Rgb24::BLACK));
    }

    /// Clipped lines light the same pixels as the full walk.
    #[test]
    fn clipped_line_matches_unclipped_walk(
        x1 in -90i32..110, y1 in -90i32..104,
        x2 in -90i32..110, y2 in -90i32..104,
    ) {
        let mut buf = blank();
        Rasterizer::new(&mut buf, CoordinateMapper::new(PANEL_W, PANEL_H, Rotation::Deg0))
            .draw_line(x1, y1, x2, y2, Rgb24::WHITE);
        let reference = unclipped_reference(|r, d| {
            r.draw_line(x1 + d, y1 + d, x2 + d, y2 + d, Rgb24::WHITE);
        });
        assert_eq!(buf, reference);
    }

    /// Clipped triangle fills match a fill that sees every row.
    #[test]
    fn clipped_triangle_matches_unclipped_fill(
        ax in -90i32..110, ay in -90i32..104,
        bx in -90i32..110, by in -90i32..104,
        cx in -90i32..110, cy in -90i32..104,
    ) {
        let mut buf = blank();
        Rasterizer::new(&mut buf, CoordinateMapper::new(PANEL_W, PANEL_H, Rotation::Deg0))
            .fill_triangle(ax, ay, bx, by, cx, cy, Rgb24::WHITE);
        let reference = unclipped_reference(|r, d| {
            r.fill_triangle(ax + d, ay + d, bx + d, by + d, cx + d, cy + d, Rgb24::WHITE);
        });
        assert_eq!(buf, reference);
    }

    /// No coordinate or radius makes a primitive panic.
    #[test]
    fn any_coordinates_are_accepted(
        x0 in proptest::num::i32::ANY, y0 in proptest::num::i32::ANY,
        x1 in proptest::num::i32::ANY, y1 in proptest::num::i32::ANY,
        x2 in proptest::num::i32::ANY, y2 in proptest::num::i32::ANY,
        radius in proptest::num::u16::ANY,
        rot in 0usize..4,
    ) {
        let mut buf = blank();
        let mut r = Rasterizer::new(&mut buf, CoordinateMapper::new(PANEL_W, PANEL_H, rotation(rot)));
        r.draw_line(x0, y0, x1, y1, Rgb24::WHITE);
        r.draw_fast_hline(x0, x1, y0, Rgb24::WHITE);
        r.draw_fast_vline(x0, y0, y1, Rgb24::WHITE);
        r.draw_circle(x0, y0, radius, Rgb24::WHITE);
        r.fill_circle_outlined(x1, y1, radius, Rgb24::WHITE, Rgb24::RED);
        r.draw_ellipse(x2, y2, radius, radius / 3, Rgb24::WHITE);
        r.fill_triangle_outlined(x0, y0, x1, y1, x2, y2, Rgb24::WHITE, Rgb24::RED);
        r.fill_rectangle_outlined(x0, y0, x1, y1, Rgb24::WHITE, Rgb24::RED);
        r.fill_round_rectangle_outlined(x0, y0, x2, y2, radius, Rgb24::WHITE, Rgb24::RED);
        r.draw_round_rectangle(x1, y1, x2, y2, radius, Rgb24::WHITE);
        r.draw_string_with_background(x0, y0, Rgb24::WHITE, Rgb24::RED, "Hi");
    }
}
