//! Rotation-aware rasterization into a physical pixel buffer
//!
//! Every primitive is built on [`Rasterizer::draw_pixel`], which runs the
//! coordinate transform and bounds check exactly once per pixel. Coordinates
//! are logical; anything outside the logical rectangle is clipped silently.
//!
//! # Algorithms
//!
//! | Primitive                 | Method                                         |
//! |---------------------------|------------------------------------------------|
//! | lines                     | Bresenham, axes transposed above 45°           |
//! | circles                   | midpoint circle, 8-way symmetry                 |
//! | ellipses                  | two-region midpoint ellipse                    |
//! | filled triangles          | per-row edge runs, one span per scanline       |
//! | rounded rectangles        | straight edges plus midpoint corner sweep      |
//! | text / bitmaps            | per-bit blit                                   |
//!
//! Callers may pass any `i32`. Lines and triangles only visit the rows or
//! columns inside the logical area, and curved shapes whose bounding box
//! misses it return before any geometry is computed.

#![allow(clippy::too_many_arguments)]

use core::mem::swap;

use crate::font::{BitmapFont, FontChoice, MonoBitmap};
use crate::pixel::LayerPixel;
use crate::rotation::CoordinateMapper;

/// Drawing surface over one physical pixel buffer.
///
/// Obtained from [`Canvas::raster`](crate::Canvas::raster) for the current
/// draw buffer, or built directly over any slice with [`Rasterizer::new`].
pub struct Rasterizer<'c, P> {
    pixels: &'c mut [P],
    mapper: CoordinateMapper,
    font: FontChoice,
}

impl<'c, P: LayerPixel> Rasterizer<'c, P> {
    /// Wrap a physical, row-major buffer.
    ///
    /// Writes that land past the end of `pixels` are dropped, so a short
    /// buffer is clipped rather than overrun.
    pub fn new(pixels: &'c mut [P], mapper: CoordinateMapper) -> Self {
        Self {
            pixels,
            mapper,
            font: FontChoice::default(),
        }
    }

    /// Use `font` for [`draw_char`](Self::draw_char) and the string calls.
    #[must_use]
    pub fn with_font(mut self, font: FontChoice) -> Self {
        self.font = font;
        self
    }

    /// The mapper in use.
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Logical width as a drawing coordinate.
    fn width(&self) -> i32 {
        i32::from(self.mapper.logical_width())
    }

    /// Logical height as a drawing coordinate.
    fn height(&self) -> i32 {
        i32::from(self.mapper.logical_height())
    }

    /// Last logical column. The mapper is never narrower than one pixel.
    fn max_x(&self) -> i32 {
        self.width().saturating_sub(1)
    }

    /// Last logical row.
    fn max_y(&self) -> i32 {
        self.height().saturating_sub(1)
    }

    /// `true` if the box `x0 ± rx`, `y0 ± ry` has no pixel in the logical
    /// area.
    ///
    /// When it returns `false`, `x0` and `y0` lie within two radii of the
    /// area, so offsets of up to one radius stay far inside `i32`.
    #[allow(clippy::arithmetic_side_effects)] // i32 ± u16 in i64
    fn misses(&self, x0: i32, y0: i32, rx: u16, ry: u16) -> bool {
        let (x0, y0) = (i64::from(x0), i64::from(y0));
        let (rx, ry) = (i64::from(rx), i64::from(ry));
        x0 + rx < 0
            || x0 - rx >= i64::from(self.width())
            || y0 + ry < 0
            || y0 - ry >= i64::from(self.height())
    }

    // ── Pixels ────────────────────────────────────────────────────────────

    /// Set one pixel. Out-of-bounds coordinates are a no-op.
    #[inline]
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: P) {
        if let Some(slot) = self
            .mapper
            .to_index(x, y)
            .and_then(|i| self.pixels.get_mut(i))
        {
            *slot = color;
        }
    }

    /// [`draw_pixel`](Self::draw_pixel) for widened coordinates.
    #[inline]
    fn draw_pixel_wide(&mut self, x: i64, y: i64, color: P) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.draw_pixel(x, y, color);
        }
    }

    /// Read one pixel, or `None` outside logical bounds.
    pub fn read_pixel(&self, x: i32, y: i32) -> Option<P> {
        self.mapper
            .to_index(x, y)
            .and_then(|i| self.pixels.get(i).copied())
    }

    /// Fill the whole logical area.
    pub fn fill_screen(&mut self, color: P) {
        self.fill_rectangle(0, 0, self.max_x(), self.max_y(), color);
    }

    // ── Runs and lines ────────────────────────────────────────────────────

    /// Horizontal run from `x0` to `x1` inclusive on row `y`, either order.
    pub fn draw_fast_hline(&mut self, mut x0: i32, mut x1: i32, y: i32, color: P) {
        if x1 < x0 {
            swap(&mut x0, &mut x1);
        }
        if x1 < 0 || x0 >= self.width() || y < 0 || y >= self.height() {
            return;
        }
        for x in x0.max(0)..=x1.min(self.max_x()) {
            self.draw_pixel(x, y, color);
        }
    }

    /// Vertical run from `y0` to `y1` inclusive on column `x`, either order.
    pub fn draw_fast_vline(&mut self, x: i32, mut y0: i32, mut y1: i32, color: P) {
        if y1 < y0 {
            swap(&mut y0, &mut y1);
        }
        if y1 < 0 || y0 >= self.height() || x < 0 || x >= self.width() {
            return;
        }
        for y in y0.max(0)..=y1.min(self.max_y()) {
            self.draw_pixel(x, y, color);
        }
    }

    /// Bresenham line between two points, endpoints included.
    ///
    /// The result does not depend on endpoint order. Only the stretch of
    /// the major axis inside the logical area is walked; the walk enters it
    /// with the same row and error term the full walk would have there.
    // i32 differences fit i64 with room for the doubling; the entry state
    // needs one product of two such differences, done in i128.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: P) {
        let (mut x1, mut y1) = (i64::from(x1), i64::from(y1));
        let (mut x2, mut y2) = (i64::from(x2), i64::from(y2));
        let steep = (y2 - y1).abs() > (x2 - x1).abs();
        if steep {
            swap(&mut x1, &mut y1);
            swap(&mut x2, &mut y2);
        }
        if x1 > x2 {
            swap(&mut x1, &mut x2);
            swap(&mut y1, &mut y2);
        }

        // after transposing, the major axis of a steep line is logical y
        let limit = i64::from(if steep { self.height() } else { self.width() });
        if x2 < 0 || x1 >= limit {
            return;
        }

        let run = x2 - x1;
        let rise = (y2 - y1).abs();
        let step = if y2 > y1 { 1 } else { -1 };
        let start = x1.max(0);
        let (taken, mut error) = entry_state(run, rise, start - x1);
        let mut y = y1 + step * taken;

        for x in start..=x2.min(limit - 1) {
            if steep {
                self.draw_pixel_wide(y, x, color);
            } else {
                self.draw_pixel_wide(x, y, color);
            }
            error -= 2 * rise;
            if error < 0 {
                y += step;
                error += 2 * run;
            }
        }
    }

    // ── Circles and ellipses ──────────────────────────────────────────────

    /// Circle outline. Radius 0 sets the single centre pixel.
    // bounded by `misses`
    #[allow(clippy::arithmetic_side_effects)]
    pub fn draw_circle(&mut self, x0: i32, y0: i32, radius: u16, color: P) {
        if self.misses(x0, y0, radius, radius) {
            return;
        }
        if radius == 0 {
            self.draw_pixel(x0, y0, color);
            return;
        }
        let mut a = i32::from(radius);
        let mut b = 0;
        let mut error = 1 - a;

        while a >= b {
            self.draw_pixel(x0 + a, y0 + b, color);
            self.draw_pixel(x0 + b, y0 + a, color);
            self.draw_pixel(x0 - a, y0 + b, color);
            self.draw_pixel(x0 - b, y0 + a, color);
            self.draw_pixel(x0 - a, y0 - b, color);
            self.draw_pixel(x0 - b, y0 - a, color);
            self.draw_pixel(x0 + a, y0 - b, color);
            self.draw_pixel(x0 + b, y0 - a, color);

            b += 1;
            if error < 0 {
                error += 2 * b + 1;
            } else {
                a -= 1;
                error += 2 * (b - a + 1);
            }
        }
    }

    /// Filled circle in a single colour.
    pub fn fill_circle(&mut self, x0: i32, y0: i32, radius: u16, color: P) {
        self.fill_circle_outlined(x0, y0, radius, color, color);
    }

    /// Filled circle with a separate outline colour.
    ///
    /// Each interior row is painted by exactly one horizontal run.
    // bounded by `misses`
    #[allow(clippy::arithmetic_side_effects)]
    pub fn fill_circle_outlined(&mut self, x0: i32, y0: i32, radius: u16, outline: P, fill: P) {
        if self.misses(x0, y0, radius, radius) {
            return;
        }
        if radius == 0 {
            self.draw_pixel(x0, y0, outline);
            return;
        }
        let mut a = i32::from(radius);
        let mut b = 0;
        let mut error = 1 - a;
        // rows at y0 ± a get their run only once a has stepped
        let mut cap_drawn = true;

        while a >= b {
            // sweeping outwards from the horizontal centre line
            self.draw_pixel(x0 + a, y0 + b, outline);
            self.draw_pixel(x0 - a, y0 + b, outline);
            self.draw_fast_hline(x0 - a + 1, x0 + a - 1, y0 + b, fill);
            self.draw_pixel(x0 - a, y0 - b, outline);
            self.draw_pixel(x0 + a, y0 - b, outline);
            self.draw_fast_hline(x0 - a + 1, x0 + a - 1, y0 - b, fill);

            // sweeping inwards from the top and bottom
            self.draw_pixel(x0 + b, y0 + a, outline);
            self.draw_pixel(x0 - b, y0 + a, outline);
            self.draw_pixel(x0 - b, y0 - a, outline);
            self.draw_pixel(x0 + b, y0 - a, outline);

            if b > 1 && !cap_drawn {
                self.draw_fast_hline(x0 - b + 1, x0 + b - 1, y0 + a, fill);
                self.draw_fast_hline(x0 - b + 1, x0 + b - 1, y0 - a, fill);
                cap_drawn = true;
            }

            b += 1;
            if error < 0 {
                error += 2 * b + 1;
            } else {
                a -= 1;
                cap_drawn = false;
                error += 2 * (b - a + 1);
            }
        }
    }

    /// Axis-aligned ellipse outline.
    // centre offsets are bounded by `misses`; the region terms are at most
    // 2 * r^3 for a u16 radius, inside i64
    #[allow(clippy::arithmetic_side_effects)]
    pub fn draw_ellipse(&mut self, x0: i32, y0: i32, radius_x: u16, radius_y: u16, color: P) {
        if self.misses(x0, y0, radius_x, radius_y) {
            return;
        }
        if radius_x == 0 || radius_y == 0 {
            let (rx, ry) = (i32::from(radius_x), i32::from(radius_y));
            self.draw_fast_hline(x0 - rx, x0 + rx, y0, color);
            self.draw_fast_vline(x0, y0 - ry, y0 + ry, color);
            return;
        }
        let rx = i64::from(radius_x);
        let ry = i64::from(radius_y);
        let two_a_sq = 2 * rx * rx;
        let two_b_sq = 2 * ry * ry;

        // region 1: slope shallower than -1, y is the driving axis
        let mut x = rx;
        let mut y = 0i64;
        let mut change_x = ry * ry * (1 - 2 * rx);
        let mut change_y = rx * rx;
        let mut error = 0i64;
        let mut stop_x = two_b_sq * rx;
        let mut stop_y = 0i64;

        while stop_x >= stop_y {
            self.plot_quadrants(x0, y0, x, y, color);
            y += 1;
            stop_y += two_a_sq;
            error += change_y;
            change_y += two_a_sq;
            if 2 * error + change_x > 0 {
                x -= 1;
                stop_x -= two_b_sq;
                error += change_x;
                change_x += two_b_sq;
            }
        }

        // region 2: slope steeper than -1, x is the driving axis
        x = 0;
        y = ry;
        change_x = ry * ry;
        change_y = rx * rx * (1 - 2 * ry);
        error = 0;
        stop_x = 0;
        stop_y = two_a_sq * ry;

        while stop_x <= stop_y {
            self.plot_quadrants(x0, y0, x, y, color);
            x += 1;
            stop_x += two_b_sq;
            error += change_x;
            change_x += two_b_sq;
            if 2 * error + change_y > 0 {
                y -= 1;
                stop_y -= two_a_sq;
                error += change_y;
                change_y += two_a_sq;
            }
        }
    }

    #[allow(clippy::arithmetic_side_effects)] // i32 ± radius in i64
    fn plot_quadrants(&mut self, x0: i32, y0: i32, dx: i64, dy: i64, color: P) {
        let (x0, y0) = (i64::from(x0), i64::from(y0));
        self.draw_pixel_wide(x0 + dx, y0 + dy, color);
        self.draw_pixel_wide(x0 - dx, y0 + dy, color);
        self.draw_pixel_wide(x0 - dx, y0 - dy, color);
        self.draw_pixel_wide(x0 + dx, y0 - dy, color);
    }

    // ── Triangles ─────────────────────────────────────────────────────────

    /// Triangle outline.
    pub fn draw_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: P,
    ) {
        self.draw_line(x1, y1, x2, y2, color);
        self.draw_line(x2, y2, x3, y3, color);
        self.draw_line(x1, y1, x3, y3, color);
    }

    /// Filled triangle.
    ///
    /// Vertices are ordered by `(y, x)` first, so every permutation of the
    /// same three points produces the same pixels. The middle vertex splits
    /// the triangle into a flat-bottomed and a flat-topped half; each row
    /// gets one run spanning the pixels of its two edges. Only rows inside
    /// the logical area are visited.
    // rows are clamped to the logical height before the i64 increment
    #[allow(clippy::arithmetic_side_effects)]
    pub fn fill_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        color: P,
    ) {
        let mut v = [(y1, x1), (y2, x2), (y3, x3)];
        v.sort_unstable();
        let [top, middle, bottom] = v.map(|(y, x)| (i64::from(x), i64::from(y)));
        let edges = [
            Edge::new(top, middle),
            Edge::new(middle, bottom),
            Edge::new(top, bottom),
        ];

        let first = top.1.max(0);
        let last = bottom.1.min(i64::from(self.max_y()));
        for y in first..=last {
            let span = edges
                .iter()
                .filter_map(|edge| edge.run(y))
                .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)));
            if let Some((lo, hi)) = span {
                self.draw_fast_hline(clamp_coord(lo), clamp_coord(hi), clamp_coord(y), color);
            }
        }
    }

    /// Filled triangle with a separate outline colour.
    pub fn fill_triangle_outlined(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
        outline: P,
        fill: P,
    ) {
        self.fill_triangle(x1, y1, x2, y2, x3, y3, fill);
        self.draw_triangle(x1, y1, x2, y2, x3, y3, outline);
    }

    // ── Rectangles ────────────────────────────────────────────────────────

    /// Rectangle outline between two corners, either order.
    pub fn draw_rectangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: P) {
        self.draw_fast_hline(x0, x1, y0, color);
        self.draw_fast_hline(x0, x1, y1, color);
        self.draw_fast_vline(x0, y0, y1, color);
        self.draw_fast_vline(x1, y0, y1, color);
    }

    /// Filled rectangle between two corners, either order.
    pub fn fill_rectangle(&mut self, mut x0: i32, mut y0: i32, mut x1: i32, mut y1: i32, color: P) {
        if y0 > y1 {
            swap(&mut y0, &mut y1);
        }
        if x0 > x1 {
            swap(&mut x0, &mut x1);
        }
        if y1 < 0 || y0 >= self.height() {
            return;
        }
        for y in y0.max(0)..=y1.min(self.max_y()) {
            self.draw_fast_hline(x0, x1, y, color);
        }
    }

    /// Filled rectangle with a separate outline colour.
    pub fn fill_rectangle_outlined(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        outline: P,
        fill: P,
    ) {
        self.fill_rectangle(x0, y0, x1, y1, fill);
        self.draw_rectangle(x0, y0, x1, y1, outline);
    }

    /// `true` if the ordered corners enclose no logical pixel.
    fn rect_misses(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> bool {
        x1 < 0 || x0 >= self.width() || y1 < 0 || y0 >= self.height()
    }

    /// Rounded rectangle outline.
    ///
    /// `radius` is clamped to half the shorter side.
    // every offset stays between the ordered corners: r is at most half of
    // either side and the sweep never leaves 0..=r
    #[allow(clippy::arithmetic_side_effects)]
    pub fn draw_round_rectangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        radius: u16,
        color: P,
    ) {
        let (x0, y0, x1, y1, r) = normalize_round_rect(x0, y0, x1, y1, radius);
        if self.rect_misses(x0, y0, x1, y1) {
            return;
        }

        self.draw_fast_hline(x0 + r, x1 - r, y0, color);
        self.draw_fast_hline(x0 + r, x1 - r, y1, color);
        self.draw_fast_vline(x0, y0 + r, y1 - r, color);
        self.draw_fast_vline(x1, y0 + r, y1 - r, color);

        // corner arc centres
        let (cx0, cy0, cx1, cy1) = (x0 + r, y0 + r, x1 - r, y1 - r);
        let mut a = r;
        let mut b = 0;
        let mut error = 1 - a;

        while a >= b {
            self.draw_pixel(cx0 - a, cy0 - b, color);
            self.draw_pixel(cx0 - a, cy1 + b, color);
            self.draw_pixel(cx1 + a, cy0 - b, color);
            self.draw_pixel(cx1 + a, cy1 + b, color);
            self.draw_pixel(cx0 - b, cy0 - a, color);
            self.draw_pixel(cx1 + b, cy0 - a, color);
            self.draw_pixel(cx0 - b, cy1 + a, color);
            self.draw_pixel(cx1 + b, cy1 + a, color);

            b += 1;
            if error < 0 {
                error += 2 * b + 1;
            } else {
                a -= 1;
                error += 2 * (b - a + 1);
            }
        }
    }

    /// Filled rounded rectangle in a single colour.
    pub fn fill_round_rectangle(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        radius: u16,
        color: P,
    ) {
        self.fill_round_rectangle_outlined(x0, y0, x1, y1, radius, color, color);
    }

    /// Filled rounded rectangle with a separate outline colour.
    ///
    /// `radius` is clamped to half the shorter side; radius 0 is a plain
    /// outlined rectangle.
    // same bounds as draw_round_rectangle
    #[allow(clippy::arithmetic_side_effects)]
    pub fn fill_round_rectangle_outlined(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        radius: u16,
        outline: P,
        fill: P,
    ) {
        let (x0, y0, x1, y1, r) = normalize_round_rect(x0, y0, x1, y1, radius);
        if self.rect_misses(x0, y0, x1, y1) {
            return;
        }
        if r == 0 {
            self.fill_rectangle_outlined(x0, y0, x1, y1, outline, fill);
            return;
        }

        self.draw_fast_hline(x0 + r, x1 - r, y0, outline);
        self.draw_fast_hline(x0 + r, x1 - r, y1, outline);
        self.draw_fast_vline(x0, y0 + r, y1 - r, outline);
        self.draw_fast_vline(x1, y0 + r, y1 - r, outline);

        let (cx0, cy0, cx1, cy1) = (x0 + r, y0 + r, x1 - r, y1 - r);
        let mut a = r;
        let mut b = 0;
        let mut error = 1 - a;
        // one run per row/column of the corner sweep
        let mut hline_drawn = true;
        let mut vline_drawn = true;

        while a >= b {
            // left and right sides, sweeping towards the centre
            self.draw_pixel(cx0 - a, cy0 - b, outline);
            self.draw_pixel(cx0 - a, cy1 + b, outline);
            self.draw_pixel(cx1 + a, cy0 - b, outline);
            self.draw_pixel(cx1 + a, cy1 + b, outline);

            if !vline_drawn {
                self.draw_fast_vline(cx0 - a, cy0 - b + 1, cy1 + b - 1, fill);
                self.draw_fast_vline(cx1 + a, cy0 - b + 1, cy1 + b - 1, fill);
                vline_drawn = true;
            }

            // top and bottom, sweeping towards the centre
            self.draw_pixel(cx0 - b, cy0 - a, outline);
            self.draw_pixel(cx1 + b, cy0 - a, outline);
            self.draw_pixel(cx0 - b, cy1 + a, outline);
            self.draw_pixel(cx1 + b, cy1 + a, outline);

            if !hline_drawn {
                self.draw_fast_hline(cx0 - b + 1, cx1 + b - 1, cy0 - a, fill);
                self.draw_fast_hline(cx0 - b + 1, cx1 + b - 1, cy1 + a, fill);
                hline_drawn = true;
            }

            b += 1;
            if error < 0 {
                error += 2 * b + 1;
            } else {
                a -= 1;
                hline_drawn = false;
                vline_drawn = false;
                error += 2 * (b - a + 1);
            }
        }

        // the sweep leaves a square of side 2a around each corner centre
        self.fill_rectangle(cx0 - a, cy0 - a, cx1 + a, cy1 + a, fill);
    }

    // ── Text and bitmaps ──────────────────────────────────────────────────

    /// Draw one glyph of the current font with its top-left at `(x, y)`.
    pub fn draw_char(&mut self, x: i32, y: i32, color: P, ch: char) {
        let font = self.font.mono_font();
        self.blit_glyph(&font, x, y, ch, color, None);
    }

    /// Draw `text` in the current font, advancing by the glyph width.
    pub fn draw_string(&mut self, x: i32, y: i32, color: P, text: &str) {
        let font = self.font.mono_font();
        self.draw_string_with(&font, x, y, color, None, text);
    }

    /// Draw `text` in the current font, painting unset glyph bits with
    /// `background`.
    pub fn draw_string_with_background(
        &mut self,
        x: i32,
        y: i32,
        color: P,
        background: P,
        text: &str,
    ) {
        let font = self.font.mono_font();
        self.draw_string_with(&font, x, y, color, Some(background), text);
    }

    /// Draw `text` in an explicit font.
    pub fn draw_string_with<F: BitmapFont + ?Sized>(
        &mut self,
        font: &F,
        mut x: i32,
        y: i32,
        color: P,
        background: Option<P>,
        text: &str,
    ) {
        let advance = i32::try_from(font.glyph_width()).unwrap_or(i32::MAX);
        for ch in text.chars() {
            self.blit_glyph(font, x, y, ch, color, background);
            x = x.saturating_add(advance);
        }
    }

    // A saturated coordinate is off every u16 panel, so saturation clips.
    fn blit_glyph<F: BitmapFont + ?Sized>(
        &mut self,
        font: &F,
        x: i32,
        y: i32,
        ch: char,
        color: P,
        background: Option<P>,
    ) {
        for gy in 0..font.glyph_height() {
            let py = y.saturating_add(i32::try_from(gy).unwrap_or(i32::MAX));
            for gx in 0..font.glyph_width() {
                let px = x.saturating_add(i32::try_from(gx).unwrap_or(i32::MAX));
                if font.glyph_pixel(ch, gx, gy) {
                    self.draw_pixel(px, py, color);
                } else if let Some(bg) = background {
                    self.draw_pixel(px, py, bg);
                }
            }
        }
    }

    /// Draw the set bits of `bitmap` in `color`, top-left at `(x, y)`.
    pub fn draw_mono_bitmap(&mut self, x: i32, y: i32, bitmap: &MonoBitmap<'_>, color: P) {
        for by in 0..bitmap.height() {
            for bx in 0..bitmap.width() {
                if bitmap.pixel(bx, by) {
                    self.draw_pixel(
                        x.saturating_add(i32::from(bx)),
                        y.saturating_add(i32::from(by)),
                        color,
                    );
                }
            }
        }
    }
}

/// Row offset and error term of a Bresenham walk `skipped` steps in.
///
/// The walk starts with error `run` and, per step, subtracts `2 * rise` and
/// adds `2 * run` while taking a minor step whenever the error goes
/// negative, which keeps the error in `0..2 * run`. So after `k` steps the
/// minor offset is the smallest `m` with `run - 2·rise·k + 2·run·m >= 0`.
// 2 * rise * skipped < 2^66, hence i128; the results fit back in i64
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
fn entry_state(run: i64, rise: i64, skipped: i64) -> (i64, i64) {
    if skipped == 0 || run == 0 {
        return (0, run);
    }
    let (run, rise, skipped) = (i128::from(run), i128::from(rise), i128::from(skipped));
    let deficit = 2 * rise * skipped - run;
    let taken = if deficit <= 0 {
        0
    } else {
        (deficit + 2 * run - 1) / (2 * run)
    };
    let error = run - 2 * rise * skipped + 2 * run * taken;
    // taken <= rise and 0 <= error < 2 * run
    (taken as i64, error as i64)
}

/// Clamp a widened coordinate into `i32`; anything clamped is off-panel.
#[allow(clippy::cast_possible_truncation)]
fn clamp_coord(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Order corners and clamp the radius to half the shorter side.
// the half-sides are computed in i64 and end up no larger than `radius`
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
fn normalize_round_rect(
    mut x0: i32,
    mut y0: i32,
    mut x1: i32,
    mut y1: i32,
    radius: u16,
) -> (i32, i32, i32, i32, i32) {
    if x1 < x0 {
        swap(&mut x0, &mut x1);
    }
    if y1 < y0 {
        swap(&mut y0, &mut y1);
    }
    let half_w = (i64::from(x1) - i64::from(x0)) / 2;
    let half_h = (i64::from(y1) - i64::from(y0)) / 2;
    let r = i64::from(radius).min(half_w).min(half_h);
    (x0, y0, x1, y1, r as i32)
}

/// One triangle edge, sampled a row at a time.
///
/// Points are `(x, y)` with `top` on the lower row number.
struct Edge {
    top: (i64, i64),
    bottom: (i64, i64),
}

impl Edge {
    fn new(a: (i64, i64), b: (i64, i64)) -> Self {
        if a.1 <= b.1 {
            Self { top: a, bottom: b }
        } else {
            Self { top: b, bottom: a }
        }
    }

    /// Column of the ideal edge at row `y`, rounded to nearest.
    ///
    /// Only called for non-horizontal edges with `y` on the edge.
    // dx * t < 2^64, hence i128; the offset lies between 0 and dx
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn x_at(&self, y: i64) -> i64 {
        let dx = i128::from(self.bottom.0 - self.top.0);
        let dy = i128::from(self.bottom.1 - self.top.1);
        let t = i128::from(y - self.top.1);
        let offset = (2 * dx * t + dy).div_euclid(2 * dy);
        self.top.0 + offset as i64
    }

    /// Lowest and highest column of the edge's pixels on row `y`.
    ///
    /// A shallow edge covers every column from where it enters the row to
    /// just before where it enters the next one, so consecutive rows tile
    /// the edge without gaps.
    // the differences are between coordinates that came from i32
    #[allow(clippy::arithmetic_side_effects)]
    fn run(&self, y: i64) -> Option<(i64, i64)> {
        let ((xa, ya), (xb, yb)) = (self.top, self.bottom);
        if y < ya || y > yb {
            return None;
        }
        if ya == yb {
            return Some((xa.min(xb), xa.max(xb)));
        }
        let start = self.x_at(y);
        let end = if y == yb {
            xb
        } else {
            let next = self.x_at(y + 1);
            match next.cmp(&start) {
                core::cmp::Ordering::Greater => next - 1,
                core::cmp::Ordering::Less => next + 1,
                core::cmp::Ordering::Equal => start,
            }
        };
        Some((start.min(end), start.max(end)))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
