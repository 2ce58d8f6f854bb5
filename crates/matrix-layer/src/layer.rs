//! The layer object and its two role handles
//!
//! [`Layer`] owns the buffer pair, the swap handshake and the settings the
//! two contexts share. [`Layer::split`] hands out:
//!
//! - [`Canvas`]: the producer. Draws into the draw buffer, requests swaps,
//!   and changes brightness, colour correction, chroma key and rotation.
//! - [`Refresher`]: the consumer. Exchanges buffers at the frame boundary,
//!   regenerates the LUT and composites refresh-buffer rows into scanlines.
//!
//! Producer-side state (rotation, font) and consumer-side state (LUT,
//! latched shift count, latched chroma key) live inside the layer, so a
//! second `split` resumes where the first left off.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::buffer::BufferPair;
use crate::config::LayerConfig;
use crate::error::LayerError;
use crate::font::FontChoice;
use crate::pipeline::{ChromaCell, ChromaKey, ColorPipeline, LutBuilder};
use crate::pixel::{LayerPixel, ScanlinePixel};
use crate::raster::Rasterizer;
use crate::rotation::{CoordinateMapper, Rotation};
use crate::swap::SwapCoordinator;
use crate::MAX_BRIGHTNESS_SHIFTS;

/// State both handles reach through a shared reference.
struct Shared<'buf, P> {
    buffers: BufferPair<'buf, P>,
    swap: SwapCoordinator,
    width: u16,
    height: u16,
    brightness: AtomicU8,
    color_correction: AtomicBool,
    pending_shifts: AtomicU8,
    chroma: ChromaCell,
}

#[derive(Debug)]
struct ProducerState {
    mapper: CoordinateMapper,
    font: FontChoice,
}

struct ConsumerState<P: LayerPixel> {
    lut: P::Lut,
    shifts: u8,
    chroma: ChromaKey<P>,
}

/// One double-buffered background layer.
pub struct Layer<'buf, P: LayerPixel> {
    shared: Shared<'buf, P>,
    producer: ProducerState,
    consumer: ConsumerState<P>,
}

impl<'buf, P: LayerPixel> Layer<'buf, P> {
    /// Build a layer over caller-provided storage.
    ///
    /// `storage` must hold at least `2 × width × height` pixels; it is
    /// zero-filled. Buffer 0 starts as the draw buffer.
    ///
    /// # Errors
    ///
    /// [`LayerError::InvalidDimensions`] for a zero-sized panel and
    /// [`LayerError::StorageTooSmall`] when `storage` is short.
    pub fn new(storage: &'buf mut [P], config: LayerConfig) -> Result<Self, LayerError> {
        config.validate()?;
        let buffers = BufferPair::new(storage, config.buffer_len(), P::BLACK)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "matrix layer {=u16}x{=u16} ready ({} LUT entries)",
            config.width,
            config.height,
            P::DEPTH.lut_len()
        );

        Ok(Self {
            shared: Shared {
                buffers,
                swap: SwapCoordinator::new(),
                width: config.width,
                height: config.height,
                brightness: AtomicU8::new(config.brightness),
                color_correction: AtomicBool::new(config.color_correction),
                pending_shifts: AtomicU8::new(0),
                chroma: ChromaCell::new(ChromaKey::<P>::default()),
            },
            producer: ProducerState {
                mapper: CoordinateMapper::new(config.width, config.height, config.rotation),
                font: config.font,
            },
            consumer: ConsumerState {
                lut: P::identity_lut(),
                shifts: 0,
                chroma: ChromaKey::default(),
            },
        })
    }

    /// Physical panel width.
    pub fn width(&self) -> u16 {
        self.shared.width
    }

    /// Physical panel height.
    pub fn height(&self) -> u16 {
        self.shared.height
    }

    /// Split into the producer and consumer handles.
    ///
    /// The handles can be moved to different threads (or one kept in an
    /// interrupt handler) for as long as the layer is borrowed.
    pub fn split(&mut self) -> (Canvas<'_, 'buf, P>, Refresher<'_, 'buf, P>) {
        let Self {
            shared,
            producer,
            consumer,
        } = self;
        (
            Canvas {
                shared,
                state: producer,
            },
            Refresher {
                shared,
                state: consumer,
            },
        )
    }
}

#[cfg(feature = "alloc")]
impl<P: LayerPixel> Layer<'static, P> {
    /// Build a layer with internally allocated storage.
    ///
    /// The storage lives for the rest of the program.
    ///
    /// # Errors
    ///
    /// [`LayerError::OutOfMemory`] if the allocator cannot provide both
    /// buffers, plus the errors of [`Layer::new`].
    pub fn allocate(config: LayerConfig) -> Result<Self, LayerError> {
        use alloc::boxed::Box;
        use alloc::vec::Vec;

        config.validate()?;
        let pixels = config.storage_len();
        let mut storage = Vec::new();
        if storage.try_reserve_exact(pixels).is_err() {
            #[cfg(feature = "defmt")]
            defmt::error!("matrix layer allocation of {} pixels failed", pixels);
            return Err(LayerError::OutOfMemory { pixels });
        }
        storage.resize(pixels, P::BLACK);
        let storage: &'static mut [P] = Box::leak(storage.into_boxed_slice());
        Self::new(storage, config)
    }
}

impl<P: LayerPixel> core::fmt::Debug for Layer<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Layer")
            .field("width", &self.shared.width)
            .field("height", &self.shared.height)
            .field("swap", &self.shared.swap.state())
            .field("rotation", &self.producer.mapper.rotation())
            .finish_non_exhaustive()
    }
}

// ─── Producer ────────────────────────────────────────────────────────────────

/// Producer handle: drawing, swap requests and layer settings.
pub struct Canvas<'a, 'buf, P: LayerPixel> {
    shared: &'a Shared<'buf, P>,
    state: &'a mut ProducerState,
}

impl<'buf, P: LayerPixel> Canvas<'_, 'buf, P> {
    /// Exclusive view of the draw buffer, waiting out any pending swap.
    fn draw_buffer(&mut self) -> &mut [P] {
        self.shared.swap.wait_idle();
        let index = self.shared.swap.draw_index();
        // SAFETY: the producer role owns the draw buffer. While the swap state
        // is Idle only this handle can move it out of Idle, and `&mut self`
        // keeps every other producer-side view dead for the borrow.
        unsafe { self.shared.buffers.buffer_mut(index) }
    }

    /// Drawing surface over the draw buffer.
    ///
    /// Spins while a requested swap has not been taken by the consumer yet.
    pub fn raster(&mut self) -> Rasterizer<'_, P> {
        self.shared.swap.wait_idle();
        let index = self.shared.swap.draw_index();
        // SAFETY: as in `draw_buffer`.
        let pixels = unsafe { self.shared.buffers.buffer_mut(index) };
        Rasterizer::new(pixels, self.state.mapper).with_font(self.state.font)
    }

    /// Drawing surface, or `None` while a swap is still pending.
    pub fn try_raster(&mut self) -> Option<Rasterizer<'_, P>> {
        if self.shared.swap.is_swap_pending() {
            return None;
        }
        Some(self.raster())
    }

    /// Hand the finished frame to the consumer.
    ///
    /// Waits for a previous swap to complete first. With `copy`, also waits
    /// for this swap to complete and then copies the frame just handed over
    /// back into the new draw buffer, so drawing can continue incrementally.
    pub fn swap_buffers(&mut self, copy: bool) {
        #[cfg(feature = "defmt")]
        defmt::trace!("swap requested (copy={=bool})", copy);
        self.shared.swap.request_swap();
        if copy {
            self.copy_refresh_to_drawing();
        }
    }

    /// `true` until the consumer has taken the last requested frame.
    pub fn is_swap_pending(&self) -> bool {
        self.shared.swap.is_swap_pending()
    }

    /// Copy the refresh buffer over the draw buffer.
    ///
    /// Waits for any pending swap, so the copy runs in the direction the
    /// roles have after the exchange.
    pub fn copy_refresh_to_drawing(&mut self) {
        self.shared.swap.wait_idle();
        let refresh = self.shared.swap.refresh_index();
        #[cfg(feature = "defmt")]
        defmt::trace!("copy buffer {=u8} into draw buffer", refresh);
        // SAFETY: Idle, so the roles are fixed for the duration. The target
        // is the producer's draw buffer; the consumer only reads the source.
        unsafe { self.shared.buffers.copy_across(refresh) };
    }

    /// Raw physical draw buffer for bulk loading, row-major.
    pub fn back_buffer(&mut self) -> &mut [P] {
        self.draw_buffer()
    }

    /// Read-only view of the physical draw buffer.
    pub fn real_back_buffer(&mut self) -> &[P] {
        self.draw_buffer()
    }

    /// Replace the draw buffer contents with `pixels` (physical order).
    ///
    /// # Errors
    ///
    /// [`LayerError::BackBufferSize`] if `pixels` is not exactly one
    /// buffer long. The draw buffer is left untouched in that case.
    pub fn set_back_buffer(&mut self, pixels: &[P]) -> Result<(), LayerError> {
        let target = self.draw_buffer();
        if target.len() != pixels.len() {
            return Err(LayerError::BackBufferSize {
                expected: target.len(),
                actual: pixels.len(),
            });
        }
        target.copy_from_slice(pixels);
        Ok(())
    }

    /// Set the layer brightness (0 transparent, 255 opaque).
    pub fn set_brightness(&mut self, brightness: u8) {
        self.shared.brightness.store(brightness, Ordering::Relaxed);
    }

    /// Current layer brightness.
    pub fn brightness(&self) -> u8 {
        self.shared.brightness.load(Ordering::Relaxed)
    }

    /// Route compositing through the correction LUT, or bypass it.
    pub fn enable_color_correction(&mut self, enabled: bool) {
        self.shared
            .color_correction
            .store(enabled, Ordering::Relaxed);
    }

    /// `true` if compositing uses the correction LUT.
    pub fn color_correction_enabled(&self) -> bool {
        self.shared.color_correction.load(Ordering::Relaxed)
    }

    /// Treat `color` as transparent from the next frame on.
    pub fn set_chroma_key(&mut self, color: P) {
        self.shared.chroma.update::<P>(|key| {
            key.enabled = true;
            key.color = color;
        });
    }

    /// Stop treating any colour as transparent from the next frame on.
    pub fn disable_chroma_key(&mut self) {
        self.shared.chroma.update::<P>(|key| key.enabled = false);
    }

    /// Restrict a keyed layer to physical rows `first..=last`.
    ///
    /// Reversed bounds are swapped.
    pub fn set_overlay_lines(&mut self, first: u16, last: u16) {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        self.shared.chroma.update::<P>(|key| {
            key.first_line = first;
            key.last_line = last;
        });
    }

    /// Chroma-key settings as last published.
    pub fn chroma_key(&self) -> ChromaKey<P> {
        // the producer is the only writer
        self.shared.chroma.load_unsynchronized()
    }

    /// Request a brightness shift count for the next frame.
    ///
    /// Values above [`MAX_BRIGHTNESS_SHIFTS`] are clamped.
    pub fn request_brightness_shift(&mut self, shifts: u8) {
        if shifts > MAX_BRIGHTNESS_SHIFTS {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "brightness shift {=u8} clamped to {=u8}",
                shifts,
                MAX_BRIGHTNESS_SHIFTS
            );
        }
        self.shared
            .pending_shifts
            .store(shifts.min(MAX_BRIGHTNESS_SHIFTS), Ordering::Release);
    }

    /// Change the drawing rotation.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.state.mapper = self.state.mapper.rotated(rotation);
    }

    /// Current drawing rotation.
    pub fn rotation(&self) -> Rotation {
        self.state.mapper.rotation()
    }

    /// Select the font used by `draw_char` and the string calls.
    pub fn set_font(&mut self, font: FontChoice) {
        self.state.font = font;
    }

    /// Current text font.
    pub fn font(&self) -> FontChoice {
        self.state.font
    }

    /// Coordinate mapper for the current rotation.
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.state.mapper
    }

    /// Logical (rotated) width.
    pub fn width(&self) -> u16 {
        self.state.mapper.logical_width()
    }

    /// Logical (rotated) height.
    pub fn height(&self) -> u16 {
        self.state.mapper.logical_height()
    }
}

// ─── Consumer ────────────────────────────────────────────────────────────────

/// Consumer handle: buffer exchange, LUT regeneration and row compositing.
///
/// Nothing here blocks.
pub struct Refresher<'a, 'buf, P: LayerPixel> {
    shared: &'a Shared<'buf, P>,
    state: &'a mut ConsumerState<P>,
}

impl<P: LayerPixel> Refresher<'_, '_, P> {
    /// Take a requested swap, if any. Returns `true` when roles flipped.
    pub fn exchange_if_pending(&mut self) -> bool {
        self.shared.swap.exchange_if_pending()
    }

    /// Frame-boundary work: exchange buffers, latch the requested
    /// brightness shift and chroma key, and rebuild the LUT.
    ///
    /// A chroma-key update that is mid-write is picked up next frame.
    pub fn frame_refresh_callback<B: LutBuilder + ?Sized>(&mut self, builder: &mut B) {
        self.shared.swap.exchange_if_pending();
        self.state.shifts = self.shared.pending_shifts.load(Ordering::Acquire);
        if let Some(key) = self.shared.chroma.try_load() {
            self.state.chroma = key;
        }
        let brightness = self.shared.brightness.load(Ordering::Relaxed);
        builder.build(self.state.lut.as_mut(), brightness, P::DEPTH);
    }

    /// Brightness shift count latched for this frame.
    pub fn requested_brightness_shifts(&self) -> u8 {
        self.state.shifts
    }

    /// `true` while a new frame waits to be exchanged.
    pub fn is_layer_changed(&self) -> bool {
        self.shared.swap.is_swap_pending()
    }

    /// Physical row `y` of the refresh buffer.
    // y < height, so (y + 1) × width <= buffer length
    #[allow(clippy::arithmetic_side_effects)]
    pub fn refresh_row(&self, y: u16) -> Option<&[P]> {
        if y >= self.shared.height {
            return None;
        }
        let width = usize::from(self.shared.width);
        let start = usize::from(y) * width;
        // SAFETY: the consumer role owns the refresh buffer for reading, and
        // the index only moves in `exchange_if_pending`, which needs
        // `&mut self` and therefore outlives no row borrowed here.
        let buffer = unsafe { self.shared.buffers.buffer(self.shared.swap.refresh_index()) };
        buffer.get(start..start + width)
    }

    /// Composite physical row `row` over `out`.
    ///
    /// Out-of-range rows are a no-op, as are columns past the end of `out`.
    pub fn fill_refresh_row<O: ScanlinePixel>(&self, row: u16, out: &mut [O], shifts: u8) {
        let Some(pixels) = self.refresh_row(row) else {
            return;
        };
        ColorPipeline {
            brightness: self.shared.brightness.load(Ordering::Relaxed),
            color_correction: self.shared.color_correction.load(Ordering::Relaxed),
            chroma: self.state.chroma,
            lut: self.state.lut.as_ref(),
        }
        .fill_row(row, pixels, out, shifts);
    }

    /// Current correction table.
    pub fn lut(&self) -> &[u16] {
        self.state.lut.as_ref()
    }

    /// Chroma-key settings latched for this frame.
    pub fn chroma_key(&self) -> ChromaKey<P> {
        self.state.chroma
    }

    /// Physical panel width.
    pub fn width(&self) -> u16 {
        self.shared.width
    }

    /// Physical panel height.
    pub fn height(&self) -> u16 {
        self.shared.height
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing, clippy::expect_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use crate::pipeline::IdentityLut;
    use crate::pixel::{PixelDepth, Rgb24, Rgb48};

    const W: u16 = 8;
    const H: u16 = 4;
    const LEN: usize = (W as usize) * (H as usize);

    fn storage() -> [Rgb24; 2 * LEN] {
        [Rgb24::WHITE; 2 * LEN]
    }

    #[test]
    fn new_zero_fills_both_buffers() {
        let mut mem = storage();
        let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
        let (mut canvas, refresher) = layer.split();
        assert!(canvas.back_buffer().iter().all(|p| *p == Rgb24::BLACK));
        assert!(refresher
            .refresh_row(H - 1)
            .expect("in range")
            .iter()
            .all(|p| *p == Rgb24::BLACK));
    }

    #[test]
    fn construction_errors() {
        let mut mem = [Rgb24::BLACK; 10];
        assert_eq!(
            Layer::new(&mut mem, LayerConfig::new(W, H)).map(|_| ()),
            Err(LayerError::StorageTooSmall {
                required: 2 * LEN,
                actual: 10
            })
        );
        assert!(matches!(
            Layer::new(&mut mem, LayerConfig::new(0, 1)),
            Err(LayerError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn swap_moves_drawn_frame_to_refresh() {
        let mut mem = storage();
        let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
        let (mut canvas, mut refresher) = layer.split();

        canvas.raster().draw_pixel(3, 1, Rgb24::RED);
        canvas.swap_buffers(false);
        assert!(canvas.is_swap_pending());
        assert!(canvas.try_raster().is_none());
        assert!(refresher.is_layer_changed());

        assert!(refresher.exchange_if_pending());
        assert!(!canvas.is_swap_pending());
        assert_eq!(refresher.refresh_row(1).expect("row")[3], Rgb24::RED);
        // the new draw buffer is the old refresh buffer
        assert_eq!(canvas.raster().read_pixel(3, 1), Some(Rgb24::BLACK));
    }

    #[test]
    fn copy_refresh_to_drawing_replicates_frame() {
        let mut mem = storage();
        let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
        let (mut canvas, mut refresher) = layer.split();

        canvas.raster().fill_rectangle(0, 0, 3, 3, Rgb24::BLUE);
        canvas.swap_buffers(false);
        refresher.exchange_if_pending();
        canvas.copy_refresh_to_drawing();

        let refresh: std::vec::Vec<Rgb24> = (0..H)
            .flat_map(|y| refresher.refresh_row(y).expect("row").to_vec())
            .collect();
        assert_eq!(canvas.real_back_buffer(), refresh.as_slice());
    }

    #[test]
    fn set_back_buffer_checks_length() {
        let mut mem = storage();
        let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
        let (mut canvas, _) = layer.split();
        let frame = [Rgb24::GREEN; LEN];
        canvas.set_back_buffer(&frame).expect("exact size");
        assert_eq!(canvas.real_back_buffer(), &frame[..]);
        assert_eq!(
            canvas.set_back_buffer(&frame[1..]),
            Err(LayerError::BackBufferSize {
                expected: LEN,
                actual: LEN - 1
            })
        );
    }

    #[test]
    fn brightness_shift_is_latched_and_clamped() {
        let mut mem = storage();
        let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
        let (mut canvas, mut refresher) = layer.split();
        canvas.request_brightness_shift(9);
        assert_eq!(refresher.requested_brightness_shifts(), 0);
        refresher.frame_refresh_callback(&mut IdentityLut);
        assert_eq!(refresher.requested_brightness_shifts(), MAX_BRIGHTNESS_SHIFTS);
    }

    #[test]
    fn chroma_key_takes_effect_at_frame_boundary() {
        let mut mem = storage();
        let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
        let (mut canvas, mut refresher) = layer.split();
        canvas.set_chroma_key(Rgb24::BLACK);
        assert!(!refresher.chroma_key().enabled);

        let mut out = [Rgb48::RED; W as usize];
        refresher.fill_refresh_row(0, &mut out, 0);
        assert_eq!(out, [Rgb48::BLACK; W as usize]);

        refresher.frame_refresh_callback(&mut IdentityLut);
        assert!(refresher.chroma_key().enabled);
        let mut out = [Rgb48::RED; W as usize];
        refresher.fill_refresh_row(0, &mut out, 0);
        assert_eq!(out, [Rgb48::RED; W as usize]);
    }

    #[test]
    fn lut_builder_sees_brightness_and_depth() {
        let mut mem = [Rgb48::BLACK; 2 * LEN];
        let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
        let (mut canvas, mut refresher) = layer.split();
        canvas.set_brightness(42);
        let mut seen = None;
        refresher.frame_refresh_callback(&mut |lut: &mut [u16], b: u8, depth: PixelDepth| {
            seen = Some((lut.len(), b, depth));
        });
        assert_eq!(
            seen,
            Some((4096, 42, PixelDepth::Extended))
        );
    }

    #[test]
    fn rotation_changes_logical_size_only() {
        let mut mem = storage();
        let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
        {
            let (mut canvas, refresher) = layer.split();
            canvas.set_rotation(Rotation::Deg90);
            assert_eq!((canvas.width(), canvas.height()), (H, W));
            assert_eq!((refresher.width(), refresher.height()), (W, H));
        }
        // producer state survives a re-split
        let (canvas, _) = layer.split();
        assert_eq!(canvas.rotation(), Rotation::Deg90);
    }

    #[test]
    fn out_of_range_row_is_a_no_op() {
        let mut mem = storage();
        let mut layer = Layer::new(&mut mem, LayerConfig::new(W, H)).expect("fits");
        let (_, refresher) = layer.split();
        let mut out = [Rgb24::RED; W as usize];
        refresher.fill_refresh_row(H, &mut out, 0);
        assert_eq!(out, [Rgb24::RED; W as usize]);
        assert!(refresher.refresh_row(H).is_none());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn allocate_builds_zeroed_layer() {
        let mut layer = Layer::<Rgb24>::allocate(LayerConfig::new(W, H)).expect("allocates");
        let (mut canvas, _) = layer.split();
        assert_eq!(canvas.back_buffer().len(), LEN);
        assert!(canvas.back_buffer().iter().all(|p| *p == Rgb24::BLACK));
    }
}
