//! Per-scanline compositing
//!
//! For every physical row of every refresh tick the consumer runs
//! [`ColorPipeline::fill_row`]:
//!
//! 1. brightness 0: the layer is transparent, nothing is written
//! 2. chroma key on and the row outside the overlay range: nothing is written
//! 3. per column: key-coloured pixels are skipped; everything else is
//!    shifted, optionally corrected through the LUT, and blended over the
//!    existing output
//!
//! The blend is `(existing × lower + new × upper) / (lower + upper)` with
//! `lower = (255 − b) / 255` and `upper = b / 255`. At `b = 255` the new
//! value replaces the old one directly.
//!
//! Settings written by the producer reach the consumer through atomics.
//! The chroma key spans several words, so it travels through a sequence
//! counted cell that the consumer samples once per frame and never waits on.

use core::sync::atomic::{fence, AtomicBool, AtomicU16, AtomicU32, Ordering};

use crate::pixel::{LayerPixel, PixelDepth, ScanlinePixel};

// ─── LUT construction ────────────────────────────────────────────────────────

/// Fills the colour-correction table once per refresh tick.
///
/// `lut` has [`PixelDepth::lut_len`] entries. Each entry maps a channel
/// index to a 16-bit output level.
pub trait LutBuilder {
    /// Repopulate `lut` for the layer's current brightness.
    fn build(&mut self, lut: &mut [u16], brightness: u8, depth: PixelDepth);
}

impl<F> LutBuilder for F
where
    F: FnMut(&mut [u16], u8, PixelDepth),
{
    fn build(&mut self, lut: &mut [u16], brightness: u8, depth: PixelDepth) {
        self(lut, brightness, depth);
    }
}

/// Linear table: indices spread evenly over the 16-bit output range.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLut;

impl LutBuilder for IdentityLut {
    // i < lut_len <= 4096, so i * 0xFFFF / max fits in u32 and the quotient in u16
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn build(&mut self, lut: &mut [u16], _brightness: u8, depth: PixelDepth) {
        let max = (depth.lut_len() as u32).saturating_sub(1).max(1);
        for (i, entry) in (0u32..).zip(lut.iter_mut()) {
            *entry = (i.min(max) * u32::from(u16::MAX) / max) as u16;
        }
    }
}

// ─── Chroma key ──────────────────────────────────────────────────────────────

/// Transparent-colour settings as seen by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChromaKey<P> {
    /// Whether keyed pixels are skipped.
    pub enabled: bool,
    /// The transparent colour.
    pub color: P,
    /// First physical row the layer contributes to while keyed.
    pub first_line: u16,
    /// Last physical row (inclusive) the layer contributes to while keyed.
    pub last_line: u16,
}

impl<P: LayerPixel> Default for ChromaKey<P> {
    fn default() -> Self {
        Self {
            enabled: false,
            color: P::BLACK,
            first_line: 0,
            last_line: u16::MAX,
        }
    }
}

impl<P: LayerPixel> ChromaKey<P> {
    /// `true` if `row` is composited at all under these settings.
    #[inline]
    pub fn covers_row(&self, row: u16) -> bool {
        !self.enabled || (self.first_line..=self.last_line).contains(&row)
    }

    /// `true` if `pixel` is transparent under these settings.
    #[inline]
    pub fn is_keyed(&self, pixel: P) -> bool {
        self.enabled && pixel == self.color
    }
}

/// Single-writer sequence-counted cell holding a [`ChromaKey`].
///
/// The writer bumps `seq` to odd, stores the fields, and bumps it back to
/// even. A reader that sees an odd or changed sequence discards its sample.
#[derive(Debug)]
pub(crate) struct ChromaCell {
    seq: AtomicU32,
    enabled: AtomicBool,
    channels: [AtomicU16; 3],
    first_line: AtomicU16,
    last_line: AtomicU16,
}

impl ChromaCell {
    pub(crate) fn new<P: LayerPixel>(key: ChromaKey<P>) -> Self {
        let [r, g, b] = key.color.channels();
        Self {
            seq: AtomicU32::new(0),
            enabled: AtomicBool::new(key.enabled),
            channels: [AtomicU16::new(r), AtomicU16::new(g), AtomicU16::new(b)],
            first_line: AtomicU16::new(key.first_line),
            last_line: AtomicU16::new(key.last_line),
        }
    }

    /// Publish `update` applied to the current value. Producer only.
    pub(crate) fn update<P: LayerPixel>(&self, update: impl FnOnce(&mut ChromaKey<P>)) {
        let mut key = self.load_unsynchronized::<P>();
        update(&mut key);

        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        let [r, g, b] = key.color.channels();
        self.enabled.store(key.enabled, Ordering::Relaxed);
        for (slot, value) in self.channels.iter().zip([r, g, b]) {
            slot.store(value, Ordering::Relaxed);
        }
        self.first_line.store(key.first_line, Ordering::Relaxed);
        self.last_line.store(key.last_line, Ordering::Relaxed);

        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    /// Read the fields without checking the sequence. Only the writer may
    /// rely on the result.
    pub(crate) fn load_unsynchronized<P: LayerPixel>(&self) -> ChromaKey<P> {
        let [r, g, b] = &self.channels;
        ChromaKey {
            enabled: self.enabled.load(Ordering::Relaxed),
            color: P::from_channels([
                r.load(Ordering::Relaxed),
                g.load(Ordering::Relaxed),
                b.load(Ordering::Relaxed),
            ]),
            first_line: self.first_line.load(Ordering::Relaxed),
            last_line: self.last_line.load(Ordering::Relaxed),
        }
    }

    /// Consistent snapshot, or `None` if a write is in progress.
    pub(crate) fn try_load<P: LayerPixel>(&self) -> Option<ChromaKey<P>> {
        let before = self.seq.load(Ordering::Acquire);
        if before & 1 == 1 {
            return None;
        }
        let key = self.load_unsynchronized();
        fence(Ordering::Acquire);
        (self.seq.load(Ordering::Relaxed) == before).then_some(key)
    }
}

// ─── Row compositing ─────────────────────────────────────────────────────────

/// Settings of one compositing pass, fixed for a whole row.
#[derive(Debug, Clone, Copy)]
pub struct ColorPipeline<'a, P> {
    /// Layer brightness (0 transparent, 255 opaque).
    pub brightness: u8,
    /// Pass pixels through `lut`.
    pub color_correction: bool,
    /// Chroma-key settings latched for the frame.
    pub chroma: ChromaKey<P>,
    /// Correction table for the layer's depth.
    pub lut: &'a [u16],
}

impl<P: LayerPixel> ColorPipeline<'_, P> {
    /// Composite one physical row of `pixels` over `out`.
    ///
    /// Columns beyond the shorter of the two slices are left alone.
    pub fn fill_row<O: ScanlinePixel>(&self, row: u16, pixels: &[P], out: &mut [O], shifts: u8) {
        if self.brightness == 0 || !self.chroma.covers_row(row) {
            return;
        }

        let opaque = self.brightness == u8::MAX;
        let upper = f32::from(self.brightness) / 255.0;
        let lower = f32::from(u8::MAX - self.brightness) / 255.0;

        for (&pixel, slot) in pixels.iter().zip(out.iter_mut()) {
            if self.chroma.is_keyed(pixel) {
                continue;
            }
            let value = if self.color_correction {
                pixel.corrected(self.lut, shifts)
            } else {
                pixel.uncorrected(shifts)
            };
            let incoming = O::from_rgb48(value);
            *slot = if opaque {
                incoming
            } else {
                slot.blend(incoming, lower, upper)
            };
        }
    }
}
