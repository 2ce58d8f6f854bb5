//! Pixel values and depth-specific channel arithmetic
//!
//! Two storage depths are supported, selected at compile time through
//! [`LayerPixel`]:
//!
//! | Type      | Depth    | Channel bits | LUT entries | LUT index                      |
//! |-----------|----------|--------------|-------------|--------------------------------|
//! | [`Rgb24`] | Compact  | 8            | 256         | `channel << shifts`            |
//! | [`Rgb48`] | Extended | 16           | 4096        | `channel >> (4 - shifts)`      |
//!
//! Output scanlines are either 24-bit or 48-bit ([`ScanlinePixel`]). The
//! corrected value of a pixel is always produced at 16 bits per channel and
//! narrowed to the output depth.

use embedded_graphics::pixelcolor::{PixelColor, Rgb888, RgbColor};

use crate::MAX_BRIGHTNESS_SHIFTS;

/// Number of LUT entries for 8-bit-per-channel pixels.
pub const COMPACT_LUT_LEN: usize = 256;

/// Number of LUT entries for 16-bit-per-channel pixels (12-bit index).
pub const EXTENDED_LUT_LEN: usize = 4096;

/// Storage depth of a layer's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelDepth {
    /// 8 bits per channel.
    Compact,
    /// 16 bits per channel.
    Extended,
}

impl PixelDepth {
    /// Number of entries in the colour-correction table for this depth.
    pub const fn lut_len(self) -> usize {
        match self {
            Self::Compact => COMPACT_LUT_LEN,
            Self::Extended => EXTENDED_LUT_LEN,
        }
    }
}

// ── Pixel types ─────────────────────────────────────────────────────────────

/// 24-bit RGB pixel, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct Rgb24 {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

impl Rgb24 {
    /// All channels off.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// All channels at full scale.
    pub const WHITE: Self = Self::new(0xFF, 0xFF, 0xFF);
    /// Full red.
    pub const RED: Self = Self::new(0xFF, 0, 0);
    /// Full green.
    pub const GREEN: Self = Self::new(0, 0xFF, 0);
    /// Full blue.
    pub const BLUE: Self = Self::new(0, 0, 0xFF);

    /// Create a pixel from its three channels.
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// 48-bit RGB pixel, 16 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(C)]
pub struct Rgb48 {
    /// Red channel.
    pub red: u16,
    /// Green channel.
    pub green: u16,
    /// Blue channel.
    pub blue: u16,
}

impl Rgb48 {
    /// All channels off.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// All channels at full scale.
    pub const WHITE: Self = Self::new(0xFFFF, 0xFFFF, 0xFFFF);
    /// Full red.
    pub const RED: Self = Self::new(0xFFFF, 0, 0);
    /// Full green.
    pub const GREEN: Self = Self::new(0, 0xFFFF, 0);
    /// Full blue.
    pub const BLUE: Self = Self::new(0, 0, 0xFFFF);

    /// Create a pixel from its three channels.
    pub const fn new(red: u16, green: u16, blue: u16) -> Self {
        Self { red, green, blue }
    }
}

/// Widen an 8-bit channel to 16 bits so that 0xFF maps to 0xFFFF.
#[inline]
pub const fn widen(channel: u8) -> u16 {
    // 0xFF * 0x101 = 0xFFFF, cannot overflow u16.
    #[allow(clippy::arithmetic_side_effects)]
    let wide = channel as u16 * 0x101;
    wide
}

/// Narrow a 16-bit channel to its high byte.
#[inline]
#[allow(clippy::cast_possible_truncation)] // >> 8 leaves at most 8 significant bits
pub const fn narrow(channel: u16) -> u8 {
    (channel >> 8) as u8
}

impl From<Rgb24> for Rgb48 {
    fn from(c: Rgb24) -> Self {
        Self::new(widen(c.red), widen(c.green), widen(c.blue))
    }
}

impl From<Rgb48> for Rgb24 {
    fn from(c: Rgb48) -> Self {
        Self::new(narrow(c.red), narrow(c.green), narrow(c.blue))
    }
}

impl From<Rgb888> for Rgb24 {
    fn from(c: Rgb888) -> Self {
        Self::new(c.r(), c.g(), c.b())
    }
}

impl From<Rgb24> for Rgb888 {
    fn from(c: Rgb24) -> Self {
        Rgb888::new(c.red, c.green, c.blue)
    }
}

impl From<Rgb888> for Rgb48 {
    fn from(c: Rgb888) -> Self {
        Rgb24::from(c).into()
    }
}

impl From<Rgb48> for Rgb888 {
    fn from(c: Rgb48) -> Self {
        Rgb24::from(c).into()
    }
}

// Neither type has a packed wire format: the layer stores them as plain
// structs and never hands raw bytes to a display controller.
impl PixelColor for Rgb24 {
    type Raw = ();
}

impl PixelColor for Rgb48 {
    type Raw = ();
}

// ── Depth-parametrised behaviour ────────────────────────────────────────────

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Rgb24 {}
    impl Sealed for super::Rgb48 {}
}

/// A pixel type a layer can store.
///
/// Implemented for [`Rgb24`] and [`Rgb48`] only. Every method is resolved at
/// compile time; the refresh loop never goes through a vtable.
pub trait LayerPixel:
    sealed::Sealed + PixelColor + Copy + PartialEq + Default + Send + Sync + 'static
{
    /// Storage depth of this pixel type.
    const DEPTH: PixelDepth;

    /// Zero value used to initialise buffers.
    const BLACK: Self;

    /// Colour-correction table storage, sized for this depth.
    type Lut: AsRef<[u16]> + AsMut<[u16]> + Send;

    /// A table mapping every index linearly onto the 16-bit output range.
    fn identity_lut() -> Self::Lut;

    /// Channels as `[red, green, blue]`, at native width.
    fn channels(self) -> [u16; 3];

    /// Rebuild a pixel from native-width channels (excess bits are dropped).
    fn from_channels(channels: [u16; 3]) -> Self;

    /// Brightness-shifted, LUT-corrected value at 16 bits per channel.
    ///
    /// Indices past the end of `lut` are clamped to the last entry.
    fn corrected(self, lut: &[u16], shifts: u8) -> Rgb48;

    /// Brightness-shifted value without colour correction, at 16 bits per
    /// channel. The shift saturates at the channel maximum.
    fn uncorrected(self, shifts: u8) -> Rgb48;
}

#[inline]
fn lut_lookup(lut: &[u16], index: usize) -> u16 {
    let clamped = index.min(lut.len().saturating_sub(1));
    lut.get(clamped).copied().unwrap_or(0)
}

#[inline]
#[allow(clippy::cast_possible_truncation)] // min() bounds the value to `max`
fn saturating_shl(channel: u16, shifts: u8, max: u16) -> u16 {
    (u32::from(channel) << shifts).min(u32::from(max)) as u16
}

impl LayerPixel for Rgb24 {
    const DEPTH: PixelDepth = PixelDepth::Compact;
    const BLACK: Self = Rgb24::BLACK;

    type Lut = [u16; COMPACT_LUT_LEN];

    fn identity_lut() -> Self::Lut {
        let mut lut = [0u16; COMPACT_LUT_LEN];
        for (i, entry) in (0u8..=u8::MAX).zip(lut.iter_mut()) {
            *entry = widen(i);
        }
        lut
    }

    fn channels(self) -> [u16; 3] {
        [
            u16::from(self.red),
            u16::from(self.green),
            u16::from(self.blue),
        ]
    }

    #[allow(clippy::cast_possible_truncation)] // compact channels keep the low byte
    fn from_channels([r, g, b]: [u16; 3]) -> Self {
        Self::new(r as u8, g as u8, b as u8)
    }

    #[inline]
    fn corrected(self, lut: &[u16], shifts: u8) -> Rgb48 {
        let shifts = shifts.min(MAX_BRIGHTNESS_SHIFTS);
        let index = |c: u8| usize::from(c) << shifts;
        Rgb48::new(
            lut_lookup(lut, index(self.red)),
            lut_lookup(lut, index(self.green)),
            lut_lookup(lut, index(self.blue)),
        )
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)] // saturating_shl clamps to u8::MAX
    fn uncorrected(self, shifts: u8) -> Rgb48 {
        let shifts = shifts.min(MAX_BRIGHTNESS_SHIFTS);
        let shift = |c: u8| widen(saturating_shl(u16::from(c), shifts, 0xFF) as u8);
        Rgb48::new(shift(self.red), shift(self.green), shift(self.blue))
    }
}

impl LayerPixel for Rgb48 {
    const DEPTH: PixelDepth = PixelDepth::Extended;
    const BLACK: Self = Rgb48::BLACK;

    type Lut = [u16; EXTENDED_LUT_LEN];

    fn identity_lut() -> Self::Lut {
        let mut lut = [0u16; EXTENDED_LUT_LEN];
        for (i, entry) in (0u16..).zip(lut.iter_mut()) {
            // 12-bit index replicated into the low nibble: 0xFFF -> 0xFFFF.
            *entry = (i << 4) | (i >> 8);
        }
        lut
    }

    fn channels(self) -> [u16; 3] {
        [self.red, self.green, self.blue]
    }

    fn from_channels([r, g, b]: [u16; 3]) -> Self {
        Self::new(r, g, b)
    }

    #[inline]
    fn corrected(self, lut: &[u16], shifts: u8) -> Rgb48 {
        // shifts <= 4, so 4 - shifts never underflows.
        #[allow(clippy::arithmetic_side_effects)]
        let down = MAX_BRIGHTNESS_SHIFTS - shifts.min(MAX_BRIGHTNESS_SHIFTS);
        let index = |c: u16| usize::from(c >> down);
        Rgb48::new(
            lut_lookup(lut, index(self.red)),
            lut_lookup(lut, index(self.green)),
            lut_lookup(lut, index(self.blue)),
        )
    }

    #[inline]
    fn uncorrected(self, shifts: u8) -> Rgb48 {
        let shifts = shifts.min(MAX_BRIGHTNESS_SHIFTS);
        let shift = |c: u16| saturating_shl(c, shifts, u16::MAX);
        Rgb48::new(shift(self.red), shift(self.green), shift(self.blue))
    }
}

// ── Output scanline pixels ──────────────────────────────────────────────────

/// A pixel type an output scanline can hold.
pub trait ScanlinePixel: Copy {
    /// Narrow (or keep) a 16-bit-per-channel value to this depth.
    fn from_rgb48(value: Rgb48) -> Self;

    /// Weighted blend of `self` (existing content) with `incoming`,
    /// normalised by the weight sum.
    fn blend(self, incoming: Self, lower: f32, upper: f32) -> Self;
}

#[inline]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)] // weights are in [0, 1], so the result stays within [0, max]
fn blend_channel(existing: u16, incoming: u16, lower: f32, upper: f32, max: f32) -> u16 {
    let mixed = (f32::from(existing) * lower + f32::from(incoming) * upper) / (lower + upper);
    // round to nearest; the float weights rarely land exactly on an integer
    (mixed + 0.5).clamp(0.0, max) as u16
}

impl ScanlinePixel for Rgb24 {
    #[inline]
    fn from_rgb48(value: Rgb48) -> Self {
        value.into()
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)] // blend_channel is clamped to 255
    fn blend(self, incoming: Self, lower: f32, upper: f32) -> Self {
        let mix = |e: u8, n: u8| {
            blend_channel(u16::from(e), u16::from(n), lower, upper, 255.0) as u8
        };
        Self::new(
            mix(self.red, incoming.red),
            mix(self.green, incoming.green),
            mix(self.blue, incoming.blue),
        )
    }
}

impl ScanlinePixel for Rgb48 {
    #[inline]
    fn from_rgb48(value: Rgb48) -> Self {
        value
    }

    #[inline]
    fn blend(self, incoming: Self, lower: f32, upper: f32) -> Self {
        let mix = |e: u16, n: u16| blend_channel(e, n, lower, upper, 65535.0);
        Self::new(
            mix(self.red, incoming.red),
            mix(self.green, incoming.green),
            mix(self.blue, incoming.blue),
        )
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
