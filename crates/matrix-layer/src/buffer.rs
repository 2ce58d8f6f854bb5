//! Double-buffer pixel storage
//!
//! [`BufferPair`] is two equal-size pixel arrays carved out of one contiguous
//! slice. It holds no role bookkeeping of its own; which half is "draw" and
//! which is "refresh" is decided by the [`SwapCoordinator`](crate::swap::SwapCoordinator),
//! and each layer handle only ever asks for the half its role owns.
//!
//! Producer and consumer reach the storage through a shared reference, so
//! the pair is `Sync` and hands out slices through `unsafe` accessors whose
//! contract is the role partition.

use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::error::LayerError;

/// Two pixel buffers of `len` pixels each.
pub struct BufferPair<'buf, P> {
    base: NonNull<P>,
    len: usize,
    _storage: PhantomData<&'buf mut [P]>,
}

// SAFETY: the pair is only ever accessed through its `unsafe` accessors,
// whose callers guarantee that each buffer is touched by one context at a
// time (the role owner). `P: Send` lets pixels be written on one thread and
// read on another.
unsafe impl<P: Send> Sync for BufferPair<'_, P> {}

// SAFETY: the pair exclusively borrows its storage for `'buf`.
unsafe impl<P: Send> Send for BufferPair<'_, P> {}

impl<'buf, P: Copy> BufferPair<'buf, P> {
    /// Split `storage` into two buffers of `len` pixels.
    ///
    /// Storage beyond `2 × len` is left untouched and unused. Both buffers are
    /// filled with `zero`.
    pub fn new(storage: &'buf mut [P], len: usize, zero: P) -> Result<Self, LayerError> {
        let actual = storage.len();
        let required = len.checked_mul(2).ok_or(LayerError::StorageTooSmall {
            required: usize::MAX,
            actual,
        })?;
        let used = storage
            .get_mut(..required)
            .ok_or(LayerError::StorageTooSmall { required, actual })?;
        used.fill(zero);
        Ok(Self {
            base: NonNull::from(used).cast(),
            len,
            _storage: PhantomData,
        })
    }

    /// Pixels in one buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` for a zero-sized pair.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // index is 0 or 1 and 2 × len was checked in `new`
    #[allow(clippy::arithmetic_side_effects)]
    fn half(&self, index: u8) -> *mut P {
        let offset = usize::from(index & 1) * self.len;
        // SAFETY: offset <= len, inside the 2 × len allocation.
        unsafe { self.base.as_ptr().add(offset) }
    }

    /// Shared view of buffer `index` (0 or 1; higher bits are ignored).
    ///
    /// # Safety
    ///
    /// The caller must hold the role that owns buffer `index`, or otherwise
    /// know no other context writes it for the lifetime of the slice.
    pub unsafe fn buffer(&self, index: u8) -> &[P] {
        // SAFETY: `half` is in bounds for `len` pixels; aliasing is the
        // caller's contract.
        unsafe { core::slice::from_raw_parts(self.half(index), self.len) }
    }

    /// Exclusive view of buffer `index` (0 or 1; higher bits are ignored).
    ///
    /// # Safety
    ///
    /// The caller must hold the role that owns buffer `index` and must not
    /// create any other reference to it for the lifetime of the slice.
    #[allow(clippy::mut_from_ref)] // exclusivity comes from the role partition
    pub unsafe fn buffer_mut(&self, index: u8) -> &mut [P] {
        // SAFETY: as for `buffer`, plus the caller's exclusivity guarantee.
        unsafe { core::slice::from_raw_parts_mut(self.half(index), self.len) }
    }

    /// Copy buffer `from` over the other buffer.
    ///
    /// # Safety
    ///
    /// No other context may read or write either buffer for the duration of
    /// the call. Used only while the consumer is known not to touch the
    /// target buffer (immediately after an exchange, on the producer side).
    pub unsafe fn copy_across(&self, from: u8) {
        let src = self.half(from);
        let dst = self.half(from ^ 1);
        // SAFETY: both halves are valid for `len` pixels and do not overlap
        // since their indices differ in the low bit.
        unsafe { core::ptr::copy_nonoverlapping(src, dst, self.len) };
    }
}

impl<P> core::fmt::Debug for BufferPair<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BufferPair")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
