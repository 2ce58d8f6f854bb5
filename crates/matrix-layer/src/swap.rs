//! Producer/consumer buffer-swap handshake
//!
//! ```text
//!            request_swap()               exchange_if_pending()
//!   Idle ───────────────────► SwapRequested ───────────────────► Exchanging
//!    ▲        (producer)                        (consumer)            │
//!    └────────────────────────────────────────────────────────────────┘
//!                         roles flipped, state released
//! ```
//!
//! The role state is a single draw index; the refresh index is always the
//! other buffer, so both roles can never name the same buffer. Only the
//! consumer moves the index, and only while it holds the `Exchanging` state.
//! The producer only reads it while `Idle`, when nothing can move it.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Swap handshake state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SwapState {
    /// No swap in flight. The producer owns the draw buffer.
    Idle = 0,
    /// The producer has finished a frame and waits for the consumer.
    SwapRequested = 1,
    /// The consumer is flipping roles.
    Exchanging = 2,
}

impl SwapState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::SwapRequested,
            2 => Self::Exchanging,
            _ => Self::Idle,
        }
    }
}

/// Lock-free swap handshake between one producer and one consumer.
#[derive(Debug)]
pub struct SwapCoordinator {
    state: AtomicU8,
    draw: AtomicU8,
    exchanges: AtomicU32,
}

impl Default for SwapCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Back off once inside a wait loop.
#[inline]
pub(crate) fn relax() {
    core::hint::spin_loop();
    #[cfg(feature = "std")]
    std::thread::yield_now();
}

impl SwapCoordinator {
    /// Buffer 0 draws, buffer 1 refreshes, nothing pending.
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(SwapState::Idle as u8),
            draw: AtomicU8::new(0),
            exchanges: AtomicU32::new(0),
        }
    }

    /// Current handshake state.
    pub fn state(&self) -> SwapState {
        SwapState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// `true` from a swap request until the consumer has exchanged.
    pub fn is_swap_pending(&self) -> bool {
        self.state() != SwapState::Idle
    }

    /// Index of the buffer the producer draws into.
    pub fn draw_index(&self) -> u8 {
        self.draw.load(Ordering::Acquire)
    }

    /// Index of the buffer the consumer reads from.
    pub fn refresh_index(&self) -> u8 {
        self.draw_index() ^ 1
    }

    /// Completed exchanges since construction (wrapping).
    pub fn exchanges(&self) -> u32 {
        self.exchanges.load(Ordering::Acquire)
    }

    /// Request a swap if none is in flight.
    ///
    /// Returns `false` while a previous request is still pending.
    pub fn try_request_swap(&self) -> bool {
        self.state
            .compare_exchange(
                SwapState::Idle as u8,
                SwapState::SwapRequested as u8,
                // Release publishes the finished frame to the consumer
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Request a swap, spinning while a previous one is still pending.
    pub fn request_swap(&self) {
        while !self.try_request_swap() {
            relax();
        }
    }

    /// Spin until no swap is pending.
    pub fn wait_idle(&self) {
        while self.is_swap_pending() {
            relax();
        }
    }

    /// Consumer side: flip roles if a swap was requested.
    ///
    /// Never blocks. Returns `true` when an exchange happened.
    pub fn exchange_if_pending(&self) -> bool {
        if self
            .state
            .compare_exchange(
                SwapState::SwapRequested as u8,
                SwapState::Exchanging as u8,
                Ordering::Acquire,
                Ordering::Relaxed,
            )
            .is_err()
        {
            return false;
        }
        self.draw.fetch_xor(1, Ordering::AcqRel);
        // wrapping by definition of fetch_add on atomics
        self.exchanges.fetch_add(1, Ordering::Release);
        self.state.store(SwapState::Idle as u8, Ordering::Release);
        true
    }
}
