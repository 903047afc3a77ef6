//! # UART Receive Ring Buffer
//!
//! Fixed-capacity byte queue between the UART receive interrupt (producer)
//! and the command loop (consumer).
//!
//! ## Ownership of the cursors
//!
//! ```text
//!   RX interrupt                                   main loop
//!   ────────────                                   ─────────
//!   write(byte) ──► [ b0 | b1 | b2 | .. | bN-1 ] ──► read()
//!                     ▲                   ▲
//!                   read_idx          write_idx
//!                  (consumer)         (producer)
//! ```
//!
//! 1. **Free-running cursors**: `write_idx` and `read_idx` count bytes and are
//!    only masked when indexing, so `write_idx - read_idx` is the number of
//!    queued bytes and a full buffer is never mistaken for an empty one.
//!
//! 2. **Single writer per cursor**: the producer stores `write_idx` (and
//!    `reserve_idx`), the consumer stores `read_idx` and `dropped`. No
//!    read-modify-write atomics are needed, so the buffer also works on cores
//!    without compare-and-swap.
//!
//! 3. **Overrun**: `write` never blocks. When the producer laps the consumer
//!    the oldest bytes are overwritten; the consumer notices on its next
//!    `read`, skips to the oldest byte still stored and adds the gap to
//!    `dropped`. Producers that prefer backpressure use `try_push`.
//!
//! The consumer is expected to drain the queue faster than a command burst
//! arrives; an `N` of a few hundred bytes covers a full AT command line with
//! plenty of margin at typical baud rates.

use core::sync::atomic::{fence, AtomicU8, AtomicUsize, Ordering};

/// Default receive queue size used by the board and the simulator.
pub const RX_BUFFER_SIZE: usize = 256;

#[allow(clippy::declare_interior_mutable_const)]
const EMPTY_SLOT: AtomicU8 = AtomicU8::new(0);

/// Errors specific to buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// The ring buffer holds `N` unread bytes; nothing was written
    Full,
    /// The command accumulator reached its capacity
    Overflow,
}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Full => f.write_str("ring buffer full"),
            Self::Overflow => f.write_str("command buffer overflow"),
        }
    }
}

/// Single-producer single-consumer byte ring buffer
///
/// `N` must be a non-zero power of two so that the free-running cursors stay
/// consistent across integer wrap-around.
///
/// # Example
///
/// ```rust
/// use at_core::RingBuffer;
///
/// static RX: RingBuffer<16> = RingBuffer::new();
///
/// // Receive interrupt
/// for &b in b"AT+HELP" {
///     RX.write(b);
/// }
///
/// // Main loop
/// assert_eq!(RX.read(), Some(b'A'));
/// assert_eq!(RX.len(), 6);
/// ```
pub struct RingBuffer<const N: usize> {
    /// Byte slots, atomics so both contexts can touch them without `unsafe`
    data: [AtomicU8; N],

    /// Bytes published to the consumer (producer-owned)
    write_idx: AtomicUsize,

    /// Bytes the producer has started writing; runs ahead of `write_idx`
    /// only while a store is in flight (producer-owned)
    reserve_idx: AtomicUsize,

    /// Bytes consumed (consumer-owned)
    read_idx: AtomicUsize,

    /// Bytes lost to overwrite, as observed by the consumer (consumer-owned)
    dropped: AtomicUsize,
}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = N - 1;

    const CAPACITY_OK: () = assert!(
        N > 0 && N.is_power_of_two(),
        "RingBuffer capacity must be a non-zero power of two"
    );

    /// Create an empty buffer, usable in a `static`
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_OK;

        Self {
            data: [EMPTY_SLOT; N],
            write_idx: AtomicUsize::new(0),
            reserve_idx: AtomicUsize::new(0),
            read_idx: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Get the total capacity of the buffer
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of unread bytes, capped at `N` while an overrun is pending
    #[inline]
    pub fn len(&self) -> usize {
        let write = self.write_idx.load(Ordering::Acquire);
        let read = self.read_idx.load(Ordering::Acquire);
        write.wrapping_sub(read).min(N)
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if the buffer is full
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Total bytes lost to overwrite since creation
    #[inline]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Producer side: store one byte, overwriting the oldest if full
    ///
    /// Never blocks and never fails; this is the receive interrupt hook.
    pub fn write(&self, byte: u8) {
        let head = self.write_idx.load(Ordering::Relaxed);
        self.store(head, byte);
    }

    /// Producer side: store one byte unless the buffer is full
    pub fn try_push(&self, byte: u8) -> Result<(), BufferError> {
        let head = self.write_idx.load(Ordering::Relaxed);
        let tail = self.read_idx.load(Ordering::Acquire);
        if head.wrapping_sub(tail) >= N {
            return Err(BufferError::Full);
        }
        self.store(head, byte);
        Ok(())
    }

    fn store(&self, head: usize, byte: u8) {
        let next = head.wrapping_add(1);
        // Announce the slot before touching it so a concurrent reader of the
        // same slot can tell its copy may be stale.
        self.reserve_idx.store(next, Ordering::Relaxed);
        fence(Ordering::Release);
        self.data[head & Self::MASK].store(byte, Ordering::Relaxed);
        self.write_idx.store(next, Ordering::Release);
    }

    /// Consumer side: take the oldest unread byte
    ///
    /// Returns `None` when empty without moving the read cursor.
    pub fn read(&self) -> Option<u8> {
        loop {
            let tail = self.read_idx.load(Ordering::Relaxed);
            let head = self.write_idx.load(Ordering::Acquire);
            let pending = head.wrapping_sub(tail);

            if pending == 0 {
                return None;
            }

            if pending > N {
                self.skip_overrun(head, pending - N);
                continue;
            }

            let byte = self.data[tail & Self::MASK].load(Ordering::Relaxed);
            fence(Ordering::Acquire);
            let reserved = self.reserve_idx.load(Ordering::Relaxed);
            if reserved.wrapping_sub(tail) > N {
                // Producer reached this slot while we were reading it.
                continue;
            }

            self.read_idx.store(tail.wrapping_add(1), Ordering::Release);
            return Some(byte);
        }
    }

    fn skip_overrun(&self, head: usize, lost: usize) {
        let dropped = self.dropped.load(Ordering::Relaxed);
        self.dropped.store(dropped.wrapping_add(lost), Ordering::Relaxed);
        self.read_idx.store(head.wrapping_sub(N), Ordering::Release);
        warn!("rx ring overrun, {} bytes lost", lost);
    }

    /// Consumer side: discard everything currently queued
    ///
    /// Returns the number of bytes discarded.
    pub fn clear(&self) -> usize {
        let mut discarded = 0;
        while self.read().is_some() {
            discarded += 1;
        }
        discarded
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
