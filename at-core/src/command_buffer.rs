//! Pending command line accumulator

use heapless::Vec;

use crate::buffer::{BufferError, RingBuffer};

/// Size of the command accumulator; one AT line plus slack
pub const COMMAND_BUFFER_SIZE: usize = 128;

/// Bounded byte window holding the not-yet-processed command text
///
/// No terminator is enforced: whatever the ring buffer held at drain time is
/// what the parser sees.
#[derive(Debug, Default)]
pub struct CommandBuffer<const CAP: usize = COMMAND_BUFFER_SIZE> {
    buf: Vec<u8, CAP>,
}

impl<const CAP: usize> CommandBuffer<CAP> {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append one byte, failing instead of writing past the end
    pub fn push(&mut self, byte: u8) -> Result<(), BufferError> {
        self.buf.push(byte).map_err(|_| BufferError::Overflow)
    }

    /// Move every queued byte from `rx` into this buffer
    ///
    /// Stops at the first byte that does not fit and reports
    /// [`BufferError::Overflow`]; that byte is lost and the rest stay queued
    /// in `rx` for the caller's overflow policy to deal with.
    pub fn drain_from<const N: usize>(
        &mut self,
        rx: &RingBuffer<N>,
    ) -> Result<usize, BufferError> {
        let mut moved = 0;
        while let Some(byte) = rx.read() {
            self.push(byte)?;
            moved += 1;
        }
        Ok(moved)
    }

    /// Zero the used bytes and reset length
    pub fn clear(&mut self) {
        self.buf.iter_mut().for_each(|b| *b = 0);
        self.buf.clear();
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Get buffer length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Check if no more bytes fit
    pub fn is_full(&self) -> bool {
        self.buf.is_full()
    }

    /// Maximum number of bytes held
    pub const fn capacity(&self) -> usize {
        CAP
    }
}
