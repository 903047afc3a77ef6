//! # Command Session
//!
//! Binds the receive ring buffer to the board and runs one processing cycle
//! at a time:
//!
//! ```text
//!  drain ring ──► parse ──► clear buffer ──► execute ──► Outcome
//!       │
//!       └─ overflow ──► OverflowPolicy
//! ```
//!
//! The session borrows the ring buffer; the receive interrupt keeps writing
//! into the same buffer through a shared reference. It is created once, before
//! the main loop starts, and lives until the device stops.
//!
//! A cycle processes whatever bytes are queued at that moment. There is no
//! line framing, so a command split across two receive bursts can be parsed
//! early and answered with `[ERROR:1]`. Callers trigger cycles after the
//! receive line has gone quiet to keep that window small.

use serde::Serialize;

use crate::buffer::RingBuffer;
use crate::command_buffer::{CommandBuffer, COMMAND_BUFFER_SIZE};
use crate::config::{OverflowPolicy, SessionConfig};
use crate::error::SessionError;
use crate::executor::{CommandExecutor, Outcome, RecoveryCause};
use crate::parser::{self, ParsedCommand};
use crate::traits::Board;

/// Counters kept across cycles
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionStats {
    /// Cycles run
    pub cycles: u32,
    /// Commands that ended in `[OK]`
    pub completed: u32,
    /// Error codes reported without recovery
    pub errors_reported: u32,
    /// Receiver reinitializations
    pub resyncs: u32,
    /// Cycles whose input did not fit the command buffer
    pub overflows: u32,
    /// Restarts requested
    pub restarts: u32,
    /// Bytes lost in the ring buffer before this session could read them
    pub rx_dropped: usize,
}

impl SessionStats {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Completed(_) => self.completed = self.completed.wrapping_add(1),
            Outcome::Reported(_) => self.errors_reported = self.errors_reported.wrapping_add(1),
            Outcome::Resynchronized(_) => self.resyncs = self.resyncs.wrapping_add(1),
            Outcome::Restarted => self.restarts = self.restarts.wrapping_add(1),
        }
    }
}

/// Long-lived command processing state
pub struct Session<'a, B, const N: usize, const CAP: usize = COMMAND_BUFFER_SIZE>
where
    B: Board,
{
    rx: &'a RingBuffer<N>,
    line: CommandBuffer<CAP>,
    board: B,
    executor: CommandExecutor,
    config: SessionConfig,
    stats: SessionStats,
}

impl<'a, B, const N: usize, const CAP: usize> Session<'a, B, N, CAP>
where
    B: Board,
{
    /// Bind the receive buffer and board; call once before the main loop
    pub fn init(rx: &'a RingBuffer<N>, board: B, config: SessionConfig) -> Self {
        info!("AT session started (rx {} bytes, line {} bytes)", N, CAP);
        Self {
            rx,
            line: CommandBuffer::new(),
            board,
            executor: CommandExecutor::new(config.timing),
            config,
            stats: SessionStats {
                rx_dropped: rx.dropped(),
                ..SessionStats::default()
            },
        }
    }

    /// Drain, parse and execute whatever is queued
    ///
    /// The command buffer is empty when this returns, whatever the outcome.
    pub async fn process_cycle(&mut self) -> Result<Outcome, SessionError> {
        self.stats.cycles = self.stats.cycles.wrapping_add(1);

        let drained = self.line.drain_from(self.rx);
        self.note_ring_losses();

        let command = match drained {
            Ok(len) => {
                trace!("cycle {}: {} bytes", self.stats.cycles, len);
                Some(parser::parse(self.line.as_bytes()))
            }
            Err(_) => self.handle_overflow(),
        };

        self.line.clear();

        let result = match command {
            Some(cmd) => {
                debug!("parsed {:?} {:?}", cmd.kind, cmd.operation);
                self.executor.execute(&mut self.board, cmd).await
            }
            None => {
                self.executor
                    .resynchronize(&mut self.board, RecoveryCause::Overflow)
                    .await
            }
        };

        match &result {
            Ok(outcome) => self.stats.record(outcome),
            Err(e) => error!("cycle aborted: {:?}", e),
        }
        result
    }

    fn handle_overflow(&mut self) -> Option<ParsedCommand> {
        self.stats.overflows = self.stats.overflows.wrapping_add(1);
        let discarded = self.rx.clear();
        warn!(
            "command buffer overflow ({} bytes kept, {} more discarded)",
            self.line.len(),
            discarded
        );

        match self.config.overflow {
            OverflowPolicy::FlushAndReset => None,
            OverflowPolicy::Truncate => Some(parser::parse(self.line.as_bytes())),
        }
    }

    fn note_ring_losses(&mut self) {
        let dropped = self.rx.dropped();
        if dropped != self.stats.rx_dropped {
            warn!(
                "{} received bytes overwritten before they were read",
                dropped.wrapping_sub(self.stats.rx_dropped)
            );
            self.stats.rx_dropped = dropped;
        }
    }

    /// Bytes waiting in the command buffer (zero between cycles)
    pub fn pending_len(&self) -> usize {
        self.line.len()
    }

    /// Counters since `init`
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Get reference to the board
    pub fn board(&self) -> &B {
        &self.board
    }

    /// Get mutable reference to the board
    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    /// End the session and hand the board back, e.g. to start a new session
    /// after a simulated restart
    pub fn into_board(self) -> B {
        self.board
    }
}
