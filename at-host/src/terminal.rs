//! # Terminal Loop
//!
//! Two futures share one [`RingBuffer`]:
//!
//! ```text
//!  stdin ──► feed_input ──► RingBuffer::write ──► Notify
//!                                                   │
//!              idle for quiet gap ◄── notified() ◄─┘
//!                         │
//!                         ▼
//!              Session::process_cycle ──► stdout
//! ```
//!
//! `feed_input` plays the receive interrupt: it only pushes bytes and signals.
//! The consumer waits for the line to go quiet before running a cycle, so a
//! pasted command arrives in one piece. Terminals send a bare `\n` on Enter;
//! it is widened to `\r\n` on the way in to match a serial terminal.

use std::sync::atomic::{AtomicBool, Ordering};

use at_core::{Outcome, RingBuffer, Session, SessionStats};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::Notify;

use crate::board::HostBoard;
use crate::config::HostConfig;
use crate::error::HostError;

/// Read chunk size for the input side
const READ_CHUNK: usize = 64;

/// Totals for one terminal run, summed over every session
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Sessions started (one plus one per restart)
    pub sessions: u32,
    /// Bytes received from the input
    pub bytes_in: usize,
    pub cycles: u32,
    pub completed: u32,
    pub errors_reported: u32,
    pub resyncs: u32,
    pub overflows: u32,
    pub restarts: u32,
    /// Bytes overwritten in the ring before a cycle could read them
    pub rx_dropped: usize,
}

impl RunReport {
    fn absorb(&mut self, stats: &SessionStats) {
        self.cycles = self.cycles.wrapping_add(stats.cycles);
        self.completed = self.completed.wrapping_add(stats.completed);
        self.errors_reported = self.errors_reported.wrapping_add(stats.errors_reported);
        self.resyncs = self.resyncs.wrapping_add(stats.resyncs);
        self.overflows = self.overflows.wrapping_add(stats.overflows);
        self.restarts = self.restarts.wrapping_add(stats.restarts);
    }

    /// Encode the report as a single JSON line
    pub fn to_json(&self) -> Result<String, HostError> {
        serde_json::to_string(self).map_err(HostError::Report)
    }
}

/// Push one input chunk into the ring, widening bare `\n` to `\r\n`
///
/// `last` carries the previous byte across chunks so a `\r\n` split between
/// two reads is not widened twice.
pub fn push_input<const N: usize>(rx: &RingBuffer<N>, chunk: &[u8], last: &mut u8) {
    for &byte in chunk {
        if byte == b'\n' && *last != b'\r' {
            rx.write(b'\r');
        }
        rx.write(byte);
        *last = byte;
    }
}

async fn feed_input<R, const N: usize>(
    mut input: R,
    rx: &RingBuffer<N>,
    ready: &Notify,
    eof: &AtomicBool,
) -> Result<usize, HostError>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; READ_CHUNK];
    let mut last = 0u8;
    let mut total = 0;

    let result = loop {
        match input.read(&mut chunk).await {
            Ok(0) => break Ok(total),
            Ok(n) => {
                push_input(rx, &chunk[..n], &mut last);
                total += n;
                ready.notify_one();
            }
            Err(e) => break Err(HostError::Io(e)),
        }
    };

    debug!("input closed after {} bytes", total);
    eof.store(true, Ordering::Release);
    ready.notify_one();
    result
}

async fn run_cycles<W, const N: usize>(
    output: W,
    rx: &RingBuffer<N>,
    config: &HostConfig,
    ready: &Notify,
    eof: &AtomicBool,
) -> Result<RunReport, HostError>
where
    W: AsyncWrite + Unpin,
{
    let mut report = RunReport {
        sessions: 1,
        ..RunReport::default()
    };
    let mut session: Session<'_, HostBoard<W>, N> =
        Session::init(rx, HostBoard::new(output), config.session);
    info!("at-term v{} ready", at_core::VERSION);

    loop {
        ready.notified().await;
        // Every new chunk restarts the gap
        while tokio::time::timeout(config.quiet_gap(), ready.notified())
            .await
            .is_ok()
        {}

        while !rx.is_empty() {
            let result = session.process_cycle().await;
            match result {
                Ok(Outcome::Restarted) => {
                    report.absorb(session.stats());
                    let mut board = session.into_board();
                    board.power_on_reset();
                    report.sessions += 1;
                    session = Session::init(rx, board, config.session);
                    info!("at-term v{} ready", at_core::VERSION);
                }
                Ok(outcome) => debug!("cycle finished: {:?}", outcome),
                Err(e) => {
                    warn!("console write failed: {}", e);
                    report.absorb(session.stats());
                    report.rx_dropped = rx.dropped();
                    return Err(e.into());
                }
            }
        }

        if eof.load(Ordering::Acquire) && rx.is_empty() {
            break;
        }
    }

    report.absorb(session.stats());
    report.rx_dropped = rx.dropped();
    Ok(report)
}

/// Run the command loop until `input` reaches end of file
///
/// Returns once every byte received before EOF has been processed.
pub async fn run<R, W, const N: usize>(
    input: R,
    output: W,
    rx: &RingBuffer<N>,
    config: &HostConfig,
) -> Result<RunReport, HostError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let ready = Notify::new();
    let eof = AtomicBool::new(false);

    let (fed, report) = tokio::join!(
        feed_input(input, rx, &ready, &eof),
        run_cycles(output, rx, config, &ready, &eof),
    );

    let mut report = report?;
    report.bytes_in = fed?;
    info!(
        "input closed: {} bytes, {} cycles, {} restarts",
        report.bytes_in, report.cycles, report.restarts
    );
    Ok(report)
}
