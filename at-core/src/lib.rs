//! # AT Command Core
//!
//! UART ingestion and command interpretation for a small board:
//!
//! - **RingBuffer**: lock-free SPSC byte queue filled by the receive interrupt
//! - **CommandBuffer**: bounded window the main loop drains the queue into
//! - **Parser**: finds `AT+LED_ON=`, `AT+RESET` or `AT+HELP` in that window
//! - **Executor**: drives the LED, restarts or prints help, and answers
//! - **Session**: ties the above to one [`Board`] for the device lifetime
//!
//! ## Data flow
//!
//! ```text
//!  UART RX IRQ                              main loop
//!  ───────────                              ─────────
//!  RingBuffer::write(b) ──► RingBuffer ──► Session::process_cycle()
//!                                             │ drain
//!                                             ▼
//!                                        CommandBuffer ──► parse ──► execute
//!                                                                      │
//!                                             "[OK]\r\n" / "[ERROR:n]" ◄┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! static RX: RingBuffer<RX_BUFFER_SIZE> = RingBuffer::new();
//!
//! // in the UART interrupt
//! RX.write(byte);
//!
//! // in main
//! let mut session: Session<'_, _, RX_BUFFER_SIZE> =
//!     Session::init(&RX, board, SessionConfig::default());
//! loop {
//!     rx_signal.wait().await;
//!     match session.process_cycle().await {
//!         Ok(Outcome::Restarted) => unreachable!(),
//!         Ok(_) => {}
//!         Err(e) => defmt::error!("console: {}", e),
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

mod fmt;

pub mod buffer;
pub mod command_buffer;
pub mod config;
pub mod error;
pub mod executor;
pub mod parser;
pub mod session;
pub mod traits;

#[cfg(test)]
mod mock;

// Re-export main types for convenience
pub use buffer::{BufferError, RingBuffer, RX_BUFFER_SIZE};
pub use command_buffer::{CommandBuffer, COMMAND_BUFFER_SIZE};
pub use config::{OverflowPolicy, SessionConfig, Timing};
pub use error::{AtError, SessionError};
pub use executor::{CommandExecutor, Outcome, RecoveryCause};
pub use parser::{parse, CommandKind, OperationType, ParsedCommand};
pub use session::{Session, SessionStats};
pub use traits::Board;

/// Library version, printed in the boot banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
