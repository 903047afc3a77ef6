//! # AT Terminal Simulator
//!
//! Runs the `at-core` command session on a desktop so the protocol can be
//! exercised without hardware:
//!
//! - **board**: console over a tokio writer, LED flag, tokio delays
//! - **terminal**: input feeder standing in for the receive interrupt, and
//!   the cycle loop that restarts the session on `AT+RESET`
//! - **config**: JSON settings (log level, quiet gap, session timing)

pub mod board;
pub mod config;
pub mod error;
pub mod terminal;

pub use board::{HostBoard, SimLed, TokioConsole, TokioDelay};
pub use config::HostConfig;
pub use error::HostError;
pub use terminal::{run, RunReport};
