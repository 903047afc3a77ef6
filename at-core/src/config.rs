//! Session configuration

use serde::{Deserialize, Serialize};

/// Settle delays, in milliseconds
///
/// These are unconditional pauses that let a response drain over a slow
/// transport before the next print or a destructive action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct Timing {
    /// After the unknown-command error, before the receiver is reinitialized
    pub reinit_settle_ms: u32,
    /// After `[OK]` for `AT+RESET`, before the restart
    pub reset_settle_ms: u32,
    /// After each help line
    pub help_line_settle_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            reinit_settle_ms: 15,
            reset_settle_ms: 25,
            help_line_settle_ms: 15,
        }
    }
}

/// What a cycle does when more bytes are queued than the command buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Drop the line and everything still queued, answer `[ERROR:1]` and
    /// reinitialize the receiver
    #[default]
    FlushAndReset,
    /// Keep what fit, drop the rest, and parse the kept bytes
    Truncate,
}

/// Configuration for a [`crate::Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct SessionConfig {
    /// Settle delays
    pub timing: Timing,
    /// Command buffer overflow handling
    pub overflow: OverflowPolicy,
}
