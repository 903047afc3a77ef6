//! # Board Capabilities
//!
//! The command pipeline never touches hardware directly. Everything it needs
//! from the board is reached through the [`Board`] trait:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                         Session                           │
//! │                                                           │
//! │   RingBuffer ──► CommandBuffer ──► parse ──► Executor     │
//! │                                                 │         │
//! └─────────────────────────────────────────────────┼─────────┘
//!                                                   │ Board
//!          ┌──────────────┬──────────────┬──────────┼───────────┐
//!          ▼              ▼              ▼          ▼           ▼
//!       Console          Led           Delay   reinit_rx   restart
//!   (embedded-io)  (embedded-hal)  (e-h-async)
//! ```
//!
//! Using the `embedded-hal` / `embedded-io` traits for the three peripheral
//! handles means any HAL's UART, GPIO and timer plug in unchanged, and tests
//! substitute recording doubles.

use embedded_hal::digital::StatefulOutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::Write;

/// Hardware the command pipeline acts on
pub trait Board {
    /// Text output towards the terminal
    type Console: Write;
    /// The single binary output `AT+LED_ON` drives
    type Led: StatefulOutputPin;
    /// Timer used for settle delays
    type Delay: DelayNs;

    /// Get mutable reference to the console writer
    fn console(&mut self) -> &mut Self::Console;

    /// Get mutable reference to the LED pin
    fn led(&mut self) -> &mut Self::Led;

    /// Get mutable reference to the delay provider
    fn delay(&mut self) -> &mut Self::Delay;

    /// Put the UART receive path back into a known state
    fn reinit_receiver(&mut self);

    /// Restart the whole device
    ///
    /// On hardware this does not return. Implementations that do return (host
    /// simulator, tests) must leave the board ready to be reused by a freshly
    /// initialized session.
    fn restart_device(&mut self);
}
