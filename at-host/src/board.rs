//! Desktop stand-ins for the board peripherals
//!
//! The console writes to any tokio `AsyncWrite` (stdout in the binary, a
//! `Vec<u8>` in tests), the LED is a plain flag, and delays are tokio timers.

use std::convert::Infallible;
use std::time::Duration;

use at_core::Board;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin, StatefulOutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_io::ErrorType;
use log::{debug, info};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Console transport over a tokio writer
pub struct TokioConsole<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> TokioConsole<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: AsyncWrite + Unpin> ErrorType for TokioConsole<W> {
    type Error = std::io::Error;
}

impl<W: AsyncWrite + Unpin> embedded_io_async::Write for TokioConsole<W> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        AsyncWriteExt::write(&mut self.inner, buf).await
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        AsyncWriteExt::flush(&mut self.inner).await
    }
}

/// Simulated user LED
#[derive(Debug, Default)]
pub struct SimLed {
    lit: bool,
}

impl SimLed {
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl PinErrorType for SimLed {
    type Error = Infallible;
}

impl OutputPin for SimLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.lit {
            info!("LED off");
        }
        self.lit = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.lit {
            info!("LED on");
        }
        self.lit = true;
        Ok(())
    }
}

impl StatefulOutputPin for SimLed {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.lit)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.lit)
    }
}

/// Delay provider backed by tokio timers
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

impl DelayNs for TokioDelay {
    async fn delay_ns(&mut self, ns: u32) {
        tokio::time::sleep(Duration::from_nanos(ns.into())).await;
    }

    async fn delay_ms(&mut self, ms: u32) {
        tokio::time::sleep(Duration::from_millis(ms.into())).await;
    }
}

/// Simulated board: terminal console, LED flag and tokio delays
pub struct HostBoard<W> {
    console: TokioConsole<W>,
    led: SimLed,
    delay: TokioDelay,
    reinits: u32,
    restarts: u32,
}

impl<W: AsyncWrite + Unpin> HostBoard<W> {
    pub fn new(output: W) -> Self {
        Self {
            console: TokioConsole::new(output),
            led: SimLed::default(),
            delay: TokioDelay,
            reinits: 0,
            restarts: 0,
        }
    }

    /// Bring the peripherals back to their reset state
    ///
    /// Called after a requested restart, before a fresh session is bound.
    pub fn power_on_reset(&mut self) {
        let _ = self.led.set_low();
        debug!("peripherals reset");
    }

    pub fn led_is_lit(&self) -> bool {
        self.led.is_lit()
    }

    /// Receiver reinitializations since start-up
    pub fn reinits(&self) -> u32 {
        self.reinits
    }

    /// Restarts requested since start-up
    pub fn restarts(&self) -> u32 {
        self.restarts
    }
}

impl<W: AsyncWrite + Unpin> Board for HostBoard<W> {
    type Console = TokioConsole<W>;
    type Led = SimLed;
    type Delay = TokioDelay;

    fn console(&mut self) -> &mut Self::Console {
        &mut self.console
    }

    fn led(&mut self) -> &mut Self::Led {
        &mut self.led
    }

    fn delay(&mut self) -> &mut Self::Delay {
        &mut self.delay
    }

    fn reinit_receiver(&mut self) {
        self.reinits = self.reinits.wrapping_add(1);
        debug!("receiver reinitialized ({})", self.reinits);
    }

    fn restart_device(&mut self) {
        self.restarts = self.restarts.wrapping_add(1);
        info!("restart requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io_async::Write;

    #[tokio::test]
    async fn test_console_writes_through() {
        let mut console = TokioConsole::new(Vec::new());
        console.write_all(b"[OK]\r\n").await.unwrap();
        console.flush().await.unwrap();
        assert_eq!(console.into_inner(), b"[OK]\r\n");
    }

    #[test]
    fn test_sim_led_state() {
        let mut led = SimLed::default();
        assert!(led.is_set_low().unwrap());

        led.set_high().unwrap();
        assert!(led.is_lit());
        assert!(led.is_set_high().unwrap());

        led.set_low().unwrap();
        assert!(!led.is_lit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_delay_advances_clock() {
        let start = tokio::time::Instant::now();
        TokioDelay.delay_ms(25).await;
        assert_eq!(start.elapsed(), Duration::from_millis(25));
    }

    #[test]
    fn test_power_on_reset_turns_led_off() {
        let mut board = HostBoard::new(Vec::new());
        board.led().set_high().unwrap();
        assert!(board.led_is_lit());

        board.power_on_reset();
        assert!(!board.led_is_lit());
    }

    #[test]
    fn test_board_counters() {
        let mut board = HostBoard::new(Vec::new());
        board.reinit_receiver();
        board.reinit_receiver();
        board.restart_device();
        assert_eq!(board.reinits(), 2);
        assert_eq!(board.restarts(), 1);
    }
}
