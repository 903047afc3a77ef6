//! Recording test doubles for [`Board`]

use std::string::String;
use std::vec::Vec;

use embedded_hal::digital::{self, OutputPin, StatefulOutputPin};
use embedded_hal_async::delay::DelayNs;

use crate::traits::Board;

/// Console that captures everything written
#[derive(Debug, Default)]
pub struct MockConsole {
    pub out: Vec<u8>,
    pub fail: bool,
}

impl embedded_io::ErrorType for MockConsole {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io_async::Write for MockConsole {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail {
            return Err(embedded_io::ErrorKind::Other);
        }
        self.out.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// LED pin that remembers its level
#[derive(Debug, Default)]
pub struct MockLed {
    pub high: bool,
    pub writes: u32,
    pub fail: bool,
}

impl digital::ErrorType for MockLed {
    type Error = digital::ErrorKind;
}

impl OutputPin for MockLed {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        if self.fail {
            return Err(digital::ErrorKind::Other);
        }
        self.high = false;
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if self.fail {
            return Err(digital::ErrorKind::Other);
        }
        self.high = true;
        self.writes += 1;
        Ok(())
    }
}

impl StatefulOutputPin for MockLed {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        if self.fail {
            return Err(digital::ErrorKind::Other);
        }
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }
}

/// Delay that returns immediately and records each request in ms
#[derive(Debug, Default)]
pub struct MockDelay {
    pub calls: Vec<u32>,
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls.push(ms);
    }
}

/// Board made of the doubles above plus reinit/restart counters
#[derive(Debug, Default)]
pub struct MockBoard {
    pub console: MockConsole,
    pub led: MockLed,
    pub delay: MockDelay,
    pub reinits: u32,
    pub restarts: u32,
    /// Number of delays already recorded at each reinit
    pub delays_before_reinit: Vec<usize>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console output since the last call, as text
    pub fn take_output(&mut self) -> String {
        let out = core::mem::take(&mut self.console.out);
        String::from_utf8(out).unwrap()
    }
}

impl Board for MockBoard {
    type Console = MockConsole;
    type Led = MockLed;
    type Delay = MockDelay;

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
        self.reinits += 1;
        self.delays_before_reinit.push(self.delay.calls.len());
    }

    fn restart_device(&mut self) {
        self.restarts += 1;
    }
}
