//! # Command Executor
//!
//! Turns a [`ParsedCommand`] into a board action and a terminal response.
//!
//! ## Response table
//!
//! ```text
//! LED_ON  Get            "<0|1>\r\n[OK]\r\n"        + "\r\n"
//! LED_ON  Set 0|1        "[OK]\r\n"                 + "\r\n"
//! LED_ON  Set other      "[ERROR:2]\r\n"            + "\r\n"
//! RESET   Execute        "[OK]\r\n\r\n"  settle, restart
//! HELP    Execute        2 lines (settle after each), "[OK]\r\n" + "\r\n"
//! none                   "[ERROR:1]\r\n\r\n"  settle, reinit receiver
//! ```
//!
//! The trailing `"\r\n"` marks end of transmission. The unknown-command path
//! writes its own blank line and returns before the marker; the reset path
//! never gets there on hardware. Terminal scripts rely on this exact byte
//! sequence, so keep it.

use core::fmt::Write as _;

use embedded_hal::digital::{OutputPin, StatefulOutputPin};
use embedded_hal_async::delay::DelayNs;
use embedded_io_async::Write;
use heapless::String;

use crate::config::Timing;
use crate::error::{AtError, SessionError};
use crate::parser::{CommandKind, OperationType, ParsedCommand};
use crate::traits::Board;

/// Success token
pub const OK: &str = "[OK]\r\n";

/// Blank line closing a response
pub const END_OF_TRANSMISSION: &str = "\r\n";

/// Lines printed by `AT+HELP`
pub const HELP_LINES: [&str; 2] = [
    "'AT+LED_ON=<0, 1>' - Command to Disable (0) \\ Enable (1) LED on your NUCLEO.\r\n",
    "'AT+RESET' - Perform Reset of the device\r\n",
];

/// Why the receive path was reinitialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecoveryCause {
    /// Input held no known command signature
    UnknownCommand,
    /// Input did not fit the command buffer
    Overflow,
}

/// What a processed command led to
///
/// Restart is a deliberate control-flow outcome, not an error; callers are
/// expected to match all variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Command performed, `[OK]` sent
    Completed(CommandKind),
    /// Error code sent, session continues unchanged
    Reported(AtError),
    /// `[ERROR:1]` sent and the receiver reinitialized
    Resynchronized(RecoveryCause),
    /// `AT+RESET` accepted and the restart capability invoked
    Restarted,
}

/// Executes parsed commands against a [`Board`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandExecutor {
    timing: Timing,
}

impl CommandExecutor {
    /// Create an executor with the given settle delays
    pub const fn new(timing: Timing) -> Self {
        Self { timing }
    }

    /// Perform `cmd` and write its response
    pub async fn execute<B: Board>(
        &self,
        board: &mut B,
        cmd: ParsedCommand,
    ) -> Result<Outcome, SessionError> {
        let outcome = match (cmd.kind, cmd.operation) {
            (CommandKind::None, _) => {
                return self
                    .resynchronize(board, RecoveryCause::UnknownCommand)
                    .await;
            }
            (CommandKind::Reset, OperationType::Execute) => {
                return self.restart(board).await;
            }
            (CommandKind::LedOn, OperationType::Get) => self.led_get(board).await?,
            (CommandKind::LedOn, OperationType::Set) => self.led_set(board, cmd.parameter).await?,
            (CommandKind::Help, OperationType::Execute) => self.help(board).await?,
            (kind, operation) => {
                warn!("unsupported operation {:?} for {:?}", operation, kind);
                self.report(board, AtError::Unknown).await?
            }
        };

        send(board, END_OF_TRANSMISSION).await?;
        Ok(outcome)
    }

    /// Answer `[ERROR:1]`, wait, then reinitialize the receiver
    pub async fn resynchronize<B: Board>(
        &self,
        board: &mut B,
        cause: RecoveryCause,
    ) -> Result<Outcome, SessionError> {
        warn!("resynchronizing receiver: {:?}", cause);
        send(board, AtError::UnknownCommand.response()).await?;
        send(board, END_OF_TRANSMISSION).await?;
        board.delay().delay_ms(self.timing.reinit_settle_ms).await;
        board.reinit_receiver();
        Ok(Outcome::Resynchronized(cause))
    }

    async fn restart<B: Board>(&self, board: &mut B) -> Result<Outcome, SessionError> {
        send(board, OK).await?;
        send(board, END_OF_TRANSMISSION).await?;
        board.delay().delay_ms(self.timing.reset_settle_ms).await;
        info!("restarting device");
        board.restart_device();
        Ok(Outcome::Restarted)
    }

    async fn led_get<B: Board>(&self, board: &mut B) -> Result<Outcome, SessionError> {
        let high = match board.led().is_set_high() {
            Ok(high) => high,
            Err(_) => {
                error!("LED pin read failed");
                return self.report(board, AtError::Unknown).await;
            }
        };

        let mut line: String<16> = String::new();
        // Fits: one digit, CRLF and the OK token
        let _ = write!(line, "{}\r\n{}", u8::from(high), OK);
        send(board, &line).await?;
        debug!("LED state queried: {}", u8::from(high));
        Ok(Outcome::Completed(CommandKind::LedOn))
    }

    async fn led_set<B: Board>(
        &self,
        board: &mut B,
        parameter: Option<u8>,
    ) -> Result<Outcome, SessionError> {
        let result = match parameter {
            Some(0) => board.led().set_low(),
            Some(1) => board.led().set_high(),
            _ => return self.report(board, AtError::InvalidParameter).await,
        };

        if result.is_err() {
            error!("LED pin write failed");
            return self.report(board, AtError::Unknown).await;
        }

        send(board, OK).await?;
        debug!("LED set to {}", parameter.unwrap_or_default());
        Ok(Outcome::Completed(CommandKind::LedOn))
    }

    async fn help<B: Board>(&self, board: &mut B) -> Result<Outcome, SessionError> {
        for line in HELP_LINES {
            send(board, line).await?;
            board.delay().delay_ms(self.timing.help_line_settle_ms).await;
        }
        send(board, OK).await?;
        Ok(Outcome::Completed(CommandKind::Help))
    }

    async fn report<B: Board>(&self, board: &mut B, err: AtError) -> Result<Outcome, SessionError> {
        debug!("reporting error code {}", err.code());
        send(board, err.response()).await?;
        Ok(Outcome::Reported(err))
    }
}

async fn send<B: Board>(board: &mut B, text: &str) -> Result<(), SessionError> {
    let console = board.console();
    console
        .write_all(text.as_bytes())
        .await
        .map_err(SessionError::transport)?;
    console.flush().await.map_err(SessionError::transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBoard;
    use crate::parser::parse;

    async fn run(board: &mut MockBoard, input: &[u8]) -> Outcome {
        CommandExecutor::default()
            .execute(board, parse(input))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_led_set_on_and_off() {
        let mut board = MockBoard::new();

        assert_eq!(
            run(&mut board, b"AT+LED_ON=1\r\n").await,
            Outcome::Completed(CommandKind::LedOn)
        );
        assert!(board.led.high);
        assert_eq!(board.take_output(), "[OK]\r\n\r\n");

        assert_eq!(
            run(&mut board, b"AT+LED_ON=0\r\n").await,
            Outcome::Completed(CommandKind::LedOn)
        );
        assert!(!board.led.high);
        assert_eq!(board.take_output(), "[OK]\r\n\r\n");
        assert_eq!(board.led.writes, 2);
    }

    #[tokio::test]
    async fn test_led_set_invalid_parameter() {
        let inputs: [&[u8]; 3] = [b"AT+LED_ON=2\r\n", b"AT+LED_ON=abc\r\n", b"AT+LED_ON=256"];
        for input in inputs {
            let mut board = MockBoard::new();
            assert_eq!(
                run(&mut board, input).await,
                Outcome::Reported(AtError::InvalidParameter)
            );
            assert_eq!(board.take_output(), "[ERROR:2]\r\n\r\n");
            assert_eq!(board.led.writes, 0);
        }
    }

    #[tokio::test]
    async fn test_led_get_reflects_pin() {
        let mut board = MockBoard::new();
        run(&mut board, b"AT+LED_ON=?").await;
        assert_eq!(board.take_output(), "0\r\n[OK]\r\n\r\n");

        run(&mut board, b"AT+LED_ON=1").await;
        board.take_output();
        run(&mut board, b"AT+LED_ON=?").await;
        assert_eq!(board.take_output(), "1\r\n[OK]\r\n\r\n");
    }

    #[tokio::test]
    async fn test_led_pin_failure_reports_unknown() {
        let mut board = MockBoard::new();
        board.led.fail = true;

        assert_eq!(
            run(&mut board, b"AT+LED_ON=1").await,
            Outcome::Reported(AtError::Unknown)
        );
        assert_eq!(board.take_output(), "[ERROR:3]\r\n\r\n");

        assert_eq!(
            run(&mut board, b"AT+LED_ON=?").await,
            Outcome::Reported(AtError::Unknown)
        );
        assert_eq!(board.take_output(), "[ERROR:3]\r\n\r\n");
    }

    #[tokio::test]
    async fn test_reset_settles_then_restarts() {
        let mut board = MockBoard::new();

        assert_eq!(run(&mut board, b"AT+RESET\r\n").await, Outcome::Restarted);
        // No end-of-transmission marker after the restart
        assert_eq!(board.take_output(), "[OK]\r\n\r\n");
        assert_eq!(board.delay.calls, [25]);
        assert_eq!(board.restarts, 1);
        assert_eq!(board.reinits, 0);
    }

    #[tokio::test]
    async fn test_help_prints_lines_with_pacing() {
        let mut board = MockBoard::new();

        assert_eq!(
            run(&mut board, b"AT+HELP\r\n").await,
            Outcome::Completed(CommandKind::Help)
        );
        let expected = std::format!("{}{}[OK]\r\n\r\n", HELP_LINES[0], HELP_LINES[1]);
        assert_eq!(board.take_output(), expected);
        assert_eq!(board.delay.calls, [15, 15]);
    }

    #[tokio::test]
    async fn test_unknown_command_reinitializes_receiver() {
        let mut board = MockBoard::new();

        assert_eq!(
            run(&mut board, b"AT+FOO").await,
            Outcome::Resynchronized(RecoveryCause::UnknownCommand)
        );
        assert_eq!(board.take_output(), "[ERROR:1]\r\n\r\n");
        assert_eq!(board.reinits, 1);
        // The settle delay ran before the reinit
        assert_eq!(board.delay.calls, [15]);
        assert_eq!(board.delays_before_reinit, [1]);
        assert_eq!(board.restarts, 0);
        assert_eq!(board.led.writes, 0);
    }

    #[tokio::test]
    async fn test_inconsistent_operation_reports_unknown() {
        let mut board = MockBoard::new();
        let cmd = ParsedCommand::execute(CommandKind::LedOn);

        let outcome = CommandExecutor::default()
            .execute(&mut board, cmd)
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Reported(AtError::Unknown));
        assert_eq!(board.take_output(), "[ERROR:3]\r\n\r\n");
    }

    #[tokio::test]
    async fn test_custom_timing() {
        let mut board = MockBoard::new();
        let executor = CommandExecutor::new(Timing {
            reinit_settle_ms: 1,
            reset_settle_ms: 2,
            help_line_settle_ms: 3,
        });

        executor.execute(&mut board, parse(b"AT+HELP")).await.unwrap();
        executor.execute(&mut board, parse(b"AT+X")).await.unwrap();
        executor.execute(&mut board, parse(b"AT+RESET")).await.unwrap();
        assert_eq!(board.delay.calls, [3, 3, 1, 2]);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut board = MockBoard::new();
        board.console.fail = true;

        let result = CommandExecutor::default()
            .execute(&mut board, parse(b"AT+HELP"))
            .await;
        assert!(matches!(result, Err(SessionError::Transport(_))));
    }
}
