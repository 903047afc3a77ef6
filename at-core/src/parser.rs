//! # AT Command Parser
//!
//! Classifies the raw accumulated bytes into a [`ParsedCommand`].
//!
//! ## Matching rules
//!
//! Signatures are searched anywhere in the buffer (not anchored, no line
//! terminator needed) in a fixed priority order:
//!
//! ```text
//! 1. "AT+LED_ON="   '?' next  -> Get
//!                   otherwise -> Set, decimal parameter follows
//! 2. "AT+RESET"               -> Execute
//! 3. "AT+HELP"                -> Execute
//! ```
//!
//! The first signature in that order that occurs wins, even if a lower
//! priority signature appears earlier in the bytes. Matching is case
//! sensitive.

/// `AT+LED_ON=` signature
pub const SIG_LED_ON: &[u8] = b"AT+LED_ON=";
/// `AT+RESET` signature
pub const SIG_RESET: &[u8] = b"AT+RESET";
/// `AT+HELP` signature
pub const SIG_HELP: &[u8] = b"AT+HELP";

/// Recognized command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// Nothing recognized
    None,
    /// Drive or query the user LED
    LedOn,
    /// Restart the device
    Reset,
    /// Print the command summary
    Help,
}

/// How the command was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationType {
    /// No command, no operation
    Unset,
    /// `=?` query
    Get,
    /// `=<value>` assignment
    Set,
    /// Bare command
    Execute,
}

/// Result of scanning one command buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParsedCommand {
    /// Which command matched
    pub kind: CommandKind,
    /// Query / set / execute
    pub operation: OperationType,
    /// Set value; `None` for a non-numeric or out-of-range value.
    /// Ignored for every operation other than `Set`.
    pub parameter: Option<u8>,
}

impl ParsedCommand {
    /// Nothing recognized
    pub const fn none() -> Self {
        Self {
            kind: CommandKind::None,
            operation: OperationType::Unset,
            parameter: None,
        }
    }

    /// `AT+LED_ON=?`
    pub const fn led_get() -> Self {
        Self {
            kind: CommandKind::LedOn,
            operation: OperationType::Get,
            parameter: None,
        }
    }

    /// `AT+LED_ON=<value>`
    pub const fn led_set(parameter: Option<u8>) -> Self {
        Self {
            kind: CommandKind::LedOn,
            operation: OperationType::Set,
            parameter,
        }
    }

    /// Parameter-less command
    pub const fn execute(kind: CommandKind) -> Self {
        Self {
            kind,
            operation: OperationType::Execute,
            parameter: None,
        }
    }

    /// True when something was recognized
    pub fn is_recognized(&self) -> bool {
        self.kind != CommandKind::None
    }
}

impl Default for ParsedCommand {
    fn default() -> Self {
        Self::none()
    }
}

/// Scan `buf` for the highest priority command signature
pub fn parse(buf: &[u8]) -> ParsedCommand {
    if let Some(pos) = find(buf, SIG_LED_ON) {
        let rest = &buf[pos + SIG_LED_ON.len()..];
        return match rest.first() {
            Some(b'?') => ParsedCommand::led_get(),
            _ => ParsedCommand::led_set(parse_parameter(rest)),
        };
    }

    if find(buf, SIG_RESET).is_some() {
        return ParsedCommand::execute(CommandKind::Reset);
    }

    if find(buf, SIG_HELP).is_some() {
        return ParsedCommand::execute(CommandKind::Help);
    }

    ParsedCommand::none()
}

/// Position of the first occurrence of `needle` in `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Decimal value after `=`
///
/// Leading whitespace and one `+` are skipped. A value cut off before any
/// digit arrived (only whitespace left) reads as 0; any other non-numeric
/// text, or a value above 255, is `None`.
fn parse_parameter(rest: &[u8]) -> Option<u8> {
    let mut digits = rest.iter().skip_while(|b| b.is_ascii_whitespace()).peekable();
    if digits.peek() == Some(&&b'+') {
        digits.next();
    }

    let mut value: u32 = 0;
    let mut seen_digit = false;
    let mut trailing_text = false;
    for &b in digits {
        if b.is_ascii_digit() {
            seen_digit = true;
            value = value.saturating_mul(10).saturating_add(u32::from(b - b'0'));
        } else {
            trailing_text = !b.is_ascii_whitespace();
            break;
        }
    }

    if !seen_digit {
        return if trailing_text { None } else { Some(0) };
    }
    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_is_none() {
        assert_eq!(parse(b""), ParsedCommand::none());
    }

    #[test]
    fn test_led_get() {
        assert_eq!(parse(b"AT+LED_ON=?\r\n"), ParsedCommand::led_get());
    }

    #[test]
    fn test_led_set_values() {
        assert_eq!(parse(b"AT+LED_ON=0\r\n"), ParsedCommand::led_set(Some(0)));
        assert_eq!(parse(b"AT+LED_ON=1\r\n"), ParsedCommand::led_set(Some(1)));
        assert_eq!(parse(b"AT+LED_ON=2\r\n"), ParsedCommand::led_set(Some(2)));
        assert_eq!(parse(b"AT+LED_ON=255"), ParsedCommand::led_set(Some(255)));
    }

    #[test]
    fn test_led_set_strtoul_style_prefix() {
        assert_eq!(parse(b"AT+LED_ON= 1\r\n"), ParsedCommand::led_set(Some(1)));
        assert_eq!(parse(b"AT+LED_ON=+1"), ParsedCommand::led_set(Some(1)));
        // Digits stop at the first non-digit
        assert_eq!(parse(b"AT+LED_ON=1x"), ParsedCommand::led_set(Some(1)));
    }

    #[test]
    fn test_led_set_non_numeric_is_invalid() {
        assert_eq!(parse(b"AT+LED_ON=abc\r\n"), ParsedCommand::led_set(None));
        assert_eq!(parse(b"AT+LED_ON=-1"), ParsedCommand::led_set(None));
    }

    #[test]
    fn test_led_set_out_of_range_is_invalid() {
        assert_eq!(parse(b"AT+LED_ON=256"), ParsedCommand::led_set(None));
        assert_eq!(
            parse(b"AT+LED_ON=99999999999999999999"),
            ParsedCommand::led_set(None)
        );
    }

    #[test]
    fn test_truncated_set_reads_zero() {
        assert_eq!(parse(b"AT+LED_ON="), ParsedCommand::led_set(Some(0)));
        assert_eq!(parse(b"AT+LED_ON=\r\n"), ParsedCommand::led_set(Some(0)));
    }

    #[test]
    fn test_execute_commands() {
        assert_eq!(
            parse(b"AT+RESET\r\n"),
            ParsedCommand::execute(CommandKind::Reset)
        );
        assert_eq!(
            parse(b"AT+HELP\r\n"),
            ParsedCommand::execute(CommandKind::Help)
        );
    }

    #[test]
    fn test_priority_order_beats_position() {
        // HELP comes first in the bytes, RESET wins by priority
        assert_eq!(
            parse(b"AT+HELP\r\nAT+RESET\r\n").kind,
            CommandKind::Reset
        );
        // LED_ON outranks both
        assert_eq!(
            parse(b"AT+RESET AT+HELP AT+LED_ON=1").kind,
            CommandKind::LedOn
        );
    }

    #[test]
    fn test_not_anchored() {
        assert_eq!(parse(b"\x00garbageAT+HELP").kind, CommandKind::Help);
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(parse(b"at+help"), ParsedCommand::none());
        assert_eq!(parse(b"AT+Reset"), ParsedCommand::none());
    }

    #[test]
    fn test_unknown_command() {
        let cmd = parse(b"AT+FOO\r\n");
        assert!(!cmd.is_recognized());
        assert_eq!(cmd.operation, OperationType::Unset);
    }

    #[test]
    fn test_led_without_equals_is_unknown() {
        assert_eq!(parse(b"AT+LED_ON\r\n"), ParsedCommand::none());
    }
}
