//! Protocol and session error types

use embedded_io::ErrorKind;

/// Error codes reported to the terminal as `[ERROR:<code>]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AtError {
    /// No command signature found in the input
    UnknownCommand = 1,
    /// Recognized set command with a value outside its domain
    InvalidParameter = 2,
    /// Anything else (unsupported operation, output pin failure)
    Unknown = 3,
}

impl AtError {
    /// Numeric code sent on the wire
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Response line, without the end-of-transmission marker
    pub const fn response(self) -> &'static str {
        match self {
            Self::UnknownCommand => "[ERROR:1]\r\n",
            Self::InvalidParameter => "[ERROR:2]\r\n",
            Self::Unknown => "[ERROR:3]\r\n",
        }
    }
}

impl TryFrom<u8> for AtError {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::UnknownCommand),
            2 => Ok(Self::InvalidParameter),
            3 => Ok(Self::Unknown),
            _ => Err(()),
        }
    }
}

impl core::fmt::Display for AtError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[ERROR:{}]", self.code())
    }
}

/// Failures that stop a processing cycle early
///
/// Protocol-level errors are not here: they are reported to the terminal and
/// surface as [`crate::Outcome::Reported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// The console transport rejected a response write
    Transport(ErrorKind),
}

impl SessionError {
    pub(crate) fn transport<E: embedded_io::Error>(err: E) -> Self {
        Self::Transport(err.kind())
    }
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport(kind) => write!(f, "console write failed: {:?}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AtError::UnknownCommand.code(), 1);
        assert_eq!(AtError::InvalidParameter.code(), 2);
        assert_eq!(AtError::Unknown.code(), 3);
    }

    #[test]
    fn test_response_matches_display() {
        for code in 1..=3u8 {
            let err = AtError::try_from(code).unwrap();
            let shown = std::format!("{}\r\n", err);
            assert_eq!(shown, err.response());
        }
        assert!(AtError::try_from(0).is_err());
        assert!(AtError::try_from(4).is_err());
    }
}
