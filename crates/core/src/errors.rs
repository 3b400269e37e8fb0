use core::fmt::{self, Display};
use std::{io, path::Path};

use displaydoc::Display;

use crate::{channel::ChannelId, proto::FrameError};

/// A specialized result type for the LED bank operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Category of an operation outcome as seen by the caller.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("Info"),
            Severity::Warning => f.write_str("Warning"),
            Severity::Error => f.write_str("Error"),
        }
    }
}

/// A key used to look up a channel in the bank.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ChannelKey {
    /// Channel identifier, written as `l<id>` on the command line.
    Id(ChannelId),
    /// Peak wavelength, matched exactly.
    Peak(f32),
}

impl Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKey::Id(id) => write!(f, "l{id}"),
            ChannelKey::Peak(peak) => write!(f, "with peak {peak}"),
        }
    }
}

impl From<ChannelId> for ChannelKey {
    fn from(id: ChannelId) -> Self {
        Self::Id(id)
    }
}

/// Errors that can occur while driving the LED bank.
#[derive(Display, Debug)]
pub enum Error {
    /// Channel {0} not found.
    NotFound(ChannelKey),
    /// Channel l{0} is locked.
    Locked(ChannelId),
    /// Serial port is not open, use `setcom` to open it.
    TransportNotOpen,
    /// Unable to open serial port {port}: {reason}.
    PortOpen { port: String, reason: String },
    /// Failed to send data to serial port: {0}.
    SendFailed(String),
    /// I/O error on {path}: {source}.
    Io { path: String, source: io::Error },
    /// Invalid frame at line {line}: {reason}.
    InvalidFrame { line: usize, reason: FrameError },
    /// Replay is not active.
    ReplayInactive,
    /// No more data to replay.
    ReplayExhausted,
    /// Only advance and `replay stop` are accepted in replay mode.
    ModeRestricted,
    /// Invalid argument: {0}.
    InvalidArgument(String),
    /// Unknown command `{0}`, type `help` for usage.
    UnknownCommand(String),
}

impl Error {
    /// Returns the reporting category of this error.
    pub fn severity(&self) -> Severity {
        match self {
            Error::Locked(_) | Error::ReplayExhausted | Error::ModeRestricted => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Creates a mapper from an I/O error on the given file.
    pub fn io(path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().display().to_string();
        move |source| Self::Io { path, source }
    }

    /// Creates a new port open error.
    pub fn port_open<E>(port: &str, reason: E) -> Self
    where
        E: Display,
    {
        Self::PortOpen {
            port: port.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new send failure error.
    pub fn send_failed<E>(reason: E) -> Self
    where
        E: Display,
    {
        Self::SendFailed(reason.to_string())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument<E>(reason: E) -> Self
    where
        E: Display,
    {
        Self::InvalidArgument(reason.to_string())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::InvalidFrame { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::NotFound(ChannelKey::Id(ChannelId(42))).to_string(),
            "Channel l42 not found."
        );
        assert_eq!(
            Error::NotFound(ChannelKey::Peak(505.0)).to_string(),
            "Channel with peak 505 not found."
        );
        assert_eq!(
            Error::InvalidFrame {
                line: 3,
                reason: FrameError::WrongLength(31)
            }
            .to_string(),
            "Invalid frame at line 3: expected 32 bytes, got 31."
        );
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(Error::Locked(ChannelId(1)).severity(), Severity::Warning);
        assert_eq!(Error::ModeRestricted.severity(), Severity::Warning);
        assert_eq!(Error::ReplayExhausted.severity(), Severity::Warning);
        assert_eq!(Error::TransportNotOpen.severity(), Severity::Error);
        assert_eq!(
            Error::io("led_config.cfg")(io::ErrorKind::NotFound.into()).severity(),
            Severity::Error
        );
    }
}
