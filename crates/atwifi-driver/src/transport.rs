//! Serial transport interface.
//!
//! The driver does not own a UART. It talks to whatever byte transport the
//! host provides through [`SerialIo`], one byte at a time on the read side so
//! the token matcher can interleave unsolicited-marker recognition with reply
//! matching.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by a serial transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// No byte arrived within the allowed time.
    #[error("read timed out")]
    TimedOut,

    /// The transport itself failed.
    #[error("serial transport failed: {0}")]
    Io(String),
}

impl From<std::io::Error> for SerialError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => SerialError::TimedOut,
            _ => SerialError::Io(err.to_string()),
        }
    }
}

/// A byte transport to the modem.
///
/// Implementations must deliver bytes in order and must not drop data on a
/// timed-out read: a [`SerialError::TimedOut`] read consumes nothing.
pub trait SerialIo {
    /// Read one byte.
    ///
    /// With `Some(timeout)`, waits at most that long (a zero timeout only
    /// takes a byte that is already available). With `None`, blocks until a
    /// byte arrives or the transport fails.
    fn read_byte(&mut self, timeout: Option<Duration>) -> Result<u8, SerialError>;

    /// Write the whole buffer to the modem.
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError>;
}
