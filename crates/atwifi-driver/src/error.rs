//! Driver error types.

use thiserror::Error;

use atwifi_protocol::{ConnectError, ProtocolError};

use crate::transport::SerialError;

/// Errors surfaced by modem operations.
///
/// All failures are local to the failing exchange: the transport's token
/// matcher resynchronizes on the next line delimiter, so a failed operation
/// does not corrupt subsequent ones.
#[derive(Debug, Error)]
pub enum ModemError {
    /// The modem did not produce the expected reply within the configured
    /// timeout.
    #[error("timed out waiting for a reply")]
    Timeout,

    /// An asynchronous failure notice arrived while a reply was being
    /// awaited and aborted the exchange.
    #[error("exchange aborted by an asynchronous failure notice")]
    Aborted,

    /// A join attempt failed, classified from the modem's failure notice.
    #[error("join failed: {0}")]
    Join(ConnectError),

    /// An argument was rejected before anything was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A reply line could not be parsed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The serial transport failed.
    #[error("serial transport error: {0}")]
    Serial(SerialError),
}

impl From<SerialError> for ModemError {
    fn from(err: SerialError) -> Self {
        match err {
            SerialError::TimedOut => ModemError::Timeout,
            other => ModemError::Serial(other),
        }
    }
}

/// Result type alias for modem operations.
pub type ModemResult<T> = Result<T, ModemError>;
