//! Protocol error types.

use thiserror::Error;

use crate::constants::*;

/// Errors that can occur when parsing modem output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A scan record line did not have the expected shape.
    #[error("malformed access point record: {0:?}")]
    BadApRecord(String),

    /// An inbound data header did not have the expected `,<id>,<len>` shape.
    #[error("malformed inbound data header: {0:?}")]
    BadInboundHeader(String),

    /// A reply line did not have the expected shape.
    #[error("malformed reply line: {0:?}")]
    BadReply(String),
}

/// Result type alias for protocol parsing.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Semantic outcome of a failed join attempt.
///
/// The modem reports join failures asynchronously with a numeric code;
/// [`ConnectError::from_code`] maps the code into this taxonomy.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConnectError {
    /// The join attempt timed out.
    #[error("connection attempt timed out")]
    Timeout,

    /// The access point rejected the passphrase.
    #[error("authentication failed")]
    AuthFailure,

    /// No access point with the requested SSID was found.
    #[error("no such network")]
    NoSuchNetwork,

    /// The join failed for an unreported or unrecognized reason.
    #[error("no connection could be established")]
    NoConnection,
}

impl ConnectError {
    /// Map a numeric failure code from a `+CWJAP:<code>` notice.
    ///
    /// `None` covers notices that arrived without a parseable code, such as
    /// the bare `FAIL` form emitted by some firmware builds.
    pub fn from_code(code: Option<u8>) -> Self {
        match code {
            Some(JOIN_ERR_TIMEOUT) => ConnectError::Timeout,
            Some(JOIN_ERR_AUTH) => ConnectError::AuthFailure,
            Some(JOIN_ERR_NO_SSID) => ConnectError::NoSuchNetwork,
            _ => ConnectError::NoConnection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_error_mapping() {
        assert_eq!(ConnectError::from_code(Some(1)), ConnectError::Timeout);
        assert_eq!(ConnectError::from_code(Some(2)), ConnectError::AuthFailure);
        assert_eq!(ConnectError::from_code(Some(3)), ConnectError::NoSuchNetwork);
        assert_eq!(ConnectError::from_code(Some(4)), ConnectError::NoConnection);
        assert_eq!(ConnectError::from_code(Some(0)), ConnectError::NoConnection);
        assert_eq!(ConnectError::from_code(None), ConnectError::NoConnection);
    }
}
