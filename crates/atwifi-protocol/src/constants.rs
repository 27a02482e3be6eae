//! Protocol constants
//!
//! These constants define the unsolicited markers, numeric code values, and
//! protocol limits used by ESP8266-class AT firmware.

// ============================================================================
// Framing
// ============================================================================

/// Line delimiter used in both directions.
pub const DELIMITER: &[u8] = b"\r\n";

/// Prompt character emitted by the modem when it is ready to accept the raw
/// payload of a send operation.
pub const SEND_PROMPT: u8 = b'>';

// ============================================================================
// Unsolicited markers (modem → host)
// ============================================================================

/// Marker announcing inbound socket data: `+IPD,<link_id>,<len>:<bytes>`.
pub const INBOUND_DATA_MARKER: &str = "+IPD";

/// Documented marker for an asynchronous join-failure notice:
/// `+CWJAP:<code>` followed by a `FAIL` line.
pub const JOIN_FAILURE_MARKER: &str = "+CWJAP:";

/// Failure token. Observed firmware sometimes emits this bare, without the
/// documented `+CWJAP:<code>` notice preceding it.
pub const FAIL_TOKEN: &str = "FAIL";

// ============================================================================
// Reply tokens and prefixes (modem → host)
// ============================================================================

/// Generic acknowledgement line.
pub const OK_TOKEN: &str = "OK";

/// Second line of the reset handshake, emitted after the boot banner.
pub const READY_TOKEN: &str = "ready";

/// Prefix of the station IP line in an address query reply.
pub const STATION_IP_PREFIX: &str = "+CIFSR:STAIP,";

/// Prefix of the station MAC line in an address query reply.
pub const STATION_MAC_PREFIX: &str = "+CIFSR:STAMAC,";

/// Prefix of the gateway line in a station config query reply.
pub const GATEWAY_PREFIX: &str = "+CIPSTA_CUR:gateway:";

/// Prefix of the netmask line in a station config query reply.
pub const NETMASK_PREFIX: &str = "+CIPSTA_CUR:netmask:";

/// Prefix of the joined-AP line in a `AT+CWJAP_CUR?` query reply.
pub const JOINED_AP_PREFIX: &str = "+CWJAP_CUR:";

/// Prefix of an access point record in a scan reply.
pub const AP_RECORD_PREFIX: &str = "+CWLAP:";

/// Prefix of a DNS lookup reply.
pub const DNS_REPLY_PREFIX: &str = "+CIPDOMAIN:";

/// Prefix of the reply to a default-mode query.
pub const DEFAULT_MODE_PREFIX: &str = "+CWMODE_DEF:";

// ============================================================================
// Limits
// ============================================================================

/// Highest multiplexed link id supported by the firmware (ids are 0-4).
pub const MAX_LINK_ID: u8 = 4;

/// Maximum SSID length in bytes.
pub const MAX_SSID_LEN: usize = 32;

// ============================================================================
// Join-failure codes (payload of the `+CWJAP:<code>` notice)
// ============================================================================

/// The join attempt timed out.
pub const JOIN_ERR_TIMEOUT: u8 = 1;
/// The passphrase was rejected.
pub const JOIN_ERR_AUTH: u8 = 2;
/// No access point with the requested SSID was found.
pub const JOIN_ERR_NO_SSID: u8 = 3;

// ============================================================================
// Security codes (first field of a scan record)
// ============================================================================

/// Open network, no encryption.
pub const SEC_CODE_OPEN: u8 = 0;
/// WEP.
pub const SEC_CODE_WEP: u8 = 1;
/// WPA PSK.
pub const SEC_CODE_WPA: u8 = 2;
/// WPA2 PSK.
pub const SEC_CODE_WPA2: u8 = 3;
/// Mixed WPA/WPA2 PSK.
pub const SEC_CODE_WPA_WPA2: u8 = 4;
