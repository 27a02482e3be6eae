//! Common types used in the protocol.

use std::fmt;

use crate::constants::*;

/// Operating mode of the WiFi radio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WifiMode {
    /// Station (client) mode.
    Station,
    /// Soft access point mode.
    SoftAp,
    /// Station and soft access point simultaneously.
    StationSoftAp,
}

impl WifiMode {
    /// Numeric mode value used on the wire.
    pub fn code(&self) -> u8 {
        match self {
            WifiMode::Station => 1,
            WifiMode::SoftAp => 2,
            WifiMode::StationSoftAp => 3,
        }
    }

    /// Map a numeric mode value. Returns `None` for values the firmware
    /// does not define.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(WifiMode::Station),
            2 => Some(WifiMode::SoftAp),
            3 => Some(WifiMode::StationSoftAp),
            _ => None,
        }
    }
}

/// Which interface a DHCP setting applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DhcpMode {
    /// Soft access point interface only.
    SoftAp,
    /// Station interface only.
    Station,
    /// Both interfaces.
    Both,
}

impl DhcpMode {
    /// Numeric mode value used on the wire.
    pub fn code(&self) -> u8 {
        match self {
            DhcpMode::SoftAp => 0,
            DhcpMode::Station => 1,
            DhcpMode::Both => 2,
        }
    }
}

/// Transport protocol of a multiplexed socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SocketProtocol {
    /// TCP socket.
    Tcp,
    /// UDP socket.
    Udp,
}

impl SocketProtocol {
    /// Protocol name as it appears in an open command.
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketProtocol::Tcp => "TCP",
            SocketProtocol::Udp => "UDP",
        }
    }
}

/// A 6-byte hardware (MAC) address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Create a new address from bytes.
    pub fn new(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }

    /// Parse the colon-separated form used on the wire, e.g.
    /// `"dc:d2:fc:9a:79:62"`. Returns `None` if the string does not have
    /// six hex octets.
    pub fn parse(text: &str) -> Option<Self> {
        let mut bytes = [0u8; 6];
        let mut parts = text.split(':');
        for byte in bytes.iter_mut() {
            *byte = u8::from_str_radix(parts.next()?, 16).ok()?;
        }
        if parts.next().is_some() {
            return None;
        }
        Some(MacAddress(bytes))
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Security scheme of a discovered access point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SecurityProtocol {
    /// Open network, no encryption.
    Open,
    /// WEP.
    Wep,
    /// WPA PSK.
    Wpa,
    /// WPA2 PSK.
    Wpa2,
    /// Mixed WPA/WPA2 PSK.
    WpaWpa2,
    /// Any code the firmware reports outside the known range.
    #[default]
    Unknown,
}

impl SecurityProtocol {
    /// Map the numeric security code from a scan record. Codes outside the
    /// known range map to [`SecurityProtocol::Unknown`].
    pub fn from_code(code: u8) -> Self {
        match code {
            SEC_CODE_OPEN => SecurityProtocol::Open,
            SEC_CODE_WEP => SecurityProtocol::Wep,
            SEC_CODE_WPA => SecurityProtocol::Wpa,
            SEC_CODE_WPA2 => SecurityProtocol::Wpa2,
            SEC_CODE_WPA_WPA2 => SecurityProtocol::WpaWpa2,
            _ => SecurityProtocol::Unknown,
        }
    }
}

/// A discovered access point, one per scan record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessPoint {
    /// Network name, at most [`MAX_SSID_LEN`] bytes.
    pub ssid: String,
    /// Hardware address of the access point.
    pub bssid: MacAddress,
    /// Signal strength in dBm.
    pub signal: i8,
    /// Radio channel.
    pub channel: u8,
    /// Security scheme.
    pub security: SecurityProtocol,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_parse_roundtrip() {
        let mac = MacAddress::parse("dc:d2:fc:9a:79:62").unwrap();
        assert_eq!(mac.as_bytes(), &[0xdc, 0xd2, 0xfc, 0x9a, 0x79, 0x62]);
        assert_eq!(mac.to_string(), "dc:d2:fc:9a:79:62");
    }

    #[test]
    fn test_mac_parse_rejects_bad_input() {
        assert!(MacAddress::parse("dc:d2:fc:9a:79").is_none());
        assert!(MacAddress::parse("dc:d2:fc:9a:79:62:00").is_none());
        assert!(MacAddress::parse("not:a:mac:at:all:xx").is_none());
        assert!(MacAddress::parse("").is_none());
    }

    #[test]
    fn test_security_code_mapping() {
        assert_eq!(SecurityProtocol::from_code(0), SecurityProtocol::Open);
        assert_eq!(SecurityProtocol::from_code(4), SecurityProtocol::WpaWpa2);
        assert_eq!(SecurityProtocol::from_code(9), SecurityProtocol::Unknown);
    }

    #[test]
    fn test_wifi_mode_codes() {
        assert_eq!(WifiMode::Station.code(), 1);
        assert_eq!(WifiMode::from_code(3), Some(WifiMode::StationSoftAp));
        assert_eq!(WifiMode::from_code(0), None);
    }
}
