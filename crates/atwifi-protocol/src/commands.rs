//! Commands that can be sent to the modem.

use crate::types::*;

/// Commands that can be sent to the modem.
///
/// [`Command::render`] produces the command line without the trailing
/// delimiter; the transport layer appends it.
#[derive(Debug, Clone)]
pub enum Command {
    /// Set the current WiFi operating mode.
    SetMode {
        /// Mode to switch to.
        mode: WifiMode,
    },

    /// Enable connection multiplexing (link ids 0-4 on one transport).
    EnableMultiplex,

    /// Restart the modem.
    Reset,

    /// Configure DHCP for an interface.
    SetDhcp {
        /// Which interface the setting applies to.
        mode: DhcpMode,
        /// Whether DHCP is enabled.
        enabled: bool,
    },

    /// Join an access point.
    Join {
        /// Network name.
        ssid: String,
        /// Network passphrase.
        passphrase: String,
    },

    /// Leave the currently joined access point.
    Leave,

    /// Query the station IP and MAC addresses.
    QueryStationAddresses,

    /// Query the station IP configuration (gateway, netmask).
    QueryStationConfig,

    /// Query the currently joined access point.
    QueryJoinedAp,

    /// List all visible access points.
    Scan,

    /// List access points filtered by hardware address.
    ScanForBssid {
        /// Hardware address to filter on.
        bssid: MacAddress,
    },

    /// Open a multiplexed socket.
    Open {
        /// Link id (0-4).
        link_id: u8,
        /// Transport protocol.
        protocol: SocketProtocol,
        /// Remote address (IP or hostname).
        address: String,
        /// Remote port.
        port: u16,
    },

    /// Resolve a domain name.
    DnsLookup {
        /// Domain name to resolve.
        name: String,
    },

    /// Announce a raw payload write on a link. The modem answers with a
    /// `>` prompt when it is ready for the bytes.
    SendData {
        /// Link id (0-4).
        link_id: u8,
        /// Number of raw bytes that will follow.
        length: usize,
    },

    /// Close a multiplexed socket.
    Close {
        /// Link id (0-4).
        link_id: u8,
    },

    /// Query the mode the radio boots into.
    QueryDefaultMode,

    /// Set the mode the radio boots into.
    SetDefaultMode {
        /// Mode to persist.
        mode: WifiMode,
    },
}

impl Command {
    /// Render the command line, without the trailing delimiter.
    pub fn render(&self) -> String {
        match self {
            Command::SetMode { mode } => format!("AT+CWMODE_CUR={}", mode.code()),
            Command::EnableMultiplex => "AT+CIPMUX=1".to_string(),
            Command::Reset => "AT+RST".to_string(),
            Command::SetDhcp { mode, enabled } => {
                format!("AT+CWDHCP_CUR={},{}", mode.code(), u8::from(*enabled))
            }
            Command::Join { ssid, passphrase } => {
                format!("AT+CWJAP_CUR=\"{}\",\"{}\"", ssid, passphrase)
            }
            Command::Leave => "AT+CWQAP".to_string(),
            Command::QueryStationAddresses => "AT+CIFSR".to_string(),
            Command::QueryStationConfig => "AT+CIPSTA_CUR?".to_string(),
            Command::QueryJoinedAp => "AT+CWJAP_CUR?".to_string(),
            Command::Scan => "AT+CWLAP".to_string(),
            Command::ScanForBssid { bssid } => format!("AT+CWLAP=\"\",\"{}\",", bssid),
            Command::Open {
                link_id,
                protocol,
                address,
                port,
            } => format!(
                "AT+CIPSTART={},\"{}\",\"{}\",{}",
                link_id,
                protocol.as_str(),
                address,
                port
            ),
            Command::DnsLookup { name } => format!("AT+CIPDOMAIN=\"{}\"", name),
            Command::SendData { link_id, length } => {
                format!("AT+CIPSEND={},{}", link_id, length)
            }
            Command::Close { link_id } => format!("AT+CIPCLOSE={}", link_id),
            Command::QueryDefaultMode => "AT+CWMODE_DEF?".to_string(),
            Command::SetDefaultMode { mode } => format!("AT+CWMODE_DEF={}", mode.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode_and_multiplex() {
        let cmd = Command::SetMode {
            mode: WifiMode::Station,
        };
        assert_eq!(cmd.render(), "AT+CWMODE_CUR=1");
        assert_eq!(Command::EnableMultiplex.render(), "AT+CIPMUX=1");
    }

    #[test]
    fn test_render_join_quotes_arguments() {
        let cmd = Command::Join {
            ssid: "office".to_string(),
            passphrase: "hunter2".to_string(),
        };
        assert_eq!(cmd.render(), "AT+CWJAP_CUR=\"office\",\"hunter2\"");
    }

    #[test]
    fn test_render_open() {
        let cmd = Command::Open {
            link_id: 3,
            protocol: SocketProtocol::Udp,
            address: "10.0.0.2".to_string(),
            port: 5000,
        };
        assert_eq!(cmd.render(), "AT+CIPSTART=3,\"UDP\",\"10.0.0.2\",5000");
    }

    #[test]
    fn test_render_send_and_close() {
        let cmd = Command::SendData {
            link_id: 1,
            length: 42,
        };
        assert_eq!(cmd.render(), "AT+CIPSEND=1,42");
        assert_eq!(Command::Close { link_id: 1 }.render(), "AT+CIPCLOSE=1");
    }

    #[test]
    fn test_render_bssid_filter_keeps_trailing_comma() {
        let cmd = Command::ScanForBssid {
            bssid: MacAddress::new([0xdc, 0xd2, 0xfc, 0x9a, 0x79, 0x62]),
        };
        assert_eq!(cmd.render(), "AT+CWLAP=\"\",\"dc:d2:fc:9a:79:62\",");
    }

    #[test]
    fn test_render_dhcp() {
        let cmd = Command::SetDhcp {
            mode: DhcpMode::Station,
            enabled: true,
        };
        assert_eq!(cmd.render(), "AT+CWDHCP_CUR=1,1");
    }
}
