//! AT WiFi Modem Driver
//!
//! This crate drives an ESP8266-class WiFi modem over its textual AT command
//! protocol: a half-duplex, line-oriented serial stream on which command
//! replies and unsolicited notices arrive arbitrarily interleaved.
//!
//! The driver serializes command/reply exchanges behind a single exclusive
//! lock, intercepts unsolicited markers (`+IPD` inbound data, `+CWJAP:` join
//! failures) in the middle of any pending exchange, and buffers received
//! socket data per link id until the consumer drains it with
//! [`Modem::recv`].
//!
//! The raw byte transport is abstracted behind the [`SerialIo`] trait, so the
//! driver runs unchanged against a UART, a TCP-tunneled serial port, or a
//! scripted test double.
//!
//! # Example
//!
//! ```rust,ignore
//! use atwifi_driver::Modem;
//! use atwifi_protocol::{SocketProtocol, WifiMode};
//!
//! let modem = Modem::new(serial);
//! modem.reset()?;
//! modem.startup(WifiMode::Station)?;
//! modem.join("office", "hunter2")?;
//! modem.open(0, SocketProtocol::Tcp, "93.184.216.34", 80)?;
//! modem.send(0, b"GET / HTTP/1.0\r\n\r\n")?;
//! ```

mod error;
mod matcher;
mod modem;
mod oob;
mod packets;
mod transport;

pub use error::{ModemError, ModemResult};
pub use modem::{Modem, ModemConfig};
pub use transport::{SerialError, SerialIo};

pub use atwifi_protocol as protocol;
