//! AT WiFi Modem Wire Vocabulary
//!
//! This crate provides the wire-level vocabulary for talking to ESP8266-class
//! WiFi modems over their textual AT command protocol. The protocol is
//! line-oriented (`\r\n` delimited) and carries two traffic classes on the
//! same serial stream:
//!
//! - **Command/reply exchanges** (host → modem, modem → host): the host sends
//!   a command line such as `AT+CIPSTART=0,"TCP","host",80` and reads one or
//!   more expected reply tokens (`OK`, `ready`, `>`, prefixed value lines).
//! - **Unsolicited notices** (modem → host): markers such as `+IPD` (inbound
//!   socket data) and `+CWJAP:` (asynchronous join failure) that the modem
//!   emits at any point, including in the middle of a pending exchange.
//!
//! This crate is purely about formatting and parsing: rendering commands,
//! parsing reply lines and records, and classifying numeric failure codes.
//! Driving the exchanges against a serial transport is the job of the
//! `atwifi-driver` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use atwifi_protocol::{Command, SocketProtocol};
//!
//! let cmd = Command::Open {
//!     link_id: 0,
//!     protocol: SocketProtocol::Tcp,
//!     address: "192.168.1.10".to_string(),
//!     port: 8080,
//! };
//! assert_eq!(cmd.render(), "AT+CIPSTART=0,\"TCP\",\"192.168.1.10\",8080");
//! ```

mod commands;
mod constants;
mod error;
mod responses;
mod types;

pub use commands::*;
pub use constants::*;
pub use error::*;
pub use responses::*;
pub use types::*;
