//! The modem driver: serialized command/reply exchanges with inline
//! handling of unsolicited traffic.
//!
//! All public operations run as one or more *exchanges*: a command written
//! to the transport followed by the bounded sequence of reply tokens it is
//! expected to produce. A single exclusive lock serializes exchanges, so two
//! callers can never interleave their bytes on the wire. Unsolicited
//! markers recognized while a reply is awaited are handled inline, under
//! that same lock, before reply matching resumes; the handlers never issue
//! commands of their own.

use std::time::Duration;

use log::{debug, trace, warn};
use parking_lot::Mutex;

use atwifi_protocol::{
    parse_ap_record, parse_inbound_header, parse_joined_ap, unquote, AccessPoint, Command,
    ConnectError, DhcpMode, ProtocolError, SocketProtocol, WifiMode, AP_RECORD_PREFIX,
    DEFAULT_MODE_PREFIX, DELIMITER, DNS_REPLY_PREFIX, FAIL_TOKEN, GATEWAY_PREFIX,
    JOINED_AP_PREFIX, MAX_LINK_ID, NETMASK_PREFIX, OK_TOKEN, READY_TOKEN, STATION_IP_PREFIX,
    STATION_MAC_PREFIX,
};

use crate::error::{ModemError, ModemResult};
use crate::matcher::{Expect, Step, TokenStream};
use crate::oob::OobEvent;
use crate::packets::PacketQueue;
use crate::transport::{SerialError, SerialIo};

/// How many times an exchange is attempted when the modem reports itself
/// transiently busy by not producing the expected reply.
const EXCHANGE_ATTEMPTS: usize = 2;

/// Longest `,<link_id>,<len>` header accepted on an inbound data push.
const INBOUND_HEADER_MAX: usize = 24;

const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(8);

/// Driver configuration. Applies process-wide to every exchange; there are
/// no per-exchange overrides.
#[derive(Debug, Clone)]
pub struct ModemConfig {
    /// Bound on every blocking reply read. Adjustable later with
    /// [`Modem::set_timeout`].
    pub reply_timeout: Duration,
}

impl Default for ModemConfig {
    fn default() -> Self {
        ModemConfig {
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }
}

/// Pending asynchronous join-failure notice.
///
/// Written by the unsolicited-notice handlers, consumed and cleared exactly
/// once by [`Modem::join`]. A new notice overwrites a stale unconsumed one.
#[derive(Debug, Default)]
struct JoinFailureState {
    code: Option<u8>,
    failed: bool,
}

impl JoinFailureState {
    fn record(&mut self, code: Option<u8>) {
        self.code = code;
        self.failed = true;
    }

    fn clear(&mut self) {
        self.code = None;
        self.failed = false;
    }

    /// Consume the pending notice, if any, clearing it.
    fn take(&mut self) -> Option<Option<u8>> {
        if self.failed {
            self.failed = false;
            Some(self.code.take())
        } else {
            None
        }
    }
}

struct Inner<S> {
    stream: TokenStream<S>,
    packets: PacketQueue,
    join_failure: JoinFailureState,
}

/// Driver for an ESP8266-class AT WiFi modem.
///
/// Cheap to share by reference across threads; every operation acquires the
/// exchange lock for its duration, so concurrent callers are serialized at
/// exchange granularity.
pub struct Modem<S: SerialIo> {
    inner: Mutex<Inner<S>>,
}

impl<S: SerialIo> Modem<S> {
    /// Create a driver over the given transport with default configuration.
    pub fn new(serial: S) -> Self {
        Self::with_config(serial, ModemConfig::default())
    }

    /// Create a driver with explicit configuration.
    pub fn with_config(serial: S, config: ModemConfig) -> Self {
        Modem {
            inner: Mutex::new(Inner {
                stream: TokenStream::new(serial, config.reply_timeout),
                packets: PacketQueue::new(),
                join_failure: JoinFailureState::default(),
            }),
        }
    }

    /// Change the reply timeout for all subsequent exchanges.
    pub fn set_timeout(&self, timeout: Duration) {
        self.inner.lock().stream.set_timeout(timeout);
    }

    /// Set the operating mode and enable connection multiplexing.
    pub fn startup(&self, mode: WifiMode) -> ModemResult<()> {
        let mut inner = self.inner.lock();
        inner.exchange(&Command::SetMode { mode }, &[OK_TOKEN])?;
        inner.exchange(&Command::EnableMultiplex, &[OK_TOKEN])
    }

    /// Restart the modem, waiting for the two-line `OK` + `ready`
    /// handshake. Retried because boot banner timing is unreliable.
    pub fn reset(&self) -> ModemResult<()> {
        let mut inner = self.inner.lock();
        let mut last = ModemError::Timeout;
        for _ in 0..EXCHANGE_ATTEMPTS {
            match inner.exchange(&Command::Reset, &[OK_TOKEN, READY_TOKEN]) {
                Ok(()) => return Ok(()),
                Err(err @ (ModemError::Timeout | ModemError::Aborted)) => last = err,
                Err(err) => return Err(err),
            }
        }
        Err(last)
    }

    /// Configure DHCP for an interface.
    pub fn dhcp(&self, mode: DhcpMode, enabled: bool) -> ModemResult<()> {
        let mut inner = self.inner.lock();
        inner.exchange(&Command::SetDhcp { mode, enabled }, &[OK_TOKEN])
    }

    /// Join an access point.
    ///
    /// Success is an ordinary `OK` reply. Failure is signaled
    /// asynchronously: the firmware emits a `+CWJAP:<code>` notice (or a
    /// bare `FAIL`) instead of an error reply, which the unsolicited-notice
    /// handler records while `OK` is being awaited. If the wait fails and no
    /// notice was recorded, the exchange desynced and a generic
    /// [`ConnectError::NoConnection`] is reported.
    pub fn join(&self, ssid: &str, passphrase: &str) -> ModemResult<()> {
        let mut inner = self.inner.lock();
        inner.send_command(&Command::Join {
            ssid: ssid.to_string(),
            passphrase: passphrase.to_string(),
        })?;
        match inner.expect_token(OK_TOKEN) {
            Ok(()) => Ok(()),
            Err(err @ ModemError::Serial(_)) => Err(err),
            Err(_) => match inner.join_failure.take() {
                Some(code) => Err(ModemError::Join(ConnectError::from_code(code))),
                None => Err(ModemError::Join(ConnectError::NoConnection)),
            },
        }
    }

    /// Leave the currently joined access point.
    pub fn leave(&self) -> ModemResult<()> {
        let mut inner = self.inner.lock();
        inner.exchange(&Command::Leave, &[OK_TOKEN])
    }

    /// Get the station IP address.
    pub fn ip_address(&self) -> ModemResult<String> {
        let mut inner = self.inner.lock();
        inner.send_command(&Command::QueryStationAddresses)?;
        let captured = inner.expect_prefix(STATION_IP_PREFIX)?;
        inner.expect_token(OK_TOKEN)?;
        unquoted(&captured)
    }

    /// Get the station MAC address.
    pub fn mac_address(&self) -> ModemResult<String> {
        let mut inner = self.inner.lock();
        inner.send_command(&Command::QueryStationAddresses)?;
        let captured = inner.expect_prefix(STATION_MAC_PREFIX)?;
        inner.expect_token(OK_TOKEN)?;
        unquoted(&captured)
    }

    /// Get the gateway address of the station interface.
    pub fn gateway(&self) -> ModemResult<String> {
        let mut inner = self.inner.lock();
        inner.send_command(&Command::QueryStationConfig)?;
        let captured = inner.expect_prefix(GATEWAY_PREFIX)?;
        inner.expect_token(OK_TOKEN)?;
        unquoted(&captured)
    }

    /// Get the netmask of the station interface.
    pub fn netmask(&self) -> ModemResult<String> {
        let mut inner = self.inner.lock();
        inner.send_command(&Command::QueryStationConfig)?;
        let captured = inner.expect_prefix(NETMASK_PREFIX)?;
        inner.expect_token(OK_TOKEN)?;
        unquoted(&captured)
    }

    /// Get the signal strength of the joined access point, in dBm.
    ///
    /// Two exchanges: query the joined AP for its hardware address, then
    /// scan filtered on that address to read the signal figure. The lock is
    /// released between the two.
    pub fn rssi(&self) -> ModemResult<i8> {
        let bssid = {
            let mut inner = self.inner.lock();
            inner.send_command(&Command::QueryJoinedAp)?;
            let captured = inner.expect_prefix(JOINED_AP_PREFIX)?;
            inner.expect_token(OK_TOKEN)?;
            parse_joined_ap(&captured)?
        };

        let mut inner = self.inner.lock();
        inner.send_command(&Command::ScanForBssid { bssid })?;
        let captured = inner.expect_prefix(AP_RECORD_PREFIX)?;
        inner.expect_token(OK_TOKEN)?;
        let record = parse_ap_record(&captured)?;
        Ok(record.signal)
    }

    /// Scan for visible access points.
    ///
    /// Writes up to `out.len()` records into `out` and returns the total
    /// number of access points seen, which may exceed the storage; callers
    /// can re-issue the scan with a larger buffer. An empty `out` counts
    /// without storing. The record stream has no explicit terminator; the
    /// first reply line that is not an access point record ends the scan.
    pub fn scan(&self, out: &mut [AccessPoint]) -> ModemResult<usize> {
        let mut inner = self.inner.lock();
        inner.send_command(&Command::Scan)?;

        let mut seen = 0;
        loop {
            let line = match inner.expect_any_line() {
                Ok(line) => line,
                Err(ModemError::Timeout) => break,
                Err(err) => return Err(err),
            };
            let Some(rest) = line.strip_prefix(AP_RECORD_PREFIX) else {
                break;
            };
            let Ok(record) = parse_ap_record(rest) else {
                break;
            };
            if seen < out.len() {
                out[seen] = record;
            }
            seen += 1;
        }
        Ok(seen)
    }

    /// Open a multiplexed socket.
    pub fn open(
        &self,
        link_id: u8,
        protocol: SocketProtocol,
        address: &str,
        port: u16,
    ) -> ModemResult<()> {
        check_link_id(link_id)?;
        self.retry(|inner| {
            inner.exchange(
                &Command::Open {
                    link_id,
                    protocol,
                    address: address.to_string(),
                    port,
                },
                &[OK_TOKEN],
            )
        })
    }

    /// Resolve a domain name through the modem.
    pub fn dns_lookup(&self, name: &str) -> ModemResult<String> {
        let mut inner = self.inner.lock();
        inner.send_command(&Command::DnsLookup {
            name: name.to_string(),
        })?;
        let captured = inner.expect_prefix(DNS_REPLY_PREFIX)?;
        Ok(captured.trim().to_string())
    }

    /// Send a payload on an open link.
    ///
    /// Announces the length, waits for the `>` prompt, then writes the raw
    /// bytes. A modem that is transiently busy fails to produce the prompt;
    /// the whole exchange is retried once, and the payload is written only
    /// after a prompt, so a retry never duplicates bytes on the wire.
    pub fn send(&self, link_id: u8, data: &[u8]) -> ModemResult<()> {
        self.retry(|inner| {
            inner.send_command(&Command::SendData {
                link_id,
                length: data.len(),
            })?;
            inner.expect_prompt()?;
            inner.stream.write_all(data)?;
            Ok(())
        })
    }

    /// Receive buffered bytes for a link.
    ///
    /// First drains any unsolicited traffic already pending on the wire into
    /// the packet queue, then copies out buffered bytes for the link.
    /// Returns `Ok(None)` when nothing has arrived for the link, which is
    /// distinct from `Ok(Some(0))`, a zero-length inbound push.
    pub fn recv(&self, link_id: u8, out: &mut [u8]) -> ModemResult<Option<usize>> {
        let mut inner = self.inner.lock();
        inner.drain_oob()?;
        trace!(
            "link {}: {} bytes buffered",
            link_id,
            inner.packets.buffered(link_id)
        );
        Ok(inner.packets.dequeue(link_id, out))
    }

    /// Close a multiplexed socket.
    pub fn close(&self, link_id: u8) -> ModemResult<()> {
        self.retry(|inner| inner.exchange(&Command::Close { link_id }, &[OK_TOKEN]))
    }

    /// Query the mode the radio boots into.
    pub fn default_mode(&self) -> ModemResult<WifiMode> {
        let mut inner = self.inner.lock();
        inner.send_command(&Command::QueryDefaultMode)?;
        let captured = inner.expect_prefix(DEFAULT_MODE_PREFIX)?;
        inner.expect_token(OK_TOKEN)?;
        let code: u8 = captured
            .trim()
            .parse()
            .map_err(|_| ProtocolError::BadReply(captured.clone()))?;
        WifiMode::from_code(code).ok_or_else(|| ProtocolError::BadReply(captured).into())
    }

    /// Set the mode the radio boots into.
    pub fn set_default_mode(&self, mode: WifiMode) -> ModemResult<()> {
        let mut inner = self.inner.lock();
        inner.exchange(&Command::SetDefaultMode { mode }, &[OK_TOKEN])
    }

    /// Run one exchange attempt up to [`EXCHANGE_ATTEMPTS`] times. The lock
    /// is acquired per attempt and released in between, so unsolicited
    /// traffic recognized on another caller's exchange can interleave
    /// between attempts.
    fn retry<T>(&self, mut attempt: impl FnMut(&mut Inner<S>) -> ModemResult<T>) -> ModemResult<T> {
        let mut last = ModemError::Timeout;
        for _ in 0..EXCHANGE_ATTEMPTS {
            let mut inner = self.inner.lock();
            match attempt(&mut inner) {
                Ok(value) => return Ok(value),
                Err(err @ (ModemError::Timeout | ModemError::Aborted)) => last = err,
                Err(err) => return Err(err),
            }
        }
        Err(last)
    }
}

impl<S: SerialIo> Inner<S> {
    fn send_command(&mut self, command: &Command) -> ModemResult<()> {
        let line = command.render();
        debug!("sending {}", line);
        let mut frame = line.into_bytes();
        frame.extend_from_slice(DELIMITER);
        self.stream.write_all(&frame)?;
        Ok(())
    }

    /// One full exchange: write the command, await each expected token.
    fn exchange(&mut self, command: &Command, tokens: &[&str]) -> ModemResult<()> {
        self.send_command(command)?;
        for token in tokens {
            self.expect_token(token)?;
        }
        Ok(())
    }

    /// Await an expectation, running unsolicited-marker handlers inline in
    /// wire order until it matches.
    fn expect(&mut self, expect: Expect<'_>) -> ModemResult<Option<String>> {
        loop {
            match self.stream.wait(&expect)? {
                Step::Matched(captured) => return Ok(captured),
                Step::Oob(event) => self.handle_oob(event)?,
            }
        }
    }

    fn expect_token(&mut self, token: &str) -> ModemResult<()> {
        self.expect(Expect::Token(token)).map(|_| ())
    }

    fn expect_prefix(&mut self, prefix: &str) -> ModemResult<String> {
        Ok(self.expect(Expect::Prefix(prefix))?.unwrap_or_default())
    }

    fn expect_prompt(&mut self) -> ModemResult<()> {
        self.expect(Expect::Prompt).map(|_| ())
    }

    fn expect_any_line(&mut self) -> ModemResult<String> {
        Ok(self.expect(Expect::AnyLine)?.unwrap_or_default())
    }

    /// Absorb unsolicited traffic already pending on the wire. An aborting
    /// notice only records failure state here; there is no exchange in
    /// flight to abort.
    fn drain_oob(&mut self) -> ModemResult<()> {
        loop {
            match self.stream.poll_oob() {
                Ok(Some(event)) => match self.handle_oob(event) {
                    Ok(()) | Err(ModemError::Aborted) => {}
                    Err(err) => return Err(err),
                },
                Ok(None) => return Ok(()),
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn handle_oob(&mut self, event: OobEvent) -> ModemResult<()> {
        match event {
            OobEvent::InboundData => self.take_inbound_packet(),
            OobEvent::JoinFailure => self.take_join_failure(),
            OobEvent::BareFail => {
                self.join_failure.record(None);
                Err(ModemError::Aborted)
            }
        }
    }

    /// Consume a `,<link_id>,<len>:<bytes>` push following an inbound-data
    /// marker and park the payload in the packet queue.
    ///
    /// A malformed header, failed allocation, or short payload read drops
    /// the packet. The bytes already consumed stay consumed and any
    /// unconsumed payload is left on the wire, so the stream may be
    /// desynchronized until the next delimiter.
    fn take_inbound_packet(&mut self) -> ModemResult<()> {
        let header = match self.stream.read_until(b':', INBOUND_HEADER_MAX) {
            Ok(header) => header,
            Err(SerialError::TimedOut) => {
                warn!("dropping inbound push: header read timed out");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let (link_id, length) = match parse_inbound_header(&header) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("dropping inbound push: {}", err);
                return Ok(());
            }
        };

        let mut payload = Vec::new();
        if payload.try_reserve_exact(length).is_err() {
            warn!(
                "dropping {} byte push for link {}: buffer allocation failed",
                length, link_id
            );
            return Ok(());
        }
        payload.resize(length, 0);

        if let Err(err) = self.stream.read_exact_blocking(&mut payload) {
            warn!("dropping partial push for link {}: {}", link_id, err);
            return Ok(());
        }

        debug!("buffered {} bytes for link {}", length, link_id);
        self.packets.enqueue(link_id, payload);
        Ok(())
    }

    /// Consume a join-failure notice following its marker: a numeric code
    /// line and a `FAIL` line. Firmware deviates from the documented format
    /// often enough that an unparseable notice is recorded as a failure
    /// without a code rather than dropped. Always aborts the exchange whose
    /// wait the marker interrupted.
    fn take_join_failure(&mut self) -> ModemResult<()> {
        self.join_failure.clear();

        let first = match self.stream.read_line_raw() {
            Ok(line) => line,
            Err(SerialError::TimedOut) => {
                self.join_failure.record(None);
                return Err(ModemError::Aborted);
            }
            Err(err) => return Err(err.into()),
        };
        if first == FAIL_TOKEN {
            self.join_failure.record(None);
            return Err(ModemError::Aborted);
        }

        let code = first.trim().parse::<u8>().ok();
        match self.stream.read_line_raw() {
            Ok(line) if line == FAIL_TOKEN => self.join_failure.record(code),
            Ok(_) | Err(SerialError::TimedOut) => {
                warn!("unparseable join-failure notice, recording generic failure");
                self.join_failure.record(None);
            }
            Err(err) => return Err(err.into()),
        }
        Err(ModemError::Aborted)
    }
}

fn check_link_id(link_id: u8) -> ModemResult<()> {
    if link_id > MAX_LINK_ID {
        return Err(ModemError::InvalidArgument("link id out of range"));
    }
    Ok(())
}

fn unquoted(captured: &str) -> ModemResult<String> {
    unquote(captured)
        .map(str::to_string)
        .ok_or_else(|| ProtocolError::BadReply(captured.to_string()).into())
}
