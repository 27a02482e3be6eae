//! Token matcher over a serial byte stream.
//!
//! The modem's output is line-oriented (`\r\n` delimited) with two
//! exceptions: the `>` send prompt arrives bare, and an inbound data push
//! follows its `:` header with raw payload bytes. The matcher consumes the
//! stream one byte at a time, accumulating the current line, and on every
//! byte checks the accumulated prefix against the registered unsolicited
//! markers. A marker match is reported to the caller *before* reply matching
//! resumes, so unsolicited traffic is absorbed in wire order even while a
//! reply is being awaited.
//!
//! Lines that complete without matching the expectation are discarded. A
//! timed-out wait leaves any partial line buffered; matching resynchronizes
//! on the next delimiter.

use std::time::Duration;

use bytes::BytesMut;
use log::trace;

use crate::oob::{OobEvent, OobTable};
use crate::transport::{SerialError, SerialIo};

/// What a wait is looking for.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Expect<'a> {
    /// A line exactly equal to the token.
    Token(&'a str),
    /// A line starting with the prefix; the remainder is captured.
    Prefix(&'a str),
    /// The bare `>` send prompt.
    Prompt,
    /// Any complete non-empty line, captured whole.
    AnyLine,
    /// Nothing: only unsolicited markers terminate the wait. Used when
    /// polling for pending unsolicited traffic.
    Nothing,
}

/// Outcome of one wait step.
#[derive(Debug)]
pub(crate) enum Step {
    /// The expectation matched. Carries the captured text for
    /// [`Expect::Prefix`] and [`Expect::AnyLine`].
    Matched(Option<String>),
    /// A registered unsolicited marker was recognized; the handler must run
    /// before the wait is resumed.
    Oob(OobEvent),
}

pub(crate) struct TokenStream<S> {
    serial: S,
    /// Bytes of the line currently being accumulated.
    pending: BytesMut,
    timeout: Duration,
    oob: OobTable,
}

impl<S: SerialIo> TokenStream<S> {
    pub fn new(serial: S, timeout: Duration) -> Self {
        TokenStream {
            serial,
            pending: BytesMut::new(),
            timeout,
            oob: OobTable::standard(),
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.serial.write_all(data)
    }

    /// Block until the expectation matches or an unsolicited marker is
    /// recognized. Every byte read is bounded by the configured timeout.
    pub fn wait(&mut self, expect: &Expect<'_>) -> Result<Step, SerialError> {
        loop {
            let byte = self.serial.read_byte(Some(self.timeout))?;
            if let Some(step) = self.accept(byte, expect) {
                return Ok(step);
            }
        }
    }

    /// Consume any bytes already pending on the transport, reporting the
    /// first unsolicited marker found. Returns `None` once the transport has
    /// nothing more to offer right now.
    pub fn poll_oob(&mut self) -> Result<Option<OobEvent>, SerialError> {
        loop {
            let byte = match self.serial.read_byte(Some(Duration::ZERO)) {
                Ok(byte) => byte,
                Err(SerialError::TimedOut) => return Ok(None),
                Err(err) => return Err(err),
            };
            if let Some(Step::Oob(event)) = self.accept(byte, &Expect::Nothing) {
                return Ok(Some(event));
            }
        }
    }

    /// Feed one byte through line accumulation, marker recognition, and
    /// expectation matching, in that order.
    fn accept(&mut self, byte: u8, expect: &Expect<'_>) -> Option<Step> {
        if byte == b'\n' && self.pending.last() == Some(&b'\r') {
            self.pending.truncate(self.pending.len() - 1);
            let line = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            return self.match_line(line, expect);
        }

        self.pending.extend_from_slice(&[byte]);

        if let Some(event) = self.oob.match_line(&self.pending) {
            self.pending.clear();
            return Some(Step::Oob(event));
        }

        if matches!(expect, Expect::Prompt) && self.pending.as_ref() == b">" {
            self.pending.clear();
            return Some(Step::Matched(None));
        }

        None
    }

    fn match_line(&self, line: String, expect: &Expect<'_>) -> Option<Step> {
        match expect {
            Expect::Token(token) if line == *token => Some(Step::Matched(None)),
            Expect::Prefix(prefix) if line.starts_with(prefix) => {
                Some(Step::Matched(Some(line[prefix.len()..].to_string())))
            }
            Expect::AnyLine if !line.is_empty() => Some(Step::Matched(Some(line))),
            _ => {
                if !line.is_empty() {
                    trace!("discarding line {:?}", line);
                }
                None
            }
        }
    }

    /// Read raw bytes up to (and consuming) `stop`, returning the text
    /// before it. Gives up after `max` bytes without seeing the stop byte
    /// and returns what was collected; the caller's parse rejects it.
    pub fn read_until(&mut self, stop: u8, max: usize) -> Result<String, SerialError> {
        let mut collected = Vec::new();
        while collected.len() < max {
            let byte = self.serial.read_byte(Some(self.timeout))?;
            if byte == stop {
                break;
            }
            collected.push(byte);
        }
        Ok(String::from_utf8_lossy(&collected).into_owned())
    }

    /// Read exactly `buf.len()` raw payload bytes. No timeout applies: once
    /// an inbound payload length has been declared there is no way to
    /// resynchronize mid-packet, so the read completes or the transport
    /// errors.
    pub fn read_exact_blocking(&mut self, buf: &mut [u8]) -> Result<(), SerialError> {
        for slot in buf.iter_mut() {
            *slot = self.serial.read_byte(None)?;
        }
        Ok(())
    }

    /// Read the next non-empty line without consulting the marker table.
    /// Used by unsolicited-notice handlers for the lines that belong to
    /// their own notice.
    pub fn read_line_raw(&mut self) -> Result<String, SerialError> {
        loop {
            let byte = self.serial.read_byte(Some(self.timeout))?;
            if byte == b'\n' && self.pending.last() == Some(&b'\r') {
                self.pending.truncate(self.pending.len() - 1);
                let line = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                if !line.is_empty() {
                    return Ok(line);
                }
            } else {
                self.pending.extend_from_slice(&[byte]);
            }
        }
    }
}
