//! Test doubles for the serial transport.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use atwifi_driver::{SerialError, SerialIo};

enum RxStep {
    Byte(u8),
    Gap,
}

/// Scripted serial transport.
///
/// Reply bytes are played back in order; a gap simulates one timed-out
/// read. Reads past the end of the script time out. Everything written is
/// captured in a shared log that stays accessible after the transport moves
/// into a modem.
pub struct ScriptSerial {
    rx: VecDeque<RxStep>,
    tx: Arc<Mutex<Vec<u8>>>,
}

impl ScriptSerial {
    pub fn new() -> Self {
        ScriptSerial {
            rx: VecDeque::new(),
            tx: Arc::default(),
        }
    }

    /// Queue reply bytes.
    pub fn reply(mut self, bytes: &[u8]) -> Self {
        self.rx.extend(bytes.iter().map(|b| RxStep::Byte(*b)));
        self
    }

    /// Queue one timed-out read.
    pub fn gap(mut self) -> Self {
        self.rx.push_back(RxStep::Gap);
        self
    }

    /// Handle on the write log.
    pub fn tx_log(&self) -> Arc<Mutex<Vec<u8>>> {
        self.tx.clone()
    }
}

impl SerialIo for ScriptSerial {
    fn read_byte(&mut self, _timeout: Option<Duration>) -> Result<u8, SerialError> {
        match self.rx.pop_front() {
            Some(RxStep::Byte(byte)) => Ok(byte),
            _ => Err(SerialError::TimedOut),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.tx.lock().unwrap().extend_from_slice(data);
        Ok(())
    }
}

#[derive(Default)]
struct ResponderState {
    rx: VecDeque<u8>,
    writes: Vec<Vec<u8>>,
}

/// Serial transport that acts like a cooperative modem: every command write
/// immediately queues its happy-path reply. Each `write_all` call is logged
/// as one entry, so tests can assert on write ordering across threads.
#[derive(Clone)]
pub struct ResponderSerial {
    state: Arc<Mutex<ResponderState>>,
}

impl ResponderSerial {
    pub fn new() -> Self {
        ResponderSerial {
            state: Arc::default(),
        }
    }

    /// Snapshot of all writes, one entry per `write_all` call.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().writes.clone()
    }
}

impl SerialIo for ResponderSerial {
    fn read_byte(&mut self, _timeout: Option<Duration>) -> Result<u8, SerialError> {
        self.state
            .lock()
            .unwrap()
            .rx
            .pop_front()
            .ok_or(SerialError::TimedOut)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        let mut state = self.state.lock().unwrap();
        state.writes.push(data.to_vec());
        if data.starts_with(b"AT+CIPSEND=") {
            state.rx.extend(b"\r\nOK\r\n> ");
        } else if data.starts_with(b"AT+") {
            state.rx.extend(b"\r\nOK\r\n");
        }
        Ok(())
    }
}

/// Count non-overlapping occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut rest = haystack;
    while let Some(pos) = rest.windows(needle.len()).position(|w| w == needle) {
        count += 1;
        rest = &rest[pos + needle.len()..];
    }
    count
}
