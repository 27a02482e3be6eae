//! Parsing of reply lines from the modem.
//!
//! Reply lines arrive as text after a known prefix has been stripped by the
//! token matcher, e.g. the `(3,"office",-71,"dc:d2:fc:9a:79:62",6)` part of a
//! `+CWLAP:` scan record. The firmware does not escape quotes inside quoted
//! fields, so parsing here is best-effort to the same degree the device is.

use crate::error::{ProtocolError, ProtocolResult};
use crate::types::*;

/// Strip one pair of surrounding double quotes.
pub fn unquote(text: &str) -> Option<&str> {
    let text = text.trim();
    text.strip_prefix('"')?.strip_suffix('"')
}

/// Split a comma-separated record into fields, treating quoted spans as
/// opaque (commas inside quotes do not split).
fn split_fields(record: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, c) in record.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(&record[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    fields.push(&record[start..]);
    fields
}

/// Parse an access point record.
///
/// `record` is the text after the `+CWLAP:` prefix, e.g.
/// `(3,"office",-71,"dc:d2:fc:9a:79:62",6,-7,31)`. Trailing fields beyond
/// the channel (frequency offset and calibration on newer firmware) are
/// ignored. A security code outside the known range yields
/// [`SecurityProtocol::Unknown`] rather than a parse failure.
pub fn parse_ap_record(record: &str) -> ProtocolResult<AccessPoint> {
    let bad = || ProtocolError::BadApRecord(record.to_string());

    let inner = record
        .trim()
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .unwrap_or_else(|| record.trim());

    let fields = split_fields(inner);
    if fields.len() < 5 {
        return Err(bad());
    }

    let security_code: u8 = fields[0].trim().parse().map_err(|_| bad())?;
    let ssid = unquote(fields[1]).ok_or_else(bad)?;
    let signal: i8 = fields[2].trim().parse().map_err(|_| bad())?;
    let bssid = unquote(fields[3])
        .and_then(MacAddress::parse)
        .ok_or_else(bad)?;
    let channel: u8 = fields[4].trim().parse().map_err(|_| bad())?;

    Ok(AccessPoint {
        ssid: ssid.to_string(),
        bssid,
        signal,
        channel,
        security: SecurityProtocol::from_code(security_code),
    })
}

/// Parse the joined-AP line of a `AT+CWJAP_CUR?` reply and extract the
/// access point's hardware address.
///
/// `line` is the text after the `+CWJAP_CUR:` prefix, e.g.
/// `"office","dc:d2:fc:9a:79:62",6,-71`.
pub fn parse_joined_ap(line: &str) -> ProtocolResult<MacAddress> {
    let bad = || ProtocolError::BadReply(line.to_string());

    let fields = split_fields(line.trim());
    if fields.len() < 2 {
        return Err(bad());
    }
    unquote(fields[1])
        .and_then(MacAddress::parse)
        .ok_or_else(bad)
}

/// Parse the header of an inbound data push.
///
/// `header` is the text between the `+IPD` marker and the `:` that precedes
/// the raw payload, e.g. `,3,128`. Returns the link id and payload length.
pub fn parse_inbound_header(header: &str) -> ProtocolResult<(u8, usize)> {
    let bad = || ProtocolError::BadInboundHeader(header.to_string());

    let mut parts = header.strip_prefix(',').ok_or_else(bad)?.splitn(2, ',');
    let link_id: u8 = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
    let length: usize = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
    Ok((link_id, length))
}
