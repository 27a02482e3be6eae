//! Unsolicited-marker dispatch table.
//!
//! The modem pushes two kinds of unsolicited traffic into the reply stream:
//! inbound socket data (`+IPD`) and asynchronous join-failure notices
//! (`+CWJAP:<code>` followed by `FAIL`, or, on firmware that deviates from
//! its own documentation, a bare `FAIL` line). The matcher consults this
//! table on every accumulated reply line; a match suspends reply matching
//! and hands control to the corresponding handler in `modem.rs` before
//! matching resumes.

use atwifi_protocol::{FAIL_TOKEN, INBOUND_DATA_MARKER, JOIN_FAILURE_MARKER};

/// What kind of unsolicited traffic a marker announces.
///
/// Dispatch is a table lookup to one of these tags; the handlers themselves
/// live on the driver state so they can reach the packet queue and failure
/// state without reentering the exchange lock they already run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OobEvent {
    /// `+IPD`: a `,<link_id>,<len>:` header and `len` raw payload bytes
    /// follow.
    InboundData,
    /// `+CWJAP:`: a numeric failure code and a `FAIL` line follow.
    JoinFailure,
    /// A bare `FAIL` line with no preceding notice.
    BareFail,
}

/// Registered marker → event table, consulted in registration order.
#[derive(Debug)]
pub(crate) struct OobTable {
    entries: Vec<(&'static str, OobEvent)>,
}

impl OobTable {
    /// The standard marker set.
    pub fn standard() -> Self {
        OobTable {
            entries: vec![
                (INBOUND_DATA_MARKER, OobEvent::InboundData),
                (JOIN_FAILURE_MARKER, OobEvent::JoinFailure),
                (FAIL_TOKEN, OobEvent::BareFail),
            ],
        }
    }

    /// Match the bytes accumulated since the last delimiter against the
    /// registered markers. Markers are recognized at line start only.
    pub fn match_line(&self, line: &[u8]) -> Option<OobEvent> {
        self.entries
            .iter()
            .find(|(marker, _)| marker.as_bytes() == line)
            .map(|(_, event)| *event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_match_exact_line_start() {
        let table = OobTable::standard();
        assert_eq!(table.match_line(b"+IPD"), Some(OobEvent::InboundData));
        assert_eq!(table.match_line(b"+CWJAP:"), Some(OobEvent::JoinFailure));
        assert_eq!(table.match_line(b"FAIL"), Some(OobEvent::BareFail));
    }

    #[test]
    fn test_partial_and_noisy_lines_do_not_match() {
        let table = OobTable::standard();
        assert_eq!(table.match_line(b"+IP"), None);
        assert_eq!(table.match_line(b"+CWJAP"), None);
        // The joined-AP query reply shares a prefix with the failure notice
        // but diverges before the colon.
        assert_eq!(table.match_line(b"+CWJAP_"), None);
        assert_eq!(table.match_line(b"x+IPD"), None);
        assert_eq!(table.match_line(b"FAI"), None);
    }
}
