//! `RequestLog`/`RespondLog` (wire types 44/45): fetch a contiguous or
//! wrapped range of the event log by id.

use tickstore_core::{LogRangeResponse, Passcode, TickStore};

use crate::sink::ResponseSink;
use crate::{RESPOND_LOG, REQUEST_LOG};

/// `passcode: u64[4]; fromID: u64; toID: u64` (inclusive), little-endian,
/// packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLog {
    pub passcode: Passcode,
    pub from_id: u64,
    pub to_id: u64,
}

impl RequestLog {
    pub const ENCODED_LEN: usize = 48;

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        for (word, chunk) in self.passcode.0.iter().zip(out.chunks_exact_mut(8)) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out[32..40].copy_from_slice(&self.from_id.to_le_bytes());
        out[40..48].copy_from_slice(&self.to_id.to_le_bytes());
        out
    }

    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::ENCODED_LEN {
            return None;
        }
        let mut passcode = [0u64; 4];
        for (word, chunk) in passcode.iter_mut().zip(buf[0..32].chunks_exact(8)) {
            *word = u64::from_le_bytes(chunk.try_into().ok()?);
        }
        Some(Self {
            passcode: Passcode(passcode),
            from_id: u64::from_le_bytes(buf[32..40].try_into().ok()?),
            to_id: u64::from_le_bytes(buf[40..48].try_into().ok()?),
        })
    }
}

/// Decodes a `RequestLog` from `request_bytes`, answers it against
/// `store`, and enqueues one `RespondLog` frame per physical segment of
/// the answer (one for a contiguous range, two for a range that crossed
/// the ring's wrap point). A malformed request or an empty answer
/// enqueues a single zero-length frame of type 45.
pub fn process_request_log<S: ResponseSink>(
    store: &TickStore,
    sink: &mut S,
    dejavu: u32,
    request_bytes: &[u8],
    max_frame_size: usize,
) {
    let Some(request) = RequestLog::from_bytes(request_bytes) else {
        sink.enqueue_response(RESPOND_LOG, dejavu, &[]);
        return;
    };

    match store.request_log(request.passcode, request.from_id, request.to_id, max_frame_size) {
        LogRangeResponse::Empty => sink.enqueue_response(RESPOND_LOG, dejavu, &[]),
        LogRangeResponse::Single(bytes) => sink.enqueue_response(RESPOND_LOG, dejavu, &bytes),
        LogRangeResponse::Split(prefix, suffix) => {
            sink.enqueue_response(RESPOND_LOG, dejavu, &prefix);
            sink.enqueue_response(RESPOND_LOG, dejavu, &suffix);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_log_round_trips_through_bytes() {
        let request = RequestLog {
            passcode: Passcode([1, 2, 3, 4]),
            from_id: 10,
            to_id: 99,
        };
        assert_eq!(RequestLog::from_bytes(&request.to_bytes()), Some(request));
    }

    #[test]
    fn truncated_request_fails_to_parse() {
        assert_eq!(RequestLog::from_bytes(&[0u8; 40]), None);
    }

    #[test]
    fn unknown_request_type_marker_is_distinct_from_the_log_ids_it_carries() {
        assert_ne!(REQUEST_LOG, RESPOND_LOG);
    }

    #[test]
    fn process_request_log_enqueues_an_empty_frame_on_a_malformed_request() {
        use crate::sink::test_support::RecordingSink;

        let store = TickStore::new(
            tickstore_core::TickStoreConfig::small(),
            Passcode([1, 2, 3, 4]),
        )
        .unwrap();
        let mut sink = RecordingSink::default();
        process_request_log(&store, &mut sink, 7, &[0u8; 4], 4096);
        assert_eq!(sink.sent, vec![(RESPOND_LOG, 7, Vec::new())]);
    }

    #[test]
    fn process_request_log_answers_a_registered_range() {
        use crate::sink::test_support::RecordingSink;
        use tickstore_core::log::messages::QuTransfer;

        let store = TickStore::new(tickstore_core::TickStoreConfig::small(), Passcode([1, 2, 3, 4])).unwrap();
        store.begin_epoch(1, 0);
        let msg = QuTransfer {
            source_public_key: [1u8; 32],
            destination_public_key: [2u8; 32],
            amount: 5,
        };
        store.log(0, &msg).unwrap();
        store.log(0, &msg).unwrap();

        let request = RequestLog {
            passcode: Passcode([1, 2, 3, 4]),
            from_id: 0,
            to_id: 1,
        };
        let mut sink = RecordingSink::default();
        process_request_log(&store, &mut sink, 1, &request.to_bytes(), 4096);
        assert_eq!(sink.sent.len(), 1);
        assert_eq!(sink.sent[0].0, RESPOND_LOG);
        assert_eq!(sink.sent[0].2.len(), 2 * (24 + 72));
    }
}
