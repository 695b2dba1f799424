//! `RequestLogIdRangeFromTx`/`ResponseLogIdRangeFromTx` (wire types
//! 46/47): look up the log id range a transaction's appends landed in.

use tickstore_core::{Passcode, TickStore, TxHash};

use crate::sink::ResponseSink;
use crate::{RESPONSE_LOG_ID_RANGE_FROM_TX, REQUEST_LOG_ID_RANGE_FROM_TX};

/// `passcode: u64[4]; tick: u32; txHash: 32B`, little-endian, packed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLogIdRangeFromTx {
    pub passcode: Passcode,
    pub tick: u32,
    pub tx_hash: TxHash,
}

impl RequestLogIdRangeFromTx {
    pub const ENCODED_LEN: usize = 32 + 4 + 32;

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        for (word, chunk) in self.passcode.0.iter().zip(out[0..32].chunks_exact_mut(8)) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out[32..36].copy_from_slice(&self.tick.to_le_bytes());
        out[36..68].copy_from_slice(&self.tx_hash);
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
        let mut tx_hash = [0u8; 32];
        tx_hash.copy_from_slice(&buf[36..68]);
        Some(Self {
            passcode: Passcode(passcode),
            tick: u32::from_le_bytes(buf[32..36].try_into().ok()?),
            tx_hash,
        })
    }
}

/// `fromLogId: i64; length: i64`, little-endian, packed. `(-1, -1)` means
/// the transaction has no recorded appends, whether because the
/// passcode was wrong or the hash was never registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseLogIdRangeFromTx {
    pub from_log_id: i64,
    pub length: i64,
}

impl ResponseLogIdRangeFromTx {
    pub const ENCODED_LEN: usize = 16;

    #[must_use]
    pub fn absent() -> Self {
        Self {
            from_log_id: -1,
            length: -1,
        }
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0..8].copy_from_slice(&self.from_log_id.to_le_bytes());
        out[8..16].copy_from_slice(&self.length.to_le_bytes());
        out
    }
}

impl From<Option<(u64, u32)>> for ResponseLogIdRangeFromTx {
    fn from(info: Option<(u64, u32)>) -> Self {
        match info {
            Some((from_log_id, length)) => Self {
                from_log_id: from_log_id as i64,
                length: i64::from(length),
            },
            None => Self::absent(),
        }
    }
}

/// Decodes a `RequestLogIdRangeFromTx` from `request_bytes`, answers it
/// against `store`, and enqueues a single `ResponseLogIdRangeFromTx`
/// frame. A malformed request answers `(-1, -1)`, the same as an absent
/// hash.
pub fn process_request_tx_log_info<S: ResponseSink>(
    store: &TickStore,
    sink: &mut S,
    dejavu: u32,
    request_bytes: &[u8],
) {
    let response = match RequestLogIdRangeFromTx::from_bytes(request_bytes) {
        Some(request) => {
            ResponseLogIdRangeFromTx::from(store.request_log_id_range_from_tx(request.passcode, request.tick, request.tx_hash))
        }
        None => ResponseLogIdRangeFromTx::absent(),
    };
    sink.enqueue_response(RESPONSE_LOG_ID_RANGE_FROM_TX, dejavu, &response.to_bytes());
}
