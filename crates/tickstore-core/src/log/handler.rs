//! The log subsystem's public surface: appending typed messages and
//! serving the two peer-facing log queries.

use super::buffer::{BufferAccess, LogBuffer, LogTimestamp};
use super::index::LogIdIndex;
use super::messages::{ContractLoggable, LoggableMessage};
use super::tx_index::{TxHash, TxLogIndex};
use crate::config::TickStoreConfig;
use crate::error::AppendError;

/// A 256-bit shared secret guarding the log-reader endpoints. All four
/// words must match for a request to be honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passcode(pub [u64; 4]);

/// The result of a [`LogEngine::request_log`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRangeResponse {
    /// Bad passcode, or one of the endpoints is not a currently valid id.
    Empty,
    /// The requested range did not cross a ring wrap: one contiguous frame.
    Single(Vec<u8>),
    /// The requested range crossed a ring wrap: prefix then suffix.
    Split(Vec<u8>, Vec<u8>),
}

/// Owns the log ring buffer and its two indices, and accepts the timing
/// context (epoch, tick, wall clock) a caller must supply per append since
/// none of those are the log subsystem's own concern.
pub struct LogEngine {
    buffer: LogBuffer,
    id_index: LogIdIndex,
    tx_index: TxLogIndex,
    passcode: Passcode,
}

impl LogEngine {
    #[must_use]
    pub fn new(config: &TickStoreConfig, passcode: Passcode) -> Self {
        Self {
            buffer: LogBuffer::new(config.log_buffer_size),
            id_index: LogIdIndex::new(config.log_id_index_slots()),
            tx_index: TxLogIndex::new(config.log_tx_info_storage(), config.max_ticks_per_epoch),
            passcode,
        }
    }

    /// Clears the log buffer and both indices, restarting log ids at zero.
    /// Called at epoch cold start.
    pub fn reset(&mut self, tick_begin: u32) {
        self.buffer.reset();
        self.id_index.reset();
        self.tx_index.reset(tick_begin);
    }

    /// Declares that subsequent appends are produced by `(tick, hash)`.
    /// Must precede any log append the transaction causes.
    pub fn register_new_tx(&mut self, tick: u32, hash: TxHash) {
        self.tx_index.register_new_tx(tick, hash);
    }

    fn append_and_index(
        &mut self,
        timestamp: LogTimestamp,
        epoch: u16,
        tick: u32,
        message_type: u8,
        payload: &[u8],
    ) -> Result<u64, AppendError> {
        let log_id = self
            .buffer
            .append(timestamp, epoch, tick, message_type, payload)?;
        let offset = self.buffer.tail() - (super::buffer::LOG_RECORD_HEADER_LEN as u64 + payload.len() as u64);
        self.id_index
            .set(log_id, offset, super::buffer::LOG_RECORD_HEADER_LEN as u64 + payload.len() as u64);
        self.tx_index.add_log_id(log_id);
        Ok(log_id)
    }

    /// Frames and appends a typed message.
    pub fn log<M: LoggableMessage>(
        &mut self,
        timestamp: LogTimestamp,
        epoch: u16,
        tick: u32,
        message: &M,
    ) -> Result<u64, AppendError> {
        let payload = message.to_log_bytes();
        self.append_and_index(timestamp, epoch, tick, M::MESSAGE_TYPE, &payload)
    }

    /// Frames and appends a contract-originated message, filling in the
    /// acting contract's index before framing and zeroing it again
    /// immediately after, unconditionally.
    pub fn log_contract<M: ContractLoggable>(
        &mut self,
        timestamp: LogTimestamp,
        epoch: u16,
        tick: u32,
        contract_index: u32,
        message: &mut M,
    ) -> Result<u64, AppendError> {
        message.set_contract_index(contract_index);
        let payload = message.to_log_bytes();
        let result = self.append_and_index(timestamp, epoch, tick, M::MESSAGE_TYPE, &payload);
        message.clear_contract_index();
        result
    }

    fn check_passcode(&self, passcode: Passcode) -> bool {
        passcode.0 == self.passcode.0
    }

    /// Serves a `RequestLog(fromID, toID)` query.
    #[must_use]
    pub fn request_log(
        &self,
        passcode: Passcode,
        from_id: u64,
        to_id: u64,
        max_frame_size: usize,
    ) -> LogRangeResponse {
        if !self.check_passcode(passcode) {
            return LogRangeResponse::Empty;
        }
        let Some(start) = self.id_index.get(&self.buffer, from_id) else {
            return LogRangeResponse::Empty;
        };
        let Some(end) = self.id_index.get(&self.buffer, to_id) else {
            return LogRangeResponse::Empty;
        };

        if end.offset >= start.offset {
            let bytes = BufferAccess::slice(&self.buffer, start.offset, end.offset + end.length);
            let truncated = &bytes[..bytes.len().min(max_frame_size)];
            return LogRangeResponse::Single(truncated.to_vec());
        }

        // Wrap case: walk forward from `from_id` while offsets keep
        // increasing; the last id before they drop is where the buffer
        // wrapped.
        let mut split = start;
        let mut id = from_id;
        while id < to_id {
            let next_id = id + 1;
            let Some(next) = self.id_index.get(&self.buffer, next_id) else {
                break;
            };
            if next.offset < start.offset {
                break;
            }
            split = next;
            id = next_id;
        }

        let prefix = BufferAccess::slice(&self.buffer, start.offset, split.offset + split.length);
        let prefix = &prefix[..prefix.len().min(max_frame_size)];
        let suffix = BufferAccess::slice(&self.buffer, 0, end.offset + end.length);
        let suffix = &suffix[..suffix.len().min(max_frame_size)];
        LogRangeResponse::Split(prefix.to_vec(), suffix.to_vec())
    }

    /// Serves a `RequestLogIdRangeFromTx(tick, txHash)` query. Returns
    /// `None` on a bad passcode or an absent entry — both map to the
    /// wire's `(-1, -1)` response.
    #[must_use]
    pub fn request_log_id_range_from_tx(
        &self,
        passcode: Passcode,
        tick: u32,
        hash: TxHash,
    ) -> Option<(u64, u32)> {
        if !self.check_passcode(passcode) {
            return None;
        }
        self.tx_index.get_log_id_info(tick, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TickStoreConfig;
    use crate::log::messages::QuTransfer;

    fn ts() -> LogTimestamp {
        LogTimestamp::default()
    }

    fn engine() -> LogEngine {
        let config = TickStoreConfig::small();
        let mut engine = LogEngine::new(&config, Passcode([1, 2, 3, 4]));
        engine.reset(0);
        engine
    }

    #[test]
    fn append_under_capacity_is_a_single_frame() {
        let mut engine = engine();
        let msg = QuTransfer {
            source_public_key: [1u8; 32],
            destination_public_key: [2u8; 32],
            amount: 80,
        };
        for _ in 0..3 {
            engine.log(ts(), 1, 0, &msg).unwrap();
        }
        let resp = engine.request_log(Passcode([1, 2, 3, 4]), 0, 2, 4096);
        match resp {
            LogRangeResponse::Single(bytes) => {
                assert_eq!(bytes.len(), 3 * (24 + 72));
            }
            other => panic!("expected a single frame, got {other:?}"),
        }
    }

    #[test]
    fn wrong_passcode_yields_empty_response() {
        let mut engine = engine();
        let msg = QuTransfer {
            source_public_key: [1u8; 32],
            destination_public_key: [2u8; 32],
            amount: 80,
        };
        engine.log(ts(), 1, 0, &msg).unwrap();
        let resp = engine.request_log(Passcode([9, 9, 9, 9]), 0, 0, 4096);
        assert_eq!(resp, LogRangeResponse::Empty);

        let info = engine.request_log_id_range_from_tx(Passcode([0, 0, 0, 0]), 0, [0u8; 32]);
        assert_eq!(info, None);
    }

    #[test]
    fn tx_to_log_query_reflects_registered_transactions() {
        let mut engine = engine();
        let mut hash = [0u8; 32];
        hash[0] = 7;
        engine.register_new_tx(3, hash);
        let msg = QuTransfer {
            source_public_key: [1u8; 32],
            destination_public_key: [2u8; 32],
            amount: 1,
        };
        engine.log(ts(), 1, 3, &msg).unwrap();
        engine.log(ts(), 1, 3, &msg).unwrap();
        let info = engine.request_log_id_range_from_tx(Passcode([1, 2, 3, 4]), 3, hash);
        assert_eq!(info, Some((0, 2)));
    }

    #[test]
    fn wrap_around_range_splits_into_two_frames() {
        use crate::log::messages::Burning;

        let config = TickStoreConfig {
            log_buffer_size: 200,
            ..TickStoreConfig::small()
        };
        let mut engine = LogEngine::new(&config, Passcode([1, 2, 3, 4]));
        engine.reset(0);
        let msg = Burning {
            source_public_key: [0u8; 32],
            amount: 0,
        };
        // Each record is 24 + 40 = 64 bytes. Three fit (offsets 0, 64,
        // 128); the fourth cannot fit before the 200-byte end and wraps
        // back to offset 0, overwriting the first record but leaving the
        // second and third untouched.
        let ids: Vec<u64> = (0..4).map(|_| engine.log(ts(), 1, 0, &msg).unwrap()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);

        match engine.request_log(Passcode([1, 2, 3, 4]), 1, 3, 4096) {
            LogRangeResponse::Split(prefix, suffix) => {
                assert_eq!(prefix.len(), 128);
                assert_eq!(suffix.len(), 64);
            }
            other => panic!("expected a wrap split, got {other:?}"),
        }
    }
}
