//! The transaction-to-log index (`B3`): which log ids a given transaction
//! produced, recovered by transaction hash and tick.

/// A transaction hash as carried over the wire: 32 bytes, opaque to this
/// crate.
pub type TxHash = [u8; 32];

/// A reserved hash used to tag protocol-level events (epoch/tick
/// boundaries) rather than an actual transaction.
pub const PROTOCOL_TX_HASH: TxHash = [0u8; 32];

#[derive(Debug, Clone, Copy)]
struct TxLogEntry {
    hash: TxHash,
    first_log_id: u64,
    count: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct TickRange {
    start: u32,
    length: u32,
    present: bool,
}

/// Per-epoch index from `(tick, txHash)` to the contiguous run of log ids
/// that transaction produced.
///
/// Backed by a flat append-ring (`entries`) rather than a conventional
/// map: entries for the currently-open transaction are found by looking at
/// the most recently written slot, and historical lookups walk the
/// per-tick range recorded in `tick_ranges`.
pub struct TxLogIndex {
    entries: Vec<TxLogEntry>,
    tick_ranges: Vec<TickRange>,
    counter: u64,
    tick_begin: u32,
    current_tick: u32,
    current_tx_hash: TxHash,
    has_entries: bool,
}

impl TxLogIndex {
    #[must_use]
    pub fn new(entry_capacity: u32, max_ticks_per_epoch: u32) -> Self {
        Self {
            entries: vec![
                TxLogEntry {
                    hash: [0u8; 32],
                    first_log_id: 0,
                    count: 0,
                };
                entry_capacity as usize
            ],
            tick_ranges: vec![TickRange::default(); max_ticks_per_epoch as usize],
            counter: 0,
            tick_begin: 0,
            current_tick: 0,
            current_tx_hash: PROTOCOL_TX_HASH,
            has_entries: false,
        }
    }

    /// Clears all index state and sets the new epoch's first tick. Called
    /// at epoch begin.
    pub fn reset(&mut self, tick_begin: u32) {
        for range in &mut self.tick_ranges {
            *range = TickRange::default();
        }
        self.counter = 0;
        self.tick_begin = tick_begin;
        self.current_tick = tick_begin;
        self.current_tx_hash = PROTOCOL_TX_HASH;
        self.has_entries = false;
    }

    /// Declares that subsequent log appends belong to `(tick, hash)`, until
    /// the next call. Must precede any log append produced while executing
    /// that transaction.
    pub fn register_new_tx(&mut self, tick: u32, hash: TxHash) {
        self.current_tick = tick;
        self.current_tx_hash = hash;
    }

    fn tick_offset(&self, tick: u32) -> Option<usize> {
        let offset = tick.checked_sub(self.tick_begin)?;
        if (offset as usize) < self.tick_ranges.len() {
            Some(offset as usize)
        } else {
            None
        }
    }

    /// Records that `log_id` was produced by the transaction registered
    /// via [`Self::register_new_tx`]. Called once per log append, after
    /// the append itself has assigned `log_id`.
    pub fn add_log_id(&mut self, log_id: u64) {
        let slot_count = self.entries.len() as u64;

        if !self.has_entries {
            self.entries[0] = TxLogEntry {
                hash: self.current_tx_hash,
                first_log_id: log_id,
                count: 1,
            };
            if let Some(offset) = self.tick_offset(self.current_tick) {
                self.tick_ranges[offset] = TickRange {
                    start: 0,
                    length: 1,
                    present: true,
                };
            }
            self.counter = 1;
            self.has_entries = true;
            return;
        }

        let last_slot = ((self.counter - 1) % slot_count) as usize;
        if self.entries[last_slot].hash == self.current_tx_hash {
            self.entries[last_slot].count += 1;
            return;
        }

        let slot = (self.counter % slot_count) as usize;
        self.entries[slot] = TxLogEntry {
            hash: self.current_tx_hash,
            first_log_id: log_id,
            count: 1,
        };
        if let Some(offset) = self.tick_offset(self.current_tick) {
            let range = &mut self.tick_ranges[offset];
            if range.present {
                range.length += 1;
            } else {
                *range = TickRange {
                    start: (self.counter % slot_count) as u32,
                    length: 1,
                    present: true,
                };
            }
        }
        self.counter += 1;
    }

    /// Returns `(firstLogId, count)` of the log ids produced by `hash`
    /// while executing `tick`, or `None` if no match is recorded.
    #[must_use]
    pub fn get_log_id_info(&self, tick: u32, hash: TxHash) -> Option<(u64, u32)> {
        let offset = self.tick_offset(tick)?;
        let range = self.tick_ranges[offset];
        if !range.present {
            return None;
        }
        let slot_count = self.entries.len() as u32;
        for i in 0..range.length {
            let slot = ((range.start + i) % slot_count) as usize;
            let entry = self.entries[slot];
            if entry.hash == hash {
                return Some((entry.first_log_id, entry.count));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> TxHash {
        let mut h = [0u8; 32];
        h[0] = byte;
        h
    }

    #[test]
    fn single_transaction_aggregates_its_logs() {
        let mut idx = TxLogIndex::new(64, 16);
        idx.reset(0);
        idx.register_new_tx(5, hash(1));
        idx.add_log_id(10);
        idx.add_log_id(11);
        idx.add_log_id(12);
        assert_eq!(idx.get_log_id_info(5, hash(1)), Some((10, 3)));
    }

    #[test]
    fn distinct_transactions_in_the_same_tick_are_separate() {
        let mut idx = TxLogIndex::new(64, 16);
        idx.reset(0);
        idx.register_new_tx(5, hash(1));
        idx.add_log_id(10);
        idx.add_log_id(11);
        idx.add_log_id(12);
        idx.register_new_tx(5, hash(2));
        idx.add_log_id(13);
        assert_eq!(idx.get_log_id_info(5, hash(1)), Some((10, 3)));
        assert_eq!(idx.get_log_id_info(5, hash(2)), Some((13, 1)));
    }

    #[test]
    fn unknown_hash_is_absent() {
        let mut idx = TxLogIndex::new(64, 16);
        idx.reset(0);
        idx.register_new_tx(2, hash(9));
        idx.add_log_id(0);
        assert_eq!(idx.get_log_id_info(2, hash(1)), None);
    }

    #[test]
    fn tick_outside_the_epoch_window_is_absent() {
        let idx = TxLogIndex::new(64, 4);
        assert_eq!(idx.get_log_id_info(100, hash(1)), None);
    }
}
