//! Transaction blob arena (`C3`) and transaction offset index (`C4`).
//!
//! `C3` is a bump allocator: transactions are appended end to end and
//! never rewritten in place within an epoch. `C4` records, for each
//! `(tick, slot)`, the `C3` byte offset of the transaction installed
//! there — `0` means the slot is empty, which is why `C3` reserves a low
//! sentinel region that nothing is ever bumped into.

use crate::arena::EpochWindowArena;
use crate::config::TickStoreConfig;

/// Fixed portion of a transaction, preceding its variable-length input.
pub const TRANSACTION_HEADER_LEN: usize = 80;

/// A transaction: a fixed header plus a variable-length input payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub source_public_key: [u8; 32],
    pub destination_public_key: [u8; 32],
    pub amount: i64,
    pub tick: u32,
    pub input_type: u16,
    pub input: Vec<u8>,
}

impl Transaction {
    /// Total on-arena size: header plus input.
    #[must_use]
    pub fn total_size(&self) -> usize {
        TRANSACTION_HEADER_LEN + self.input.len()
    }

    /// A transaction is valid if its declared input length matches its
    /// actual input and it does not attempt to move a negative amount.
    #[must_use]
    pub fn check_validity(&self) -> bool {
        self.amount >= 0 && self.input.len() <= u16::MAX as usize
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_size());
        out.extend_from_slice(&self.source_public_key);
        out.extend_from_slice(&self.destination_public_key);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out.extend_from_slice(&self.tick.to_le_bytes());
        out.extend_from_slice(&self.input_type.to_le_bytes());
        out.extend_from_slice(&(self.input.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.input);
        out
    }

    /// Parses a transaction starting at the front of `buf`. Returns the
    /// transaction and its total size, without requiring `buf` to be
    /// exactly that long.
    #[must_use]
    pub fn from_bytes(buf: &[u8]) -> Option<(Self, usize)> {
        if buf.len() < TRANSACTION_HEADER_LEN {
            return None;
        }
        let mut source_public_key = [0u8; 32];
        source_public_key.copy_from_slice(&buf[0..32]);
        let mut destination_public_key = [0u8; 32];
        destination_public_key.copy_from_slice(&buf[32..64]);
        let amount = i64::from_le_bytes(buf[64..72].try_into().ok()?);
        let tick = u32::from_le_bytes(buf[72..76].try_into().ok()?);
        let input_type = u16::from_le_bytes(buf[76..78].try_into().ok()?);
        let input_size = u16::from_le_bytes(buf[78..80].try_into().ok()?) as usize;
        let total = TRANSACTION_HEADER_LEN + input_size;
        if buf.len() < total {
            return None;
        }
        let input = buf[TRANSACTION_HEADER_LEN..total].to_vec();
        Some((
            Self {
                source_public_key,
                destination_public_key,
                amount,
                tick,
                input_type,
                input,
            },
            total,
        ))
    }
}

/// Owns the `C3` bump-allocated blob region.
pub struct TransactionBlobArena {
    data: Vec<u8>,
    first_offset: u64,
    current_epoch_size: u64,
    next_offset: u64,
}

impl TransactionBlobArena {
    #[must_use]
    pub fn new(config: &TickStoreConfig) -> Self {
        let data = vec![0u8; config.tx_arena_size() as usize];
        Self {
            data,
            first_offset: config.first_tick_transaction_offset,
            current_epoch_size: config.current_epoch_tx_arena_size(),
            next_offset: config.first_tick_transaction_offset,
        }
    }

    #[must_use]
    pub fn next_tick_transaction_offset(&self) -> u64 {
        self.next_offset
    }

    /// The arena's raw bytes, for checkpointing.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.data
    }

    /// Overwrites the arena's raw bytes and bump cursor from a checkpoint.
    /// The caller has already verified `data.len()` matches this arena's
    /// configured size.
    pub fn load_raw(&mut self, data: Vec<u8>, next_offset: u64) {
        self.data = data;
        self.next_offset = next_offset;
    }

    #[must_use]
    pub fn first_tick_transaction_offset(&self) -> u64 {
        self.first_offset
    }

    fn previous_region_start(&self) -> u64 {
        self.first_offset + self.current_epoch_size
    }

    /// Zeroes the whole arena and resets the bump cursor to the sentinel
    /// boundary. Used at cold start.
    pub fn reset(&mut self) {
        self.data.iter_mut().for_each(|b| *b = 0);
        self.next_offset = self.first_offset;
    }

    /// Zeroes only the current-epoch region (the previous-epoch region has
    /// already received a relocated copy and must survive).
    pub fn reset_current_region(&mut self) {
        let start = self.first_offset as usize;
        let end = self.previous_region_start() as usize;
        self.data[start..end].iter_mut().for_each(|b| *b = 0);
        self.next_offset = self.first_offset;
    }

    /// Appends `transaction`, returning the offset it was written at.
    /// Fails if the current-epoch region has no room left.
    pub fn append(&mut self, transaction: &Transaction) -> Option<u64> {
        let bytes = transaction.to_bytes();
        let end = self.next_offset + bytes.len() as u64;
        if end > self.previous_region_start() {
            return None;
        }
        let offset = self.next_offset;
        let start = offset as usize;
        self.data[start..start + bytes.len()].copy_from_slice(&bytes);
        self.next_offset = end;
        Some(offset)
    }

    /// Parses the transaction stored at `offset`. Offset `0` is the empty
    /// sentinel and never a valid call target.
    #[must_use]
    pub fn transaction_at(&self, offset: u64) -> Option<Transaction> {
        if offset == 0 {
            return None;
        }
        Transaction::from_bytes(&self.data[offset as usize..]).map(|(tx, _)| tx)
    }

    /// Copies the last `keep` bytes of the current-epoch region to the
    /// start of the previous-epoch region. Returns the offset delta to add
    /// to any retained `C4` offset that pointed at or after the first kept
    /// byte.
    #[must_use]
    pub fn relocate_tail(&mut self, keep: u64) -> (u64, u64) {
        let total = self.next_offset - self.first_offset;
        let keep = keep.min(total);
        let kept_start = self.next_offset - keep;
        let prev_region_start = self.previous_region_start();
        self.data
            .copy_within(kept_start as usize..self.next_offset as usize, prev_region_start as usize);
        let offset_delta = prev_region_start - kept_start;
        (kept_start, offset_delta)
    }
}

/// Owns the `C4` per-`(tick, slot)` offset table.
pub struct TransactionOffsetIndex {
    inner: EpochWindowArena<Vec<u64>>,
    transactions_per_tick: u32,
}

impl TransactionOffsetIndex {
    #[must_use]
    pub fn new(config: &TickStoreConfig) -> Self {
        let mut inner = EpochWindowArena::new(config.max_ticks_per_epoch, config.ticks_to_keep_from_prior_epoch);
        // `EpochWindowArena`'s `Default` bound zero-initializes each slot's
        // `Vec<u64>` as empty; give every slot its fixed transaction-count
        // width up front.
        for index in 0..(config.max_ticks_per_epoch + config.ticks_to_keep_from_prior_epoch) as usize {
            *inner.by_index_mut(index) = vec![0u64; config.transactions_per_tick as usize];
        }
        Self {
            inner,
            transactions_per_tick: config.transactions_per_tick,
        }
    }

    pub fn reset(&mut self, tick_begin: u32) {
        self.inner.reset(tick_begin);
        let width = self.transactions_per_tick as usize;
        for slot in 0..self.inner.len() {
            let row = self.inner.by_index_mut(slot);
            row.fill(0);
            row.resize(width, 0);
        }
    }

    #[must_use]
    pub fn all_slots(&self) -> &[Vec<u64>] {
        self.inner.all_slots()
    }

    pub fn load_all_slots(&mut self, slots: Vec<Vec<u64>>) {
        self.inner.load_all_slots(slots);
    }

    #[must_use]
    pub fn by_tick_in_current_epoch(&self, tick: u32) -> Option<&[u64]> {
        let index = self.inner.current_index(tick)?;
        Some(self.inner.by_index(index))
    }

    #[must_use]
    pub fn by_tick_in_previous_epoch(&self, tick: u32) -> Option<&[u64]> {
        let index = self.inner.previous_index(tick)?;
        Some(self.inner.by_index(index))
    }

    /// Clears the current-epoch region's slots back to all-zero offsets
    /// and installs the new `tick_begin`. Leaves the previous-epoch region
    /// (already relocated) untouched.
    pub fn begin_current_epoch(&mut self, tick_begin: u32) {
        self.inner.begin_current_epoch(tick_begin);
        let width = self.transactions_per_tick as usize;
        let current_len = self.inner.max_ticks_per_epoch() as usize;
        for slot in 0..current_len {
            let row = self.inner.by_index_mut(slot);
            row.fill(0);
            row.resize(width, 0);
        }
    }

    pub fn set(&mut self, tick: u32, slot: usize, offset: u64) {
        let index = self
            .inner
            .current_index(tick)
            .expect("tick must be within the current epoch window");
        self.inner.by_index_mut(index)[slot] = offset;
    }

    /// Relocates the retained window's offsets: zero for slots pointing at
    /// a byte before `first_kept_offset`, otherwise shifted by
    /// `offset_delta`. Must run before the underlying `C3` region is
    /// cleared.
    pub fn relocate_tail(&mut self, old_tick_begin: u32, old_tick_end: u32, first_kept_offset: u64, offset_delta: u64) {
        for tick in old_tick_begin..old_tick_end {
            let src = self
                .inner
                .current_index(tick)
                .expect("relocated tick must be in the current window");
            let relocated: Vec<u64> = self.inner.by_index(src)
                .iter()
                .map(|&offset| {
                    if offset == 0 || offset < first_kept_offset {
                        0
                    } else {
                        offset + offset_delta
                    }
                })
                .collect();
            let dst_tick_offset = tick - old_tick_begin;
            let dst = self.inner.max_ticks_per_epoch() as usize + dst_tick_offset as usize;
            *self.inner.by_index_mut(dst) = relocated;
        }
        self.inner.set_previous_window(old_tick_begin, old_tick_end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(tick: u32, amount: i64, input: &[u8]) -> Transaction {
        Transaction {
            source_public_key: [1u8; 32],
            destination_public_key: [2u8; 32],
            amount,
            tick,
            input_type: 0,
            input: input.to_vec(),
        }
    }

    #[test]
    fn append_then_read_round_trips() {
        let config = TickStoreConfig::small();
        let mut arena = TransactionBlobArena::new(&config);
        let t = tx(0, 100, b"hello");
        let offset = arena.append(&t).unwrap();
        assert_eq!(offset, config.first_tick_transaction_offset);
        let read_back = arena.transaction_at(offset).unwrap();
        assert_eq!(read_back, t);
        assert!(read_back.check_validity());
    }

    #[test]
    fn offset_zero_is_never_a_transaction() {
        let config = TickStoreConfig::small();
        let arena = TransactionBlobArena::new(&config);
        assert_eq!(arena.transaction_at(0), None);
    }

    #[test]
    fn relocate_tail_shifts_surviving_offsets() {
        let config = TickStoreConfig::small();
        let mut blob = TransactionBlobArena::new(&config);
        let mut offsets = TransactionOffsetIndex::new(&config);
        offsets.reset(0);

        let a = tx(0, 1, b"aa");
        let off_a = blob.append(&a).unwrap();
        offsets.set(0, 0, off_a);
        let b = tx(1, 2, b"bb");
        let off_b = blob.append(&b).unwrap();
        offsets.set(1, 0, off_b);

        let total = blob.next_tick_transaction_offset() - blob.first_tick_transaction_offset();
        let (first_kept_offset, offset_delta) = blob.relocate_tail(total);
        offsets.relocate_tail(0, 2, first_kept_offset, offset_delta);
        blob.reset_current_region();
        offsets.begin_current_epoch(2);

        let relocated_b = offsets.by_tick_in_previous_epoch(1).unwrap()[0];
        let recovered = blob.transaction_at(relocated_b).unwrap();
        assert_eq!(recovered, b);
    }
}
