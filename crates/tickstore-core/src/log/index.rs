//! The log id index (`B2`): a direct-addressed table from log id to its
//! on-buffer position, validated by re-reading the id stored at that
//! position rather than by any form of rehashing.

use super::buffer::{BufferAccess, LogBuffer};

/// Position and length of a framed record inside the log buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobInfo {
    pub offset: u64,
    pub length: u64,
}

/// Direct-addressed `logId mod N` table of [`BlobInfo`] entries.
///
/// This is not a hash map: every log id maps to exactly one slot by
/// modulus, and an entry is considered present only if the record it
/// points at still carries that same id. Once a slot is overwritten by a
/// newer record (through either a fresh write or ring wraparound), the
/// old entry is implicitly invalidated without any explicit eviction.
pub struct LogIdIndex {
    slots: Vec<BlobInfo>,
}

impl LogIdIndex {
    #[must_use]
    pub fn new(slot_count: u64) -> Self {
        Self {
            slots: vec![
                BlobInfo {
                    offset: 0,
                    length: 0
                };
                slot_count as usize
            ],
        }
    }

    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            *slot = BlobInfo {
                offset: 0,
                length: 0,
            };
        }
    }

    fn slot(&self, log_id: u64) -> usize {
        (log_id % self.slots.len() as u64) as usize
    }

    /// Unconditionally overwrites the slot for `log_id`.
    pub fn set(&mut self, log_id: u64, offset: u64, length: u64) {
        let slot = self.slot(log_id);
        self.slots[slot] = BlobInfo { offset, length };
    }

    /// Returns the blob position for `log_id` if the slot still belongs to
    /// it, confirmed by re-reading the header stored in `buffer`.
    #[must_use]
    pub fn get(&self, buffer: &LogBuffer, log_id: u64) -> Option<BlobInfo> {
        let entry = self.slots[self.slot(log_id)];
        if entry.length == 0 {
            return None;
        }
        if BufferAccess::log_id_at(buffer, entry.offset) == log_id {
            Some(entry)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> super::super::buffer::LogTimestamp {
        super::super::buffer::LogTimestamp::default()
    }

    #[test]
    fn fresh_id_is_found_after_set() {
        let mut buf = LogBuffer::new(4096);
        let mut idx = LogIdIndex::new(16);
        let id = buf.append(ts(), 1, 0, 0, b"hi").unwrap();
        idx.set(id, 0, 26);
        assert_eq!(
            idx.get(&buf, id),
            Some(BlobInfo {
                offset: 0,
                length: 26
            })
        );
    }

    #[test]
    fn overwritten_slot_invalidates_old_id() {
        let mut buf = LogBuffer::new(4096);
        let mut idx = LogIdIndex::new(4);
        let first = buf.append(ts(), 1, 0, 0, b"a").unwrap();
        idx.set(first, 0, 25);
        // id 4 maps to the same slot as id 0 under a 4-slot table.
        let fourth_offset = 25 * 4;
        idx.set(4, fourth_offset, 25);
        assert_eq!(idx.get(&buf, first), None);
    }

    #[test]
    fn unset_slot_is_absent() {
        let buf = LogBuffer::new(4096);
        let idx = LogIdIndex::new(8);
        assert_eq!(idx.get(&buf, 3), None);
    }
}
