//! Tick data arena (`C1`): one fixed-size record per tick, covering the
//! current epoch plus a retained suffix of the previous one.

use crate::arena::EpochWindowArena;

/// Per-tick metadata. An all-zero `epoch` marks an empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickData {
    pub epoch: u32,
    pub tick: u32,
    pub timestamp_millis: u64,
    pub content_digest: [u8; 32],
}

impl Default for TickData {
    fn default() -> Self {
        Self {
            epoch: 0,
            tick: 0,
            timestamp_millis: 0,
            content_digest: [0u8; 32],
        }
    }
}

impl TickData {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.epoch == 0
    }
}

/// Owns the `C1` arena.
pub struct TickDataArena {
    inner: EpochWindowArena<TickData>,
}

impl TickDataArena {
    #[must_use]
    pub fn new(max_ticks_per_epoch: u32, ticks_to_keep: u32) -> Self {
        Self {
            inner: EpochWindowArena::new(max_ticks_per_epoch, ticks_to_keep),
        }
    }

    pub fn reset(&mut self, tick_begin: u32) {
        self.inner.reset(tick_begin);
    }

    pub fn begin_current_epoch(&mut self, tick_begin: u32) {
        self.inner.begin_current_epoch(tick_begin);
    }

    pub fn relocate_tail(&mut self, old_tick_begin: u32, old_tick_end: u32) {
        self.inner.relocate_tail(old_tick_begin, old_tick_end);
    }

    #[must_use]
    pub fn by_index(&self, index: usize) -> &TickData {
        self.inner.by_index(index)
    }

    #[must_use]
    pub fn all_slots(&self) -> &[TickData] {
        self.inner.all_slots()
    }

    pub fn load_all_slots(&mut self, slots: Vec<TickData>) {
        self.inner.load_all_slots(slots);
    }

    /// Returns the tick's record if `tick` lies in the current epoch's
    /// window. Debug builds assert the index is in range; release builds
    /// return `None` rather than indexing out of bounds.
    #[must_use]
    pub fn by_tick_in_current_epoch(&self, tick: u32) -> Option<&TickData> {
        let index = self.inner.current_index(tick)?;
        Some(self.inner.by_index(index))
    }

    #[must_use]
    pub fn by_tick_in_previous_epoch(&self, tick: u32) -> Option<&TickData> {
        let index = self.inner.previous_index(tick)?;
        Some(self.inner.by_index(index))
    }

    /// Installs `data` at `tick`, which must be at or after the system's
    /// current tick (the caller enforces this — ticks already finalized
    /// are never rewritten).
    pub fn set(&mut self, tick: u32, data: TickData) {
        let index = self
            .inner
            .current_index(tick)
            .expect("tick must be within the current epoch window");
        *self.inner.by_index_mut(index) = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_has_zero_epoch() {
        let arena = TickDataArena::new(4, 2);
        assert!(arena.by_index(0).is_empty());
    }

    #[test]
    fn set_then_read_round_trips() {
        let mut arena = TickDataArena::new(4, 2);
        arena.reset(100);
        arena.set(
            101,
            TickData {
                epoch: 5,
                tick: 101,
                timestamp_millis: 42,
                content_digest: [9u8; 32],
            },
        );
        let data = arena.by_tick_in_current_epoch(101).unwrap();
        assert_eq!(data.epoch, 5);
        assert_eq!(data.timestamp_millis, 42);
    }

    #[test]
    fn tick_outside_window_returns_none() {
        let arena = TickDataArena::new(4, 2);
        assert_eq!(arena.by_tick_in_current_epoch(9_999), None);
    }
}
