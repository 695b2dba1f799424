//! Quorum tick (vote) arena (`C2`): one fixed-size vote record per
//! `(tick, computor)` pair, windowed the same way as `C1`.

use crate::arena::EpochWindowArena;

/// A single computor's vote for a given tick. An all-zero `epoch` marks an
/// empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub epoch: u32,
    pub tick: u32,
    pub computor_index: u32,
    pub content_digest: [u8; 32],
}

impl Default for Tick {
    fn default() -> Self {
        Self {
            epoch: 0,
            tick: 0,
            computor_index: 0,
            content_digest: [0u8; 32],
        }
    }
}

impl Tick {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.epoch == 0
    }
}

/// Owns the `C2` arena: one [`EpochWindowArena`] per computor, each
/// independently lockable by the caller (see `tickstore_core::store`).
pub struct QuorumArena {
    per_computor: Vec<EpochWindowArena<Tick>>,
}

impl QuorumArena {
    #[must_use]
    pub fn new(number_of_computors: u32, max_ticks_per_epoch: u32, ticks_to_keep: u32) -> Self {
        Self {
            per_computor: (0..number_of_computors)
                .map(|_| EpochWindowArena::new(max_ticks_per_epoch, ticks_to_keep))
                .collect(),
        }
    }

    #[must_use]
    pub fn number_of_computors(&self) -> u32 {
        self.per_computor.len() as u32
    }

    pub fn reset(&mut self, tick_begin: u32) {
        for row in &mut self.per_computor {
            row.reset(tick_begin);
        }
    }

    pub fn begin_current_epoch(&mut self, tick_begin: u32) {
        for row in &mut self.per_computor {
            row.begin_current_epoch(tick_begin);
        }
    }

    pub fn relocate_tail(&mut self, old_tick_begin: u32, old_tick_end: u32) {
        for row in &mut self.per_computor {
            row.relocate_tail(old_tick_begin, old_tick_end);
        }
    }

    /// All slots of a single computor's row, current epoch followed by
    /// previous epoch.
    #[must_use]
    pub fn row_slots(&self, computor_index: u32) -> &[Tick] {
        self.per_computor[computor_index as usize].all_slots()
    }

    pub fn load_row_slots(&mut self, computor_index: u32, slots: Vec<Tick>) {
        self.per_computor[computor_index as usize].load_all_slots(slots);
    }

    #[must_use]
    pub fn by_tick_in_current_epoch(&self, computor_index: u32, tick: u32) -> Option<&Tick> {
        let row = &self.per_computor[computor_index as usize];
        let index = row.current_index(tick)?;
        Some(row.by_index(index))
    }

    #[must_use]
    pub fn by_tick_in_previous_epoch(&self, computor_index: u32, tick: u32) -> Option<&Tick> {
        let row = &self.per_computor[computor_index as usize];
        let index = row.previous_index(tick)?;
        Some(row.by_index(index))
    }

    /// Installs `vote` at `(tick, computor_index)`. `tick` must be at or
    /// after the system's current tick.
    pub fn set(&mut self, computor_index: u32, tick: u32, vote: Tick) {
        let row = &mut self.per_computor[computor_index as usize];
        let index = row
            .current_index(tick)
            .expect("tick must be within the current epoch window");
        *row.by_index_mut(index) = vote;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn votes_are_independent_per_computor() {
        let mut arena = QuorumArena::new(4, 8, 2);
        arena.reset(0);
        arena.set(
            1,
            3,
            Tick {
                epoch: 2,
                tick: 3,
                computor_index: 1,
                content_digest: [1u8; 32],
            },
        );
        assert!(arena.by_tick_in_current_epoch(0, 3).unwrap().is_empty());
        assert_eq!(arena.by_tick_in_current_epoch(1, 3).unwrap().computor_index, 1);
    }
}
