//! Pure classification logic for an epoch transition (`C5`), kept separate
//! from the arenas it drives so the three cases can be tested without
//! allocating anything.

/// Which of the three transition cases a `beginEpoch(newInitialTick)` call
/// falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCase {
    /// No epoch has ever been started: zero everything and start fresh.
    ColdStart,
    /// An in-progress epoch rolls into the next one: a bounded suffix of
    /// `[old_tick_begin, old_tick_end)` survives as "previous epoch" data.
    Seamless {
        old_tick_begin: u32,
        old_tick_end: u32,
    },
    /// `new_initial_tick` does not continue the current epoch (a gap, or a
    /// tick at or before `tick_begin`); treated the same as cold start.
    Other,
}

/// Decides the transition case for rolling from an epoch that began at
/// `tick_begin` to one beginning at `new_initial_tick`.
#[must_use]
pub fn classify(
    tick_begin: u32,
    max_ticks_per_epoch: u32,
    ticks_to_keep_from_prior_epoch: u32,
    new_initial_tick: u32,
) -> TransitionCase {
    if tick_begin == 0 {
        return TransitionCase::ColdStart;
    }

    let tick_in_current_epoch_storage =
        new_initial_tick >= tick_begin && new_initial_tick < tick_begin + max_ticks_per_epoch;

    if tick_in_current_epoch_storage && tick_begin < new_initial_tick {
        let old_tick_end = new_initial_tick;
        let old_tick_begin = old_tick_end
            .saturating_sub(ticks_to_keep_from_prior_epoch)
            .max(tick_begin);
        TransitionCase::Seamless {
            old_tick_begin,
            old_tick_end,
        }
    } else {
        TransitionCase::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tick_begin_is_cold_start() {
        assert_eq!(classify(0, 100, 10, 500), TransitionCase::ColdStart);
    }

    #[test]
    fn continuing_epoch_is_seamless_and_clamps_to_tick_begin() {
        // old_tick_end=105, naive old_tick_begin=105-10=95, but tick_begin=100
        // is higher and must win.
        assert_eq!(
            classify(100, 1000, 10, 105),
            TransitionCase::Seamless {
                old_tick_begin: 100,
                old_tick_end: 105
            }
        );
    }

    #[test]
    fn comfortably_past_keep_window_uses_the_full_k_ticks() {
        assert_eq!(
            classify(100, 1000, 10, 500),
            TransitionCase::Seamless {
                old_tick_begin: 490,
                old_tick_end: 500
            }
        );
    }

    #[test]
    fn tick_before_or_equal_to_tick_begin_is_other() {
        assert_eq!(classify(100, 1000, 10, 100), TransitionCase::Other);
        assert_eq!(classify(100, 1000, 10, 50), TransitionCase::Other);
    }

    #[test]
    fn tick_outside_current_epoch_storage_is_other() {
        assert_eq!(classify(100, 1000, 10, 2_000), TransitionCase::Other);
    }
}
