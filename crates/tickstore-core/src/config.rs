//! Runtime capacity configuration.
//!
//! The original system fixes these as compile-time constants sized for a
//! single production network. Here they are a runtime value so tests can
//! instantiate a store at a scale that fits in a few megabytes instead of
//! the multi-gigabyte production footprint.

/// Capacities and arena sizing knobs for a [`crate::store::TickStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStoreConfig {
    /// Ticks held for the current epoch (`M`).
    pub max_ticks_per_epoch: u32,
    /// Ticks retained from the prior epoch after a seamless transition (`K`).
    pub ticks_to_keep_from_prior_epoch: u32,
    /// Voting computors (`C`).
    pub number_of_computors: u32,
    /// Transaction slots per tick (`T`).
    pub transactions_per_tick: u32,
    /// Upper bound on a single transaction's serialized size.
    pub max_transaction_size: u32,
    /// Divisor applied to the worst-case transaction arena size; transactions
    /// are assumed to average out well below `max_transaction_size`.
    pub transaction_sparseness: u32,
    /// Low region of the transaction blob arena reserved as an
    /// empty-offset sentinel; offset `0` always means "no transaction".
    pub first_tick_transaction_offset: u64,
    /// Capacity, in bytes, of the log ring buffer (`B1`).
    pub log_buffer_size: u64,
    /// Ticks of log-producing history the tx-to-log index covers.
    pub log_max_storage_tick: u32,
    /// Assumed average transactions per tick, used to size the flat
    /// tx-to-log table (`LOG_TX_INFO_STORAGE = log_max_storage_tick *
    /// log_avg_tx_per_tick`).
    pub log_avg_tx_per_tick: u32,
}

impl TickStoreConfig {
    /// Capacities matching the production network this core was built for.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            max_ticks_per_epoch: 100_000,
            ticks_to_keep_from_prior_epoch: 100,
            number_of_computors: 676,
            transactions_per_tick: 1024,
            max_transaction_size: 1024,
            transaction_sparseness: 8,
            first_tick_transaction_offset: 1 << 20,
            log_buffer_size: 8 * 1024 * 1024 * 1024,
            log_max_storage_tick: 20_000,
            log_avg_tx_per_tick: 64,
        }
    }

    /// Tiny capacities suitable for unit tests and the demo binary.
    #[must_use]
    pub const fn small() -> Self {
        Self {
            max_ticks_per_epoch: 16,
            ticks_to_keep_from_prior_epoch: 4,
            number_of_computors: 8,
            transactions_per_tick: 4,
            max_transaction_size: 256,
            transaction_sparseness: 2,
            first_tick_transaction_offset: 64,
            log_buffer_size: 64 * 1024,
            log_max_storage_tick: 16,
            log_avg_tx_per_tick: 4,
        }
    }

    /// Size in bytes of the current-epoch slice of the transaction blob
    /// arena, i.e. the worst case if every slot held a maximal transaction.
    #[must_use]
    pub fn current_epoch_tx_arena_size(&self) -> u64 {
        u64::from(self.max_ticks_per_epoch)
            * u64::from(self.transactions_per_tick)
            * u64::from(self.max_transaction_size)
            / u64::from(self.transaction_sparseness)
    }

    /// Size in bytes of the previous-epoch slice of the transaction blob
    /// arena.
    #[must_use]
    pub fn previous_epoch_tx_arena_size(&self) -> u64 {
        u64::from(self.ticks_to_keep_from_prior_epoch)
            * u64::from(self.transactions_per_tick)
            * u64::from(self.max_transaction_size)
            / u64::from(self.transaction_sparseness)
    }

    /// Total transaction blob arena size, sentinel region included.
    #[must_use]
    pub fn tx_arena_size(&self) -> u64 {
        self.first_tick_transaction_offset
            + self.current_epoch_tx_arena_size()
            + self.previous_epoch_tx_arena_size()
    }

    /// Total tick slot count across current and previous epoch windows.
    #[must_use]
    pub fn total_tick_slots(&self) -> u32 {
        self.max_ticks_per_epoch + self.ticks_to_keep_from_prior_epoch
    }

    /// Size of the flat tx-to-log table (`LOG_TX_INFO_STORAGE`).
    #[must_use]
    pub fn log_tx_info_storage(&self) -> u32 {
        self.log_max_storage_tick * self.log_avg_tx_per_tick
    }

    /// Number of slots in the direct-addressed log-id index (`B2`), sized by
    /// the smallest possible on-buffer record (header only, no payload).
    #[must_use]
    pub fn log_id_index_slots(&self) -> u64 {
        self.log_buffer_size / u64::from(crate::log::buffer::LOG_RECORD_HEADER_LEN)
    }
}
