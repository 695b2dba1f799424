//! The top-level service object wiring the log subsystem and the tick
//! storage subsystem together, and the epoch transition and checkpoint
//! operations that span both.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::checkpoint::{self, CheckpointDir, CheckpointMetadata};
use crate::clock::{Clock, SystemClock};
use crate::codec::{self, FixedRecord};
use crate::config::TickStoreConfig;
use crate::error::{AppendError, CheckpointCode, InitError};
use crate::log::{self, LogEngine, LogRangeResponse, LogTimestamp, Passcode, TxHash};
use crate::tick::{self, QuorumArena, Tick, TickData, TickDataArena, Transaction, TransactionBlobArena, TransactionOffsetIndex, TransitionCase};

/// Current epoch and tick window, the small amount of scalar state that
/// every other lock's acquisition order is defined relative to.
#[derive(Debug, Clone, Copy, Default)]
struct SystemWindow {
    epoch: u32,
    tick_begin: u32,
    tick_end: u32,
    current_tick: u32,
}

/// The tick storage and event log core.
///
/// Lock acquisition order, when an operation needs more than one: the log
/// lock before any tick lock; among tick locks, tick data, then
/// transactions, then quorum. Held locks are never carried across file
/// I/O — checkpoint save/load snapshot each arena into an owned buffer
/// before touching the filesystem.
pub struct TickStore {
    config: TickStoreConfig,
    clock: Arc<dyn Clock>,
    system: Mutex<SystemWindow>,
    log: Mutex<LogEngine>,
    tick_data: RwLock<TickDataArena>,
    transactions: Mutex<(TransactionBlobArena, TransactionOffsetIndex)>,
    quorum: Mutex<QuorumArena>,
}

impl TickStore {
    /// Builds a store at `config`'s capacities, reading time from the OS
    /// clock.
    pub fn new(config: TickStoreConfig, passcode: Passcode) -> Result<Self, InitError> {
        Self::with_clock(config, passcode, Arc::new(SystemClock))
    }

    /// Builds a store with an injected clock, for deterministic log
    /// timestamps in tests.
    pub fn with_clock(config: TickStoreConfig, passcode: Passcode, clock: Arc<dyn Clock>) -> Result<Self, InitError> {
        if config.max_ticks_per_epoch == 0 {
            return Err(InitError::Alloc {
                arena: "tick data",
                bytes: 0,
            });
        }
        if config.log_buffer_size < u64::from(log::buffer::LOG_RECORD_HEADER_LEN) {
            return Err(InitError::Alloc {
                arena: "log buffer",
                bytes: config.log_buffer_size,
            });
        }

        Ok(Self {
            log: Mutex::new(LogEngine::new(&config, passcode)),
            tick_data: RwLock::new(TickDataArena::new(config.max_ticks_per_epoch, config.ticks_to_keep_from_prior_epoch)),
            transactions: Mutex::new((
                TransactionBlobArena::new(&config),
                TransactionOffsetIndex::new(&config),
            )),
            quorum: Mutex::new(QuorumArena::new(
                config.number_of_computors,
                config.max_ticks_per_epoch,
                config.ticks_to_keep_from_prior_epoch,
            )),
            system: Mutex::new(SystemWindow::default()),
            clock,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TickStoreConfig {
        &self.config
    }

    #[must_use]
    pub fn current_epoch(&self) -> u32 {
        self.system.lock().epoch
    }

    #[must_use]
    pub fn tick_window(&self) -> (u32, u32) {
        let system = self.system.lock();
        (system.tick_begin, system.tick_end)
    }

    /// Advances the system's notion of "current tick". Installers must not
    /// write ticks before this value.
    pub fn set_current_tick(&self, tick: u32) {
        self.system.lock().current_tick = tick;
    }

    // -- Epoch transition (C5) ------------------------------------------------

    /// Rolls the store into a new epoch beginning at `new_initial_tick`,
    /// choosing cold-start, seamless, or fallback-to-cold-start handling
    /// per the classification in [`tick::classify_transition`].
    pub fn begin_epoch(&self, epoch: u32, new_initial_tick: u32) {
        let mut log = self.log.lock();
        let mut tick_data = self.tick_data.write();
        let mut transactions = self.transactions.lock();
        let mut quorum = self.quorum.lock();
        let mut system = self.system.lock();

        let case = tick::classify_transition(
            system.tick_begin,
            self.config.max_ticks_per_epoch,
            self.config.ticks_to_keep_from_prior_epoch,
            new_initial_tick,
        );

        match case {
            TransitionCase::ColdStart | TransitionCase::Other => {
                log.reset(new_initial_tick);
                tick_data.reset(new_initial_tick);
                transactions.0.reset();
                transactions.1.reset(new_initial_tick);
                quorum.reset(new_initial_tick);
            }
            TransitionCase::Seamless {
                old_tick_begin,
                old_tick_end,
            } => {
                debug_assert!(old_tick_begin <= old_tick_end);
                debug_assert!(old_tick_end - old_tick_begin <= self.config.ticks_to_keep_from_prior_epoch);
                debug_assert!(old_tick_end <= system.tick_begin || old_tick_end <= new_initial_tick);

                tick_data.relocate_tail(old_tick_begin, old_tick_end);
                quorum.relocate_tail(old_tick_begin, old_tick_end);

                let total_tx = transactions.0.next_tick_transaction_offset() - transactions.0.first_tick_transaction_offset();
                let keep = total_tx.min(self.config.previous_epoch_tx_arena_size());
                let (first_kept_offset, offset_delta) = transactions.0.relocate_tail(keep);
                transactions
                    .1
                    .relocate_tail(old_tick_begin, old_tick_end, first_kept_offset, offset_delta);

                tick_data.begin_current_epoch(new_initial_tick);
                quorum.begin_current_epoch(new_initial_tick);
                transactions.0.reset_current_region();
                transactions.1.begin_current_epoch(new_initial_tick);

                log.reset(new_initial_tick);
            }
        }

        system.epoch = epoch;
        system.tick_begin = new_initial_tick;
        system.tick_end = new_initial_tick + self.config.max_ticks_per_epoch;
        system.current_tick = new_initial_tick;
    }

    // -- Event log (B1-B4) -----------------------------------------------------

    /// Must precede any log appends produced while executing this
    /// transaction.
    pub fn register_new_tx(&self, tick: u32, hash: TxHash) {
        self.log.lock().register_new_tx(tick, hash);
    }

    /// Frames and appends a typed log message.
    pub fn log<M: log::messages::LoggableMessage>(&self, tick: u32, message: &M) -> Result<u64, AppendError> {
        let epoch = self.system.lock().epoch;
        let timestamp = self.clock.now();
        self.log.lock().log(timestamp, epoch as u16, tick, message)
    }

    /// Frames and appends a contract-originated log message.
    pub fn log_contract<M: log::messages::ContractLoggable>(
        &self,
        tick: u32,
        contract_index: u32,
        message: &mut M,
    ) -> Result<u64, AppendError> {
        let epoch = self.system.lock().epoch;
        let timestamp = self.clock.now();
        self.log
            .lock()
            .log_contract(timestamp, epoch as u16, tick, contract_index, message)
    }

    #[must_use]
    pub fn request_log(&self, passcode: Passcode, from_id: u64, to_id: u64, max_frame_size: usize) -> LogRangeResponse {
        self.log.lock().request_log(passcode, from_id, to_id, max_frame_size)
    }

    #[must_use]
    pub fn request_log_id_range_from_tx(&self, passcode: Passcode, tick: u32, hash: TxHash) -> Option<(u64, u32)> {
        self.log.lock().request_log_id_range_from_tx(passcode, tick, hash)
    }

    // -- Tick data and quorum (C1, C2) ------------------------------------------

    pub fn set_tick_data(&self, tick: u32, data: TickData) {
        self.tick_data.write().set(tick, data);
    }

    #[must_use]
    pub fn tick_data_in_current_epoch(&self, tick: u32) -> Option<TickData> {
        self.tick_data.read().by_tick_in_current_epoch(tick).copied()
    }

    #[must_use]
    pub fn tick_data_in_previous_epoch(&self, tick: u32) -> Option<TickData> {
        self.tick_data.read().by_tick_in_previous_epoch(tick).copied()
    }

    pub fn set_quorum_vote(&self, computor_index: u32, tick: u32, vote: Tick) {
        self.quorum.lock().set(computor_index, tick, vote);
    }

    #[must_use]
    pub fn quorum_vote_in_current_epoch(&self, computor_index: u32, tick: u32) -> Option<Tick> {
        self.quorum.lock().by_tick_in_current_epoch(computor_index, tick).copied()
    }

    // -- Transactions (C3, C4) ---------------------------------------------------

    /// Appends `transaction` into the blob arena and records its offset at
    /// `(tick, slot)`. Returns `None` if the transaction fails validity or
    /// the current-epoch region has no room left.
    pub fn append_transaction(&self, tick: u32, slot: usize, transaction: &Transaction) -> Option<u64> {
        if !transaction.check_validity() || transaction.tick != tick {
            return None;
        }
        let mut guard = self.transactions.lock();
        let offset = guard.0.append(transaction)?;
        guard.1.set(tick, slot, offset);
        Some(offset)
    }

    #[must_use]
    pub fn transaction_at_offset(&self, offset: u64) -> Option<Transaction> {
        self.transactions.lock().0.transaction_at(offset)
    }

    #[must_use]
    pub fn transaction_offsets_in_current_epoch(&self, tick: u32) -> Option<Vec<u64>> {
        self.transactions.lock().1.by_tick_in_current_epoch(tick).map(<[u64]>::to_vec)
    }

    // -- Checkpoint I/O (C6) ------------------------------------------------------

    /// Saves the current state to `dir` under the store's current epoch.
    /// Writes in the fixed order tick data, quorum, transaction offsets,
    /// transaction blobs, metadata — metadata last so a snapshot that was
    /// interrupted partway through is detectable on the next load attempt.
    pub fn save_to_file(&self, dir: &CheckpointDir) -> CheckpointCode {
        let system = *self.system.lock();

        let tick_data_bytes = {
            let tick_data = self.tick_data.read();
            codec::encode_all(tick_data.all_slots())
        };

        let quorum_bytes = {
            let quorum = self.quorum.lock();
            let mut bytes = Vec::new();
            for computor in 0..quorum.number_of_computors() {
                bytes.extend(codec::encode_all(quorum.row_slots(computor)));
            }
            bytes
        };

        let (offsets_bytes, tx_bytes, next_offset) = {
            let transactions = self.transactions.lock();
            let offsets_bytes = codec::encode_u64_rows(transactions.1.all_slots());
            let next_offset = transactions.0.next_tick_transaction_offset();
            let tx_bytes = transactions.0.raw()[..next_offset as usize].to_vec();
            (offsets_bytes, tx_bytes, next_offset)
        };

        if checkpoint::save_large_file(dir, "snapshotTickdata", system.epoch, &tick_data_bytes).is_err() {
            return CheckpointCode::TickData;
        }
        if checkpoint::save_large_file(dir, "snapshotTicks", system.epoch, &quorum_bytes).is_err() {
            return CheckpointCode::Ticks;
        }
        if checkpoint::save_large_file(dir, "snapshotTickTransactionOffsets", system.epoch, &offsets_bytes).is_err() {
            return CheckpointCode::TransactionOffsets;
        }
        if checkpoint::save_large_file(dir, "snapshotTickTransaction", system.epoch, &tx_bytes).is_err() {
            return CheckpointCode::Transactions;
        }

        let metadata = CheckpointMetadata {
            epoch: system.epoch,
            tick_begin: system.tick_begin,
            tick_end: system.tick_end,
            out_total_transaction_size: tx_bytes.len() as i64,
            out_next_tick_transaction_offset: next_offset,
        };
        if checkpoint::save_large_file(dir, "snapshotMetadata", system.epoch, &metadata.encode()).is_err() {
            return CheckpointCode::Metadata;
        }

        CheckpointCode::Success
    }

    /// Loads previously saved state for `epoch` from `dir`. On any
    /// mismatch or I/O failure, metadata is reinitialized (the store keeps
    /// running with empty state) and a non-success code is returned.
    pub fn load_from_file(&self, dir: &CheckpointDir, epoch: u32) -> CheckpointCode {
        let metadata_bytes = match checkpoint::load_large_file(dir, "snapshotMetadata", epoch, CheckpointMetadata::ENCODED_LEN as u64) {
            Ok(bytes) => bytes,
            Err(_) => return self.fail_load(CheckpointCode::Metadata),
        };
        let Some(metadata) = CheckpointMetadata::decode(&metadata_bytes) else {
            return self.fail_load(CheckpointCode::Metadata);
        };
        if metadata.epoch != epoch || metadata.tick_begin > metadata.tick_end {
            return self.fail_load(CheckpointCode::Metadata);
        }
        if metadata.tick_end > metadata.tick_begin + self.config.max_ticks_per_epoch {
            return self.fail_load(CheckpointCode::Metadata);
        }
        {
            let system = self.system.lock();
            if metadata.tick_begin != system.tick_begin || metadata.epoch != system.epoch {
                drop(system);
                return self.fail_load(CheckpointCode::Metadata);
            }
        }

        let total_slots = self.config.total_tick_slots() as usize;

        let tick_data_bytes = match checkpoint::load_large_file(
            dir,
            "snapshotTickdata",
            epoch,
            (total_slots * TickData::ENCODED_LEN) as u64,
        ) {
            Ok(bytes) => bytes,
            Err(_) => return self.fail_load(CheckpointCode::TickData),
        };
        let Some(tick_data_slots) = codec::decode_all::<TickData>(&tick_data_bytes, total_slots) else {
            return self.fail_load(CheckpointCode::TickData);
        };

        let computors = self.config.number_of_computors as usize;
        let quorum_bytes = match checkpoint::load_large_file(
            dir,
            "snapshotTicks",
            epoch,
            (total_slots * computors * Tick::ENCODED_LEN) as u64,
        ) {
            Ok(bytes) => bytes,
            Err(_) => return self.fail_load(CheckpointCode::Ticks),
        };

        let offsets_bytes = match checkpoint::load_large_file(
            dir,
            "snapshotTickTransactionOffsets",
            epoch,
            (total_slots * self.config.transactions_per_tick as usize * 8) as u64,
        ) {
            Ok(bytes) => bytes,
            Err(_) => return self.fail_load(CheckpointCode::TransactionOffsets),
        };
        let Some(offset_rows) = codec::decode_u64_rows(&offsets_bytes, total_slots, self.config.transactions_per_tick as usize) else {
            return self.fail_load(CheckpointCode::TransactionOffsets);
        };

        let mut tx_bytes = match checkpoint::load_large_file(
            dir,
            "snapshotTickTransaction",
            epoch,
            metadata.out_next_tick_transaction_offset,
        ) {
            Ok(bytes) => bytes,
            Err(_) => return self.fail_load(CheckpointCode::Transactions),
        };
        tx_bytes.resize(self.config.tx_arena_size() as usize, 0);

        let mut quorum_rows = Vec::with_capacity(computors);
        for computor in 0..computors {
            let start = computor * total_slots * Tick::ENCODED_LEN;
            let end = start + total_slots * Tick::ENCODED_LEN;
            let Some(rows) = codec::decode_all::<Tick>(&quorum_bytes[start..end], total_slots) else {
                return self.fail_load(CheckpointCode::Ticks);
            };
            quorum_rows.push(rows);
        }

        {
            let mut tick_data = self.tick_data.write();
            let mut transactions = self.transactions.lock();
            let mut quorum = self.quorum.lock();
            let mut system = self.system.lock();

            tick_data.load_all_slots(tick_data_slots);
            transactions.1.load_all_slots(offset_rows);
            transactions.0.load_raw(tx_bytes, metadata.out_next_tick_transaction_offset);
            for (computor, rows) in quorum_rows.into_iter().enumerate() {
                quorum.load_row_slots(computor as u32, rows);
            }

            system.epoch = metadata.epoch;
            system.tick_begin = metadata.tick_begin;
            system.tick_end = metadata.tick_end;
            system.current_tick = metadata.tick_begin;
        }

        CheckpointCode::Success
    }

    fn fail_load(&self, code: CheckpointCode) -> CheckpointCode {
        let mut system = self.system.lock();
        *system = SystemWindow::default();
        code
    }
}
