//! Error types for the fallible boundaries of the store.
//!
//! Lookups and range queries are not modeled as `Result` — the original
//! design treats "not found" and "stale" as ordinary data (`None`, or a
//! `(-1, -1)` pair over the wire), not exceptional control flow. Only the
//! two boundaries below can fail in a way that needs a `Display`able
//! reason attached.

/// Failure during store construction.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The host allocator could not satisfy a pre-sized arena request.
    #[error("failed to allocate {bytes} bytes for {arena}")]
    Alloc {
        arena: &'static str,
        bytes: u64,
    },
}

/// Failure appending to the log ring buffer.
#[derive(Debug, thiserror::Error)]
pub enum AppendError {
    /// The payload is larger than fits in a single framed record.
    #[error("payload of {0} bytes exceeds the maximum loggable message size")]
    PayloadTooLarge(usize),
}

/// Outcome of a checkpoint save or load, mirroring the original's
/// non-zero-on-failure return code convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointCode {
    /// Operation completed successfully.
    Success,
    /// Metadata file failed validation or I/O.
    Metadata,
    /// Transaction blob file failed validation or I/O.
    Transactions,
    /// Transaction offset file failed validation or I/O.
    TransactionOffsets,
    /// Tick vote file failed validation or I/O.
    Ticks,
    /// Tick data file failed validation or I/O.
    TickData,
    /// Save was skipped: nothing has changed since the last save.
    NothingToSave,
}

impl CheckpointCode {
    /// Numeric return code matching the original's 0..6 convention.
    #[must_use]
    pub const fn as_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Metadata => 1,
            Self::Transactions => 2,
            Self::TransactionOffsets => 3,
            Self::Ticks => 4,
            Self::TickData => 5,
            Self::NothingToSave => 6,
        }
    }

    /// Whether this code represents a successful outcome.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Success | Self::NothingToSave)
    }
}
