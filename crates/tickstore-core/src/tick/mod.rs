//! The tick storage subsystem (`C1`–`C5`): tick metadata, quorum votes,
//! transaction blobs and their offset index, and epoch transition.

pub mod data;
pub mod epoch;
pub mod quorum;
pub mod transactions;

pub use data::{TickData, TickDataArena};
pub use epoch::{classify as classify_transition, TransitionCase};
pub use quorum::{QuorumArena, Tick};
pub use transactions::{Transaction, TransactionBlobArena, TransactionOffsetIndex, TRANSACTION_HEADER_LEN};
