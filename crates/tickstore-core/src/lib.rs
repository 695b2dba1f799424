//! # tickstore-core
//!
//! In-memory tick storage and event log core for a ledger node: fixed-
//! capacity arenas for tick metadata, quorum votes, and transaction
//! blobs; an append-only event log with id and transaction indices;
//! seamless epoch transition; and chunked checkpoint I/O.
//!
//! No `unsafe` code is permitted at the crate level — typed log messages
//! are framed by explicit field serialization rather than struct
//! transmutation.

#![deny(unsafe_code)]

pub mod arena;
pub mod checkpoint;
pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod log;
pub mod store;
pub mod tick;

pub use config::TickStoreConfig;
pub use error::{AppendError, CheckpointCode, InitError};
pub use log::{LogRangeResponse, LogTimestamp, Passcode, TxHash, PROTOCOL_TX_HASH};
pub use store::TickStore;
pub use tick::{Tick, TickData, Transaction, TransitionCase};
