//! The event log subsystem (`B1`–`B4`): an append-only ring of framed
//! records, two read indices over it, and the query surface peers use to
//! fetch ranges of it.

pub mod buffer;
pub mod handler;
pub mod index;
pub mod messages;
pub mod tx_index;

pub use buffer::LogTimestamp;
pub use handler::{LogEngine, LogRangeResponse, Passcode};
pub use tx_index::{TxHash, PROTOCOL_TX_HASH};
