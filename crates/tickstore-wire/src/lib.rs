//! # tickstore-wire
//!
//! Peer-facing byte layout for the tick storage and event log core.
//!
//! `tickstore-core` never encodes or decodes bytes itself — it exposes
//! plain Rust values. This crate is the only place that knows about
//! wire byte order and packing, mirroring the split between the core
//! logic and its C-ABI boundary elsewhere in this workspace.
//!
//! Every message provides `to_bytes`/`from_bytes` rather than a
//! `#[repr(C, packed)]` struct read through a raw pointer — packed-field
//! references are themselves easy to get wrong, and this crate has no
//! need for `unsafe` to avoid them.

#![deny(unsafe_code)]

pub mod request_log;
pub mod request_tx_log_info;
pub mod sink;

pub use request_log::{process_request_log, RequestLog};
pub use request_tx_log_info::{process_request_tx_log_info, RequestLogIdRangeFromTx, ResponseLogIdRangeFromTx};
pub use sink::ResponseSink;

/// Message type discriminants on the wire, matching the log subsystem's
/// own record type byte where the two overlap only by coincidence of
/// range — these are peer request/response types, not log record types.
pub const REQUEST_LOG: u8 = 44;
pub const RESPOND_LOG: u8 = 45;
pub const REQUEST_LOG_ID_RANGE_FROM_TX: u8 = 46;
pub const RESPONSE_LOG_ID_RANGE_FROM_TX: u8 = 47;
