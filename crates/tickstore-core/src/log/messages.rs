//! Typed log message payloads and the discriminants used to frame them.
//!
//! Each payload type logs only a prefix of its fields; the sentinel the
//! original marks as `_terminator` becomes, in safe Rust, an explicit
//! `to_log_bytes` that serializes exactly the fields meant to be logged
//! and stops there. This sidesteps reading struct layout through a raw
//! pointer (which would require `unsafe`) while preserving the same
//! "payload is everything before the sentinel" contract.

/// Log record type discriminants (`size_and_type`'s high byte).
pub const QU_TRANSFER: u8 = 0;
pub const ASSET_ISSUANCE: u8 = 1;
pub const ASSET_OWNERSHIP_CHANGE: u8 = 2;
pub const ASSET_POSSESSION_CHANGE: u8 = 3;
pub const CONTRACT_ERROR: u8 = 4;
pub const CONTRACT_WARNING: u8 = 5;
pub const CONTRACT_INFO: u8 = 6;
pub const CONTRACT_DEBUG: u8 = 7;
pub const BURNING: u8 = 8;
pub const CUSTOM: u8 = 255;

/// A value that can be framed into the log buffer.
pub trait LoggableMessage {
    /// The `size_and_type` discriminant this message frames under.
    const MESSAGE_TYPE: u8;

    /// The bytes to store as the record's payload — everything logged,
    /// nothing more.
    fn to_log_bytes(&self) -> Vec<u8>;
}

/// A message whose first four bytes are a contract index filled in by the
/// writer immediately before framing and zeroed again immediately after,
/// regardless of which `log-*` feature is compiled in. Preserving this
/// fill-then-zero step keeps caller-visible state identical across build
/// configurations.
pub trait ContractLoggable: LoggableMessage {
    fn set_contract_index(&mut self, index: u32);
    fn clear_contract_index(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuTransfer {
    pub source_public_key: [u8; 32],
    pub destination_public_key: [u8; 32],
    pub amount: i64,
}

impl LoggableMessage for QuTransfer {
    const MESSAGE_TYPE: u8 = QU_TRANSFER;

    fn to_log_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(72);
        out.extend_from_slice(&self.source_public_key);
        out.extend_from_slice(&self.destination_public_key);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetIssuance {
    pub issuer_public_key: [u8; 32],
    pub name: [u8; 8],
    pub number_of_decimal_places: i8,
    pub unit_of_measurement: [u8; 8],
    pub number_of_shares: i64,
}

impl LoggableMessage for AssetIssuance {
    const MESSAGE_TYPE: u8 = ASSET_ISSUANCE;

    fn to_log_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(57);
        out.extend_from_slice(&self.issuer_public_key);
        out.extend_from_slice(&self.name);
        out.push(self.number_of_decimal_places as u8);
        out.extend_from_slice(&self.unit_of_measurement);
        out.extend_from_slice(&self.number_of_shares.to_le_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetOwnershipChange {
    pub source_public_key: [u8; 32],
    pub destination_public_key: [u8; 32],
    pub issuer_public_key: [u8; 32],
    pub name: [u8; 8],
    pub number_of_decimal_places: i8,
    pub unit_of_measurement: [u8; 8],
    pub number_of_shares: i64,
}

impl LoggableMessage for AssetOwnershipChange {
    const MESSAGE_TYPE: u8 = ASSET_OWNERSHIP_CHANGE;

    fn to_log_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(121);
        out.extend_from_slice(&self.source_public_key);
        out.extend_from_slice(&self.destination_public_key);
        out.extend_from_slice(&self.issuer_public_key);
        out.extend_from_slice(&self.name);
        out.push(self.number_of_decimal_places as u8);
        out.extend_from_slice(&self.unit_of_measurement);
        out.extend_from_slice(&self.number_of_shares.to_le_bytes());
        out
    }
}

/// Identical layout to [`AssetOwnershipChange`]; kept as a distinct type
/// because it frames under a distinct message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetPossessionChange {
    pub source_public_key: [u8; 32],
    pub destination_public_key: [u8; 32],
    pub issuer_public_key: [u8; 32],
    pub name: [u8; 8],
    pub number_of_decimal_places: i8,
    pub unit_of_measurement: [u8; 8],
    pub number_of_shares: i64,
}

impl LoggableMessage for AssetPossessionChange {
    const MESSAGE_TYPE: u8 = ASSET_POSSESSION_CHANGE;

    fn to_log_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(121);
        out.extend_from_slice(&self.source_public_key);
        out.extend_from_slice(&self.destination_public_key);
        out.extend_from_slice(&self.issuer_public_key);
        out.extend_from_slice(&self.name);
        out.push(self.number_of_decimal_places as u8);
        out.extend_from_slice(&self.unit_of_measurement);
        out.extend_from_slice(&self.number_of_shares.to_le_bytes());
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burning {
    pub source_public_key: [u8; 32],
    pub amount: i64,
}

impl LoggableMessage for Burning {
    const MESSAGE_TYPE: u8 = BURNING;

    fn to_log_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(40);
        out.extend_from_slice(&self.source_public_key);
        out.extend_from_slice(&self.amount.to_le_bytes());
        out
    }
}

macro_rules! contract_message {
    ($name:ident, $message_type:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            contract_index: u32,
            pub payload: Vec<u8>,
        }

        impl $name {
            #[must_use]
            pub fn new(payload: Vec<u8>) -> Self {
                Self {
                    contract_index: 0,
                    payload,
                }
            }
        }

        impl LoggableMessage for $name {
            const MESSAGE_TYPE: u8 = $message_type;

            fn to_log_bytes(&self) -> Vec<u8> {
                let mut out = Vec::with_capacity(4 + self.payload.len());
                out.extend_from_slice(&self.contract_index.to_le_bytes());
                out.extend_from_slice(&self.payload);
                out
            }
        }

        impl ContractLoggable for $name {
            fn set_contract_index(&mut self, index: u32) {
                self.contract_index = index;
            }

            fn clear_contract_index(&mut self) {
                self.contract_index = 0;
            }
        }
    };
}

contract_message!(
    DummyContractErrorMessage,
    CONTRACT_ERROR,
    "A contract-raised error, tagged with the acting contract's index."
);
contract_message!(
    DummyContractWarningMessage,
    CONTRACT_WARNING,
    "A contract-raised warning, tagged with the acting contract's index."
);
contract_message!(
    DummyContractInfoMessage,
    CONTRACT_INFO,
    "A contract-raised informational message, tagged with the acting contract's index."
);
contract_message!(
    DummyContractDebugMessage,
    CONTRACT_DEBUG,
    "A contract-raised debug message, tagged with the acting contract's index."
);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DummyCustomMessage {
    pub type_tag: u64,
    pub payload: Vec<u8>,
}

impl LoggableMessage for DummyCustomMessage {
    const MESSAGE_TYPE: u8 = CUSTOM;

    fn to_log_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.payload.len());
        bytes.extend_from_slice(&self.type_tag.to_le_bytes());
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}
