//! Fixed-size, little-endian, packed encodings for the records checkpoint
//! files hold. Distinct from `tickstore-wire`, which encodes the
//! peer-facing request/response messages: this module only ever touches
//! disk, never the network.

use crate::tick::{Tick, TickData};

/// A record with a constant on-disk size and no padding between fields.
pub trait FixedRecord: Sized {
    const ENCODED_LEN: usize;

    fn encode(&self, out: &mut [u8]);
    fn decode(buf: &[u8]) -> Self;
}

impl FixedRecord for TickData {
    const ENCODED_LEN: usize = 48;

    fn encode(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.epoch.to_le_bytes());
        out[4..8].copy_from_slice(&self.tick.to_le_bytes());
        out[8..16].copy_from_slice(&self.timestamp_millis.to_le_bytes());
        out[16..48].copy_from_slice(&self.content_digest);
    }

    fn decode(buf: &[u8]) -> Self {
        let mut content_digest = [0u8; 32];
        content_digest.copy_from_slice(&buf[16..48]);
        Self {
            epoch: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            tick: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            timestamp_millis: u64::from_le_bytes(buf[8..16].try_into().unwrap()),
            content_digest,
        }
    }
}

impl FixedRecord for Tick {
    const ENCODED_LEN: usize = 44;

    fn encode(&self, out: &mut [u8]) {
        out[0..4].copy_from_slice(&self.epoch.to_le_bytes());
        out[4..8].copy_from_slice(&self.tick.to_le_bytes());
        out[8..12].copy_from_slice(&self.computor_index.to_le_bytes());
        out[12..44].copy_from_slice(&self.content_digest);
    }

    fn decode(buf: &[u8]) -> Self {
        let mut content_digest = [0u8; 32];
        content_digest.copy_from_slice(&buf[12..44]);
        Self {
            epoch: u32::from_le_bytes(buf[0..4].try_into().unwrap()),
            tick: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            computor_index: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            content_digest,
        }
    }
}

/// Encodes a slice of fixed-size records back to back.
pub fn encode_all<T: FixedRecord>(records: &[T]) -> Vec<u8> {
    let mut out = vec![0u8; records.len() * T::ENCODED_LEN];
    for (i, record) in records.iter().enumerate() {
        let start = i * T::ENCODED_LEN;
        record.encode(&mut out[start..start + T::ENCODED_LEN]);
    }
    out
}

/// Decodes `count` fixed-size records from the front of `buf`.
#[must_use]
pub fn decode_all<T: FixedRecord>(buf: &[u8], count: usize) -> Option<Vec<T>> {
    if buf.len() < count * T::ENCODED_LEN {
        return None;
    }
    Some(
        (0..count)
            .map(|i| {
                let start = i * T::ENCODED_LEN;
                T::decode(&buf[start..start + T::ENCODED_LEN])
            })
            .collect(),
    )
}

/// Encodes a fixed-width row of `u64` offsets (a `C4` tick's slots) as
/// little-endian bytes.
#[must_use]
pub fn encode_u64_rows(rows: &[Vec<u64>]) -> Vec<u8> {
    let mut out = Vec::new();
    for row in rows {
        for value in row {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
    out
}

/// Decodes `row_count` rows of `row_width` little-endian `u64`s each.
#[must_use]
pub fn decode_u64_rows(buf: &[u8], row_count: usize, row_width: usize) -> Option<Vec<Vec<u64>>> {
    if buf.len() < row_count * row_width * 8 {
        return None;
    }
    let mut out = Vec::with_capacity(row_count);
    let mut cursor = 0usize;
    for _ in 0..row_count {
        let mut row = Vec::with_capacity(row_width);
        for _ in 0..row_width {
            row.push(u64::from_le_bytes(buf[cursor..cursor + 8].try_into().unwrap()));
            cursor += 8;
        }
        out.push(row);
    }
    Some(out)
}
