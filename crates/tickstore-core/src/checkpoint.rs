//! Chunked checkpoint I/O (`C6`): resumable, idempotent save/load of the
//! tick storage arenas plus a metadata descriptor.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Chunk size used for files that exceed it. Chosen to stay well under
/// typical filesystem and transfer limits for a single write.
pub const CHUNK_SIZE: u64 = 209_715_200;

/// Where checkpoint files are read from and written to.
#[derive(Debug, Clone)]
pub struct CheckpointDir(PathBuf);

impl CheckpointDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    fn file_path(&self, stem: &str, epoch: u32, chunk_id: Option<usize>) -> PathBuf {
        match chunk_id {
            Some(id) => self.0.join(format!("{stem}.{epoch}.{id}")),
            None => self.0.join(format!("{stem}.{epoch}")),
        }
    }
}

/// Metadata persisted alongside the arenas: the window they cover and the
/// extent of the transaction blob region that was actually saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointMetadata {
    pub epoch: u32,
    pub tick_begin: u32,
    pub tick_end: u32,
    pub out_total_transaction_size: i64,
    pub out_next_tick_transaction_offset: u64,
}

impl CheckpointMetadata {
    pub const ENCODED_LEN: usize = 28;

    #[must_use]
    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0..4].copy_from_slice(&self.epoch.to_le_bytes());
        out[4..8].copy_from_slice(&self.tick_begin.to_le_bytes());
        out[8..12].copy_from_slice(&self.tick_end.to_le_bytes());
        out[12..20].copy_from_slice(&self.out_total_transaction_size.to_le_bytes());
        out[20..28].copy_from_slice(&self.out_next_tick_transaction_offset.to_le_bytes());
        out
    }

    #[must_use]
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::ENCODED_LEN {
            return None;
        }
        Some(Self {
            epoch: u32::from_le_bytes(buf[0..4].try_into().ok()?),
            tick_begin: u32::from_le_bytes(buf[4..8].try_into().ok()?),
            tick_end: u32::from_le_bytes(buf[8..12].try_into().ok()?),
            out_total_transaction_size: i64::from_le_bytes(buf[12..20].try_into().ok()?),
            out_next_tick_transaction_offset: u64::from_le_bytes(buf[20..28].try_into().ok()?),
        })
    }
}

fn chunk_sizes(total: u64) -> Vec<u64> {
    if total <= CHUNK_SIZE {
        return vec![total];
    }
    let mut sizes = Vec::new();
    let mut remaining = total;
    while remaining > 0 {
        let this = remaining.min(CHUNK_SIZE);
        sizes.push(this);
        remaining -= this;
    }
    sizes
}

/// Saves `data` under `stem`, splitting across [`CHUNK_SIZE`]-byte chunk
/// files when needed. A chunk whose file already exists at the exact
/// expected size is left untouched, so a save that was interrupted and
/// retried does not rewrite chunks it already finished.
pub fn save_large_file(dir: &CheckpointDir, stem: &str, epoch: u32, data: &[u8]) -> io::Result<()> {
    let sizes = chunk_sizes(data.len() as u64);
    let chunked = sizes.len() > 1;
    let mut offset = 0usize;
    for (index, size) in sizes.iter().enumerate() {
        let chunk_id = chunked.then_some(index);
        let path = dir.file_path(stem, epoch, chunk_id);
        let size = *size as usize;
        let slice = &data[offset..offset + size];
        if let Ok(existing) = fs::metadata(&path) {
            if existing.len() == size as u64 {
                offset += size;
                continue;
            }
        }
        write_file(&path, slice)?;
        offset += size;
    }
    Ok(())
}

fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)
}

/// Loads a file previously written by [`save_large_file`]. `expected_len`
/// must match the total byte length that was saved; any chunk whose size
/// does not match its expected slice is treated as a load failure.
pub fn load_large_file(dir: &CheckpointDir, stem: &str, epoch: u32, expected_len: u64) -> io::Result<Vec<u8>> {
    let sizes = chunk_sizes(expected_len);
    let chunked = sizes.len() > 1;
    let mut out = Vec::with_capacity(expected_len as usize);
    for (index, size) in sizes.iter().enumerate() {
        let chunk_id = chunked.then_some(index);
        let path = dir.file_path(stem, epoch, chunk_id);
        let bytes = fs::read(&path)?;
        if bytes.len() as u64 != *size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} is {} bytes, expected {}", path.display(), bytes.len(), size),
            ));
        }
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_round_trips() {
        let meta = CheckpointMetadata {
            epoch: 3,
            tick_begin: 100,
            tick_end: 116,
            out_total_transaction_size: 4096,
            out_next_tick_transaction_offset: 1 << 20,
        };
        assert_eq!(CheckpointMetadata::decode(&meta.encode()), Some(meta));
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("tickstore-core-test-scratch")
            .join(format!("{name}-{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = scratch_dir("round-trip");
        let dir = CheckpointDir::new(&tmp);
        let data: Vec<u8> = (0..1000u32).map(|b| (b % 251) as u8).collect();
        save_large_file(&dir, "snapshotTickdata", 7, &data).unwrap();
        let loaded = load_large_file(&dir, "snapshotTickdata", 7, data.len() as u64).unwrap();
        assert_eq!(loaded, data);
        std::fs::remove_dir_all(&tmp).ok();
    }

    #[test]
    fn resumed_save_skips_a_chunk_that_already_matches() {
        let tmp = scratch_dir("resume");
        let dir = CheckpointDir::new(&tmp);
        let data = vec![7u8; 64];
        save_large_file(&dir, "snapshotMetadata", 1, &data).unwrap();
        let path = dir.file_path("snapshotMetadata", 1, None);
        let written_at = std::fs::metadata(&path).unwrap().modified().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        save_large_file(&dir, "snapshotMetadata", 1, &data).unwrap();
        let rewritten_at = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(written_at, rewritten_at);
        std::fs::remove_dir_all(&tmp).ok();
    }
}
