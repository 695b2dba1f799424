//! The log ring buffer (`B1`): an append-only, wrap-around byte region
//! holding framed event records.

/// Size of a framed record's header, before its variable-length payload.
pub const LOG_RECORD_HEADER_LEN: u32 = 24;

/// Wall-clock reading stamped into a log record header. The buffer has no
/// opinion on where this comes from; callers of [`LogBuffer::append`]
/// supply it, keeping the wall-clock source an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogTimestamp {
    /// Calendar year minus 2000.
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Decoded view of a record header, independent of wire byte order —
/// encoding to bytes is the concern of `tickstore-wire`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogHeader {
    pub timestamp: LogTimestamp,
    pub epoch: u16,
    pub tick: u32,
    pub message_type: u8,
    pub message_size: u32,
    pub log_id: u64,
}

impl LogHeader {
    fn write_to(self, out: &mut [u8]) {
        debug_assert!(out.len() >= LOG_RECORD_HEADER_LEN as usize);
        out[0] = self.timestamp.year;
        out[1] = self.timestamp.month;
        out[2] = self.timestamp.day;
        out[3] = self.timestamp.hour;
        out[4] = self.timestamp.minute;
        out[5] = self.timestamp.second;
        out[6..8].copy_from_slice(&self.epoch.to_le_bytes());
        out[8..12].copy_from_slice(&self.tick.to_le_bytes());
        let size_and_type = (self.message_size & 0x00FF_FFFF) | (u32::from(self.message_type) << 24);
        out[12..16].copy_from_slice(&size_and_type.to_le_bytes());
        out[16..24].copy_from_slice(&self.log_id.to_le_bytes());
    }

    fn read_from(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= LOG_RECORD_HEADER_LEN as usize);
        let size_and_type = u32::from_le_bytes(buf[12..16].try_into().unwrap());
        Self {
            timestamp: LogTimestamp {
                year: buf[0],
                month: buf[1],
                day: buf[2],
                hour: buf[3],
                minute: buf[4],
                second: buf[5],
            },
            epoch: u16::from_le_bytes(buf[6..8].try_into().unwrap()),
            tick: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            message_type: (size_and_type >> 24) as u8,
            message_size: size_and_type & 0x00FF_FFFF,
            log_id: u64::from_le_bytes(buf[16..24].try_into().unwrap()),
        }
    }

    fn log_id_at(buf: &[u8]) -> u64 {
        u64::from_le_bytes(buf[16..24].try_into().unwrap())
    }
}

/// The append-only ring of framed log records.
pub struct LogBuffer {
    data: Vec<u8>,
    tail: u64,
    next_log_id: u64,
}

impl LogBuffer {
    /// Allocates a zero-filled buffer of `capacity` bytes.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            data: vec![0u8; capacity as usize],
            tail: 0,
            next_log_id: 0,
        }
    }

    /// Resets the buffer to empty, restarting log ids from zero. Called at
    /// epoch cold start.
    pub fn reset(&mut self) {
        self.tail = 0;
        self.next_log_id = 0;
    }

    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.data.len() as u64
    }

    #[must_use]
    pub fn next_log_id(&self) -> u64 {
        self.next_log_id
    }

    #[must_use]
    pub fn tail(&self) -> u64 {
        self.tail
    }

    /// Appends a framed record and returns its assigned log id.
    ///
    /// Wraps to the start of the buffer when the record would not
    /// otherwise fit before the end, overwriting whatever was previously
    /// stored there. Old records lost to a wrap are not erased, only
    /// orphaned: the id index detects them as stale by re-reading the
    /// header at the slot they used to occupy.
    pub fn append(
        &mut self,
        timestamp: LogTimestamp,
        epoch: u16,
        tick: u32,
        message_type: u8,
        payload: &[u8],
    ) -> Result<u64, crate::error::AppendError> {
        let message_size = u32::try_from(payload.len())
            .map_err(|_| crate::error::AppendError::PayloadTooLarge(payload.len()))?;
        if message_size > 0x00FF_FFFF {
            return Err(crate::error::AppendError::PayloadTooLarge(payload.len()));
        }
        let record_len = u64::from(LOG_RECORD_HEADER_LEN) + u64::from(message_size);
        if record_len > self.capacity() {
            return Err(crate::error::AppendError::PayloadTooLarge(payload.len()));
        }

        if self.tail + record_len > self.capacity() {
            self.tail = 0;
        }

        let log_id = self.next_log_id;
        let start = self.tail as usize;
        let header = LogHeader {
            timestamp,
            epoch,
            tick,
            message_type,
            message_size,
            log_id,
        };
        header.write_to(&mut self.data[start..start + LOG_RECORD_HEADER_LEN as usize]);
        let payload_start = start + LOG_RECORD_HEADER_LEN as usize;
        self.data[payload_start..payload_start + payload.len()].copy_from_slice(payload);

        self.tail += record_len;
        self.next_log_id += 1;
        Ok(log_id)
    }

    /// Reads the header stored at `offset`, for id-index validation and
    /// for range queries.
    fn header_at(&self, offset: u64) -> LogHeader {
        let start = offset as usize;
        LogHeader::read_from(&self.data[start..start + LOG_RECORD_HEADER_LEN as usize])
    }

    /// The log id recorded in the header at `offset`, without decoding the
    /// rest of the header. Used by the id index's cheap validity check.
    fn log_id_at(&self, offset: u64) -> u64 {
        LogHeader::log_id_at(&self.data[offset as usize..])
    }

    /// Total on-buffer length (header + payload) of the record at `offset`.
    fn record_len_at(&self, offset: u64) -> u64 {
        u64::from(LOG_RECORD_HEADER_LEN) + u64::from(self.header_at(offset).message_size)
    }

    /// Raw bytes of the half-open byte range `[start, end)`.
    fn slice(&self, start: u64, end: u64) -> &[u8] {
        &self.data[start as usize..end as usize]
    }
}

pub(crate) use sealed::BufferAccess;

mod sealed {
    use super::LogBuffer;

    /// Accessors shared between the id index and the request handler that
    /// should not be part of `LogBuffer`'s public surface.
    pub trait BufferAccess {
        fn log_id_at(&self, offset: u64) -> u64;
        fn record_len_at(&self, offset: u64) -> u64;
        fn slice(&self, start: u64, end: u64) -> &[u8];
    }

    impl BufferAccess for LogBuffer {
        fn log_id_at(&self, offset: u64) -> u64 {
            LogBuffer::log_id_at(self, offset)
        }

        fn record_len_at(&self, offset: u64) -> u64 {
            LogBuffer::record_len_at(self, offset)
        }

        fn slice(&self, start: u64, end: u64) -> &[u8] {
            LogBuffer::slice(self, start, end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> LogTimestamp {
        LogTimestamp {
            year: 25,
            month: 7,
            day: 27,
            hour: 10,
            minute: 0,
            second: 0,
        }
    }

    #[test]
    fn append_assigns_monotonic_ids() {
        let mut buf = LogBuffer::new(4096);
        let a = buf.append(ts(), 1, 0, 0, b"alpha").unwrap();
        let b = buf.append(ts(), 1, 0, 0, b"beta").unwrap();
        let c = buf.append(ts(), 1, 0, 0, b"gamma").unwrap();
        assert_eq!((a, b, c), (0, 1, 2));
    }

    #[test]
    fn reset_restarts_ids_from_zero() {
        let mut buf = LogBuffer::new(4096);
        buf.append(ts(), 1, 0, 0, b"alpha").unwrap();
        buf.reset();
        let id = buf.append(ts(), 1, 0, 0, b"beta").unwrap();
        assert_eq!(id, 0);
        assert_eq!(buf.tail(), 0);
    }

    #[test]
    fn record_that_does_not_fit_before_the_end_wraps() {
        let mut buf = LogBuffer::new(64);
        // First record takes 24 + 30 = 54 bytes, leaving 10 before the end.
        buf.append(ts(), 1, 0, 0, &[0u8; 30]).unwrap();
        assert_eq!(buf.tail(), 54);
        // A 20-byte payload needs 44 bytes total, which does not fit in the
        // remaining 10: it must wrap to offset 0, not overwrite in place.
        buf.append(ts(), 1, 0, 0, &[0u8; 20]).unwrap();
        assert_eq!(buf.tail(), 44);
    }

    #[test]
    fn header_round_trips_through_append() {
        let mut buf = LogBuffer::new(4096);
        buf.append(ts(), 7, 42, 3, b"payload").unwrap();
        let header = buf.header_at(0);
        assert_eq!(header.epoch, 7);
        assert_eq!(header.tick, 42);
        assert_eq!(header.message_type, 3);
        assert_eq!(header.message_size, 7);
        assert_eq!(header.log_id, 0);
    }

    #[test]
    fn payload_over_24_bit_size_is_rejected() {
        let mut buf = LogBuffer::new(32 * 1024 * 1024);
        let oversized = vec![0u8; 0x0100_0000];
        assert!(buf.append(ts(), 1, 0, 0, &oversized).is_err());
    }
}
