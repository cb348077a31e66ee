//! Log record format
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE, whole record including this field)
//! +------------------+
//! | Op               | (u8: 0 = put, 1 = delete)
//! +------------------+
//! | Key              | (length-prefixed bytes)
//! +------------------+
//! | Value            | (length-prefixed bytes, empty for delete)
//! +------------------+
//! | Value Checksum   | (u32 LE, CRC32 of the value bytes)
//! +------------------+
//! | Record Checksum  | (u32 LE, CRC32 of every preceding byte)
//! +------------------+
//! ```
//!
//! The separate value checksum lets replay tell a damaged value (key still
//! trustworthy, entry kept and reported on read) from a damaged header or key
//! (entry dropped).

use std::io;

use super::checksum::{compute_checksum, verify_checksum};

/// Smallest possible record: length + op + two empty length prefixes + two checksums.
pub const MIN_RECORD_SIZE: usize = 4 + 1 + 4 + 4 + 4 + 4;

/// Operation carried by a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOp {
    Put,
    Delete,
}

impl RecordOp {
    fn as_u8(self) -> u8 {
        match self {
            RecordOp::Put => 0,
            RecordOp::Delete => 1,
        }
    }

    fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(RecordOp::Put),
            1 => Some(RecordOp::Delete),
            _ => None,
        }
    }
}

/// A single logged mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvRecord {
    pub op: RecordOp,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Integrity verdict for a decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordIntegrity {
    /// Record checksum matches
    Intact,
    /// Only the value bytes are damaged; the key can be trusted
    ValueDamaged { value_checksum: u32 },
    /// Header or key bytes are damaged; the record must be dropped
    HeaderDamaged,
}

/// Result of decoding one framed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecord {
    pub record: KvRecord,
    pub integrity: RecordIntegrity,
    /// Bytes consumed from the input
    pub len: usize,
}

impl KvRecord {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            op: RecordOp::Put,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        Self {
            op: RecordOp::Delete,
            key: key.into(),
            value: Vec::new(),
        }
    }

    /// Serialize the complete record.
    pub fn serialize(&self) -> Vec<u8> {
        let record_length = MIN_RECORD_SIZE + self.key.len() + self.value.len();

        let mut buf = Vec::with_capacity(record_length);
        buf.extend_from_slice(&(record_length as u32).to_le_bytes());
        buf.push(self.op.as_u8());
        buf.extend_from_slice(&(self.key.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&(self.value.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.value);
        buf.extend_from_slice(&compute_checksum(&self.value).to_le_bytes());

        let checksum = compute_checksum(&buf);
        buf.extend_from_slice(&checksum.to_le_bytes());
        buf
    }

    /// Decode one record from the front of `data`.
    ///
    /// Framing problems (short input, lengths that do not add up, unknown op)
    /// are errors: nothing after them can be located. Checksum mismatches are
    /// not errors; they are reported through [`RecordIntegrity`].
    pub fn decode(data: &[u8]) -> io::Result<DecodedRecord> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(invalid(io::ErrorKind::UnexpectedEof, "record too short"));
        }

        let record_length = read_u32(data, 0) as usize;
        if record_length < MIN_RECORD_SIZE {
            return Err(invalid(
                io::ErrorKind::InvalidData,
                format!("invalid record length {}", record_length),
            ));
        }
        if record_length > data.len() {
            return Err(invalid(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "record length {} exceeds available {} bytes",
                    record_length,
                    data.len()
                ),
            ));
        }
        let frame = &data[..record_length];

        let op = RecordOp::from_u8(frame[4])
            .ok_or_else(|| invalid(io::ErrorKind::InvalidData, "unknown record op"))?;

        let key_len = read_u32(frame, 5) as usize;
        let key_start = 9;
        let key_end = key_start + key_len;
        // key + value length prefix + both checksums must still fit
        if key_end + 12 > record_length {
            return Err(invalid(io::ErrorKind::InvalidData, "key length overruns record"));
        }

        let value_len = read_u32(frame, key_end) as usize;
        let value_start = key_end + 4;
        let value_end = value_start + value_len;
        if value_end + 8 != record_length {
            return Err(invalid(
                io::ErrorKind::InvalidData,
                "value length does not match record length",
            ));
        }

        let value_checksum = read_u32(frame, value_end);
        let record_checksum = read_u32(frame, value_end + 4);

        let record = KvRecord {
            op,
            key: frame[key_start..key_end].to_vec(),
            value: frame[value_start..value_end].to_vec(),
        };

        let integrity = if verify_checksum(&frame[..value_end + 4], record_checksum) {
            RecordIntegrity::Intact
        } else if op == RecordOp::Put && !verify_checksum(&record.value, value_checksum) {
            RecordIntegrity::ValueDamaged { value_checksum }
        } else {
            RecordIntegrity::HeaderDamaged
        };

        Ok(DecodedRecord {
            record,
            integrity,
            len: record_length,
        })
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn invalid(kind: io::ErrorKind, message: impl Into<String>) -> io::Error {
    io::Error::new(kind, message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_record_decodes_intact() {
        let record = KvRecord::put("analysis:a:1:x", "body");
        let bytes = record.serialize();
        let decoded = KvRecord::decode(&bytes).unwrap();

        assert_eq!(decoded.record, record);
        assert_eq!(decoded.integrity, RecordIntegrity::Intact);
        assert_eq!(decoded.len, bytes.len());
    }

    #[test]
    fn test_delete_record_has_empty_value() {
        let bytes = KvRecord::delete("k").serialize();
        assert_eq!(bytes.len(), MIN_RECORD_SIZE + 1);
        let decoded = KvRecord::decode(&bytes).unwrap();
        assert_eq!(decoded.record.op, RecordOp::Delete);
        assert!(decoded.record.value.is_empty());
    }

    #[test]
    fn test_damaged_value_is_distinguished_from_damaged_key() {
        let bytes = KvRecord::put("key", "value").serialize();

        // first value byte: 4 len + 1 op + 4 key_len + 3 key + 4 value_len
        let mut value_hit = bytes.clone();
        value_hit[16] ^= 0xFF;
        let decoded = KvRecord::decode(&value_hit).unwrap();
        assert!(matches!(decoded.integrity, RecordIntegrity::ValueDamaged { .. }));
        assert_eq!(decoded.record.key, b"key");

        let mut key_hit = bytes;
        key_hit[10] ^= 0xFF;
        let decoded = KvRecord::decode(&key_hit).unwrap();
        assert_eq!(decoded.integrity, RecordIntegrity::HeaderDamaged);
    }

    #[test]
    fn test_truncated_record_is_framing_error() {
        let bytes = KvRecord::put("key", "value").serialize();
        let err = KvRecord::decode(&bytes[..bytes.len() - 2]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_unknown_op_is_framing_error() {
        let mut bytes = KvRecord::put("key", "value").serialize();
        bytes[4] = 7;
        assert!(KvRecord::decode(&bytes).is_err());
    }
}
