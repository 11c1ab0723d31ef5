//! Commit log record format
//!
//! Every committed unit of work is framed as one record:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE)
//! +------------------+
//! | Entry Count      | (u32 LE)
//! +------------------+
//! | Entry*           | key (length-prefixed string)
//! |                  | version (u64 LE)
//! |                  | body (length-prefixed bytes)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! The CRC32 checksum covers all bytes except the checksum itself, so a torn
//! commit is rejected as a whole.

use std::io::{self, Read};

use crc32fast::Hasher;

/// Length prefix + entry count + checksum.
pub(crate) const MIN_RECORD_SIZE: usize = 4 + 4 + 4;

/// Computes a CRC32 (IEEE) checksum over the provided data.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// One key written by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    /// Record key
    pub key: String,
    /// Version the key holds after this commit
    pub version: u64,
    /// Whole record value
    pub body: Vec<u8>,
}

/// All writes of one commit, persisted atomically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitRecord {
    pub entries: Vec<CommitEntry>,
}

impl CommitRecord {
    pub fn new(entries: Vec<CommitEntry>) -> Self {
        Self { entries }
    }

    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());

        for entry in &self.entries {
            buf.extend_from_slice(&(entry.key.len() as u32).to_le_bytes());
            buf.extend_from_slice(entry.key.as_bytes());
            buf.extend_from_slice(&entry.version.to_le_bytes());
            buf.extend_from_slice(&(entry.body.len() as u32).to_le_bytes());
            buf.extend_from_slice(&entry.body);
        }

        buf
    }

    /// Serialize the complete record (length, body, checksum).
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let record_length = (4 + body.len() + 4) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserialize a record from bytes, verifying checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "Record too short"));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed_checksum = compute_checksum(&data[0..checksum_offset]);

        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        let count = read_u32(&mut cursor)? as usize;
        let mut entries = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let key_bytes = read_bytes(&mut cursor)?;
            let key = String::from_utf8(key_bytes).map_err(|e| {
                io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8 key: {}", e))
            })?;

            let mut version_buf = [0u8; 8];
            cursor.read_exact(&mut version_buf)?;
            let version = u64::from_le_bytes(version_buf);

            let body = read_bytes(&mut cursor)?;
            entries.push(CommitEntry { key, version, body });
        }

        Ok((Self { entries }, record_length))
    }
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_bytes<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let len = read_u32(reader)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}
