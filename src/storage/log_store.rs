//! Durable append-only store
//!
//! `<dir>/kv.log` holds every put and delete in order. Opening replays the
//! log into a [`Keyspace`]; latest record wins. Each append is synced before
//! the keyspace is updated.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::errors::{StorageError, StorageResult};
use super::keyspace::Keyspace;
use super::reader::LogReader;
use super::record::{KvRecord, RecordIntegrity, RecordOp};
use super::view::{KvStore, ReadView, ValueCell};
use crate::observability::{log_event_with_fields, Event, Logger};

/// File name of the log inside the store directory.
pub const LOG_FILE_NAME: &str = "kv.log";

/// Counters collected while replaying the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Records applied to the keyspace
    pub applied: usize,
    /// Records kept but whose value fails verification
    pub damaged_values: usize,
    /// Records dropped because their key could not be trusted
    pub dropped: usize,
    /// Bytes discarded from an unframeable tail
    pub truncated_bytes: u64,
}

/// Key-value store persisted as an append-only log.
#[derive(Debug)]
pub struct LogStore {
    path: PathBuf,
    file: Mutex<File>,
    keyspace: Keyspace,
    replay: ReplayStats,
}

impl LogStore {
    /// Opens or creates a store in `dir`, creating the directory if missing.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            StorageError::io_error(
                format!("Failed to create store directory: {}", dir.display()),
                e,
            )
        })?;

        let path = dir.join(LOG_FILE_NAME);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open log file: {}", path.display()),
                    e,
                )
            })?;

        let keyspace = Keyspace::new();
        let replay = Self::replay(&path, &keyspace)?;

        if replay.truncated_bytes > 0 {
            // Appending after garbage would hide every later record on the next replay.
            let valid_len = file
                .metadata()
                .map_err(|e| StorageError::io_error("Failed to read log metadata", e))?
                .len()
                - replay.truncated_bytes;
            file.set_len(valid_len).map_err(|e| {
                StorageError::write_failed("Failed to truncate damaged log tail", e)
            })?;
        }

        log_event_with_fields(
            Event::StoreOpened,
            &[
                ("path", path.display().to_string().as_str()),
                ("keys", keyspace.len().to_string().as_str()),
                ("damaged_values", replay.damaged_values.to_string().as_str()),
            ],
        );

        Ok(Self {
            path,
            file: Mutex::new(file),
            keyspace,
            replay,
        })
    }

    fn replay(path: &Path, keyspace: &Keyspace) -> StorageResult<ReplayStats> {
        let mut stats = ReplayStats::default();
        let mut reader = LogReader::open(path)?;

        loop {
            let offset = reader.current_offset();
            let decoded = match reader.read_next() {
                Ok(Some(decoded)) => decoded,
                Ok(None) => break,
                Err(e) => {
                    stats.truncated_bytes = reader.file_size() - offset;
                    log_event_with_fields(
                        Event::StoreTailTruncated,
                        &[
                            ("offset", offset.to_string().as_str()),
                            ("bytes", stats.truncated_bytes.to_string().as_str()),
                            ("reason", e.to_string().as_str()),
                        ],
                    );
                    break;
                }
            };

            let KvRecord { op, key, value } = decoded.record;
            match (decoded.integrity, op) {
                (RecordIntegrity::Intact, RecordOp::Put) => {
                    keyspace.insert(key, ValueCell::new(value));
                    stats.applied += 1;
                }
                (RecordIntegrity::Intact, RecordOp::Delete) => {
                    keyspace.remove(&key);
                    stats.applied += 1;
                }
                (RecordIntegrity::ValueDamaged { value_checksum }, _) => {
                    keyspace.insert(key, ValueCell::with_checksum(value, value_checksum));
                    stats.damaged_values += 1;
                }
                (RecordIntegrity::HeaderDamaged, _) => {
                    Logger::warn(
                        "STORE_RECORD_DROPPED",
                        &[("offset", offset.to_string().as_str())],
                    );
                    stats.dropped += 1;
                }
            }
        }

        Ok(stats)
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What happened while the log was replayed on open.
    pub fn replay_stats(&self) -> ReplayStats {
        self.replay
    }

    /// Durably write `key = value`.
    pub fn put(&self, key: impl AsRef<[u8]>, value: impl Into<Vec<u8>>) -> StorageResult<()> {
        let key = key.as_ref().to_vec();
        let value = value.into();
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        Self::append(&mut file, &KvRecord::put(key.clone(), value.clone()))?;
        self.keyspace.insert(key, ValueCell::new(value));
        Ok(())
    }

    /// Durably remove `key`. Returns whether it existed.
    pub fn delete(&self, key: impl AsRef<[u8]>) -> StorageResult<bool> {
        let key = key.as_ref();
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if self.keyspace.get(key).is_none() {
            return Ok(false);
        }
        Self::append(&mut file, &KvRecord::delete(key))?;
        Ok(self.keyspace.remove(key))
    }

    /// Read back a value, verifying its checksum
    pub fn get(&self, key: impl AsRef<[u8]>) -> StorageResult<Option<Vec<u8>>> {
        let key = key.as_ref();
        match self.keyspace.get(key) {
            Some(cell) => Ok(Some(cell.verified(key)?.to_vec())),
            None => Ok(None),
        }
    }

    pub fn len(&self) -> usize {
        self.keyspace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyspace.is_empty()
    }

    fn append(file: &mut File, record: &KvRecord) -> StorageResult<()> {
        append_or_rollback(file, &record.serialize(), |file, bytes| {
            file.write_all(bytes)
                .map_err(|e| StorageError::write_failed("Failed to append log record", e))?;
            file.sync_data()
                .map_err(|e| StorageError::write_failed("Failed to sync log file", e))
        })
    }
}

/// Run `write` and, if it fails, cut the file back to where it ended before.
///
/// A partial record left behind would be framed together with the next
/// append on replay, hiding every record after it.
fn append_or_rollback<F>(file: &mut File, bytes: &[u8], write: F) -> StorageResult<()>
where
    F: FnOnce(&mut File, &[u8]) -> StorageResult<()>,
{
    let valid_len = file
        .metadata()
        .map_err(|e| StorageError::io_error("Failed to read log metadata", e))?
        .len();

    let result = write(file, bytes);
    if result.is_err() {
        if let Err(e) = file.set_len(valid_len) {
            Logger::error(
                "STORE_ROLLBACK_FAILED",
                &[
                    ("len", valid_len.to_string().as_str()),
                    ("error", e.to_string().as_str()),
                ],
            );
        }
    }
    result
}

impl KvStore for LogStore {
    fn view(&self) -> StorageResult<Box<dyn ReadView>> {
        Ok(Box::new(self.keyspace.snapshot()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/store");
        let store = LogStore::open(&dir).unwrap();
        assert!(store.path().exists());
        assert!(store.is_empty());
    }

    #[test]
    fn test_reopen_replays_latest_state() {
        let temp = TempDir::new().unwrap();
        {
            let store = LogStore::open(temp.path()).unwrap();
            store.put("a:1", "first").unwrap();
            store.put("a:1", "second").unwrap();
            store.put("a:2", "gone").unwrap();
            assert!(store.delete("a:2").unwrap());
            assert!(!store.delete("a:3").unwrap());
        }

        let store = LogStore::open(temp.path()).unwrap();
        assert_eq!(store.get("a:1").unwrap(), Some(b"second".to_vec()));
        assert_eq!(store.get("a:2").unwrap(), None);
        assert_eq!(store.len(), 1);
        assert_eq!(store.replay_stats().applied, 4);
    }

    #[test]
    fn test_failed_append_leaves_no_partial_record() {
        let temp = TempDir::new().unwrap();
        {
            let store = LogStore::open(temp.path()).unwrap();
            store.put("k:1", "one").unwrap();

            let clean_len = std::fs::metadata(store.path()).unwrap().len();
            let torn = KvRecord::put(b"k:2".to_vec(), b"two".to_vec()).serialize();
            let mut file = store.file.lock().unwrap();
            let result = append_or_rollback(&mut *file, &torn, |file, bytes| {
                file.write_all(&bytes[..bytes.len() / 2]).unwrap();
                Err(StorageError::write_failed(
                    "Failed to append log record",
                    std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                ))
            });
            drop(file);

            assert!(result.is_err());
            assert_eq!(std::fs::metadata(store.path()).unwrap().len(), clean_len);
            store.put("k:3", "three").unwrap();
        }

        let store = LogStore::open(temp.path()).unwrap();
        let stats = store.replay_stats();
        assert_eq!(stats.applied, 2);
        assert_eq!(stats.dropped, 0);
        assert_eq!(stats.truncated_bytes, 0);
        assert_eq!(store.get("k:1").unwrap(), Some(b"one".to_vec()));
        assert_eq!(store.get("k:3").unwrap(), Some(b"three".to_vec()));
    }
}
