//! Key-value storage browsed by the inspector
//!
//! The inspector reads any [`KvStore`]. Two are provided:
//!
//! - [`MemoryStore`]: volatile, for tests and benchmarks
//! - [`LogStore`]: append-only checksummed log on disk
//!
//! Both keep an ordered copy-on-write keyspace so a view is a cheap,
//! isolated snapshot that never blocks writers. Every value carries a CRC32
//! checksum verified on read; a mismatch fails that one entry only.

mod checksum;
mod errors;
mod keyspace;
mod log_store;
mod memory;
mod reader;
mod record;
mod view;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use keyspace::{Keyspace, KeyspaceSnapshot};
pub use log_store::{LogStore, ReplayStats, LOG_FILE_NAME};
pub use memory::MemoryStore;
pub use reader::LogReader;
pub use record::{DecodedRecord, KvRecord, RecordIntegrity, RecordOp, MIN_RECORD_SIZE};
pub use view::{KvStore, ReadView, ValueCell, ViewEntry};
