//! chatlab-inspector - Pause a workload, browse its records, resume by hand
//!
//! ```ignore
//! use std::sync::Arc;
//! use chatlab_inspector::inspector::Inspector;
//! use chatlab_inspector::storage::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! let writer = Arc::clone(&store);
//! Inspector::new(store).run(move || {
//!     writer.put("analysis:room-42:1700000000000000000:uuid-1234", "{}");
//! });
//! ```

pub mod cli;
pub mod inspector;
pub mod observability;
pub mod storage;
