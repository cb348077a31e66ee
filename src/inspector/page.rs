//! Prefix scan producing one page of display records

use serde::Serialize;

use super::mapper::{DisplayRecord, RowMapper};
use crate::observability::{log_event_with_fields, Event};
use crate::storage::KvStore;

/// Rendering context for one request: the active prefix and its records in
/// scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub prefix: String,
    pub items: Vec<DisplayRecord>,
}

impl PageView {
    /// A page with no records.
    pub fn empty(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            items: Vec::new(),
        }
    }

    /// Scan `store` for keys starting with `prefix` inside one read-only view.
    ///
    /// A view that cannot be opened yields an empty page; an entry whose
    /// value cannot be read is skipped. Both are logged, neither fails.
    pub fn scan(store: &dyn KvStore, prefix: &str, mapper: &dyn RowMapper) -> Self {
        let mut page = Self::empty(prefix);

        let view = match store.view() {
            Ok(view) => view,
            Err(e) => {
                log_event_with_fields(
                    Event::InspectScanFailed,
                    &[("prefix", prefix), ("error", e.to_string().as_str())],
                );
                return page;
            }
        };

        for entry in view.scan_prefix(prefix.as_bytes()) {
            let key = String::from_utf8_lossy(entry.key());
            match entry.value() {
                Ok(value) => page.items.push(mapper.map(&key, value)),
                Err(e) => log_event_with_fields(
                    Event::InspectEntrySkipped,
                    &[("key", key.as_ref()), ("error", e.to_string().as_str())],
                ),
            }
        }

        page
    }
}
