//! Row mapping: raw key + value bytes to a display record
//!
//! The inspector knows nothing about what the workload stores. A
//! [`RowMapper`] turns each entry into the seven display columns; callers
//! with structured payloads plug in their own. Mapping never fails: anything
//! that cannot be parsed keeps its placeholder.

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

pub const KIND_RAW: &str = "RAW";
pub const TIMESTAMP_PLACEHOLDER: &str = "--:--:--";
pub const ENTITY_ID_PLACEHOLDER: &str = "--------";
pub const NAMESPACE_DEFAULT: &str = "default";
pub const SCORES_PLACEHOLDER: &str = "-";

/// One table row on the inspection page. Every field is display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    /// The raw storage key
    pub key: String,
    /// Short classification label
    pub kind: String,
    /// Human-readable time
    pub timestamp: String,
    /// Short identifier fragment
    pub entity_id: String,
    /// Logical grouping label
    pub namespace: String,
    /// Free-text annotation
    pub detail: String,
    /// Free-text annotation
    pub scores: String,
}

impl DisplayRecord {
    /// The record shown when nothing about the entry could be parsed.
    pub fn raw(key: &str, value: &[u8]) -> Self {
        Self {
            key: key.to_string(),
            kind: KIND_RAW.to_string(),
            timestamp: TIMESTAMP_PLACEHOLDER.to_string(),
            entity_id: ENTITY_ID_PLACEHOLDER.to_string(),
            namespace: NAMESPACE_DEFAULT.to_string(),
            detail: format!("Size: {} bytes", value.len()),
            scores: SCORES_PLACEHOLDER.to_string(),
        }
    }
}

/// Translates a stored entry into a [`DisplayRecord`].
pub trait RowMapper: Send + Sync {
    fn map(&self, key: &str, value: &[u8]) -> DisplayRecord;
}

impl<F> RowMapper for F
where
    F: Fn(&str, &[u8]) -> DisplayRecord + Send + Sync,
{
    fn map(&self, key: &str, value: &[u8]) -> DisplayRecord {
        self(key, value)
    }
}

/// Where the default mapper looks for each column inside a delimited key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    /// Segment separator
    pub delimiter: char,
    /// Keys with fewer segments get the raw record
    pub min_segments: usize,
    /// Segment holding the namespace
    pub namespace_segment: usize,
    /// Segment holding the epoch timestamp in nanoseconds
    pub timestamp_segment: usize,
    /// Segment holding the entity id
    pub id_segment: usize,
    /// Max characters of the entity id kept
    pub id_width: usize,
}

impl Default for KeySchema {
    /// `namespace:entity:timestamp_nanoseconds:id`
    fn default() -> Self {
        Self {
            delimiter: ':',
            min_segments: 4,
            namespace_segment: 1,
            timestamp_segment: 2,
            id_segment: 3,
            id_width: 8,
        }
    }
}

/// Key-based metadata extraction.
///
/// With the default schema, `analysis:room-42:1700000000000000000:uuid-1234`
/// maps to namespace `room-42`, the local `HH:MM:SS` of the timestamp, and
/// entity id `uuid-123`.
#[derive(Debug, Clone, Default)]
pub struct DefaultMapper {
    schema: KeySchema,
}

impl DefaultMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: KeySchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &KeySchema {
        &self.schema
    }
}

impl RowMapper for DefaultMapper {
    fn map(&self, key: &str, value: &[u8]) -> DisplayRecord {
        let mut row = DisplayRecord::raw(key, value);

        let parts: Vec<&str> = key.split(self.schema.delimiter).collect();
        if parts.len() < self.schema.min_segments {
            return row;
        }

        if let Some(namespace) = parts.get(self.schema.namespace_segment) {
            row.namespace = namespace.to_string();
        }

        if let Some(timestamp) = parts
            .get(self.schema.timestamp_segment)
            .and_then(|raw| format_clock(raw))
        {
            row.timestamp = timestamp;
        }

        if let Some(id) = parts.get(self.schema.id_segment) {
            row.entity_id = id.chars().take(self.schema.id_width).collect();
        }

        row
    }
}

/// Format an epoch-nanosecond string as local `HH:MM:SS`.
pub fn format_clock(epoch_nanos: &str) -> Option<String> {
    let nanos: i64 = epoch_nanos.parse().ok()?;
    Some(Local.timestamp_nanos(nanos).format("%H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now_nanos() -> i64 {
        Local::now().timestamp_nanos_opt().unwrap()
    }

    #[test]
    fn test_default_mapper_well_formed_key() {
        let ts = now_nanos();
        let key = format!("analysis:room-42:{}:uuid-12345678-90", ts);
        let row = DefaultMapper::new().map(&key, b"some-binary-data");

        assert_eq!(row.key, key);
        assert_eq!(row.namespace, "room-42");
        assert_eq!(row.entity_id, "uuid-123");
        assert_eq!(row.detail, "Size: 16 bytes");
        assert_eq!(
            row.timestamp,
            Local.timestamp_nanos(ts).format("%H:%M:%S").to_string()
        );
        assert_eq!(row.kind, "RAW");
        assert_eq!(row.scores, "-");
    }

    #[test]
    fn test_default_mapper_short_key_gets_defaults() {
        let row = DefaultMapper::new().map("a:1", b"xyz");

        assert_eq!(row.kind, "RAW");
        assert_eq!(row.namespace, "default");
        assert_eq!(row.timestamp, "--:--:--");
        assert_eq!(row.entity_id, "--------");
        assert_eq!(row.detail, "Size: 3 bytes");
    }

    #[test]
    fn test_unparseable_timestamp_keeps_placeholder() {
        let row = DefaultMapper::new().map("analysis:room:yesterday:abc", b"");

        assert_eq!(row.namespace, "room");
        assert_eq!(row.timestamp, TIMESTAMP_PLACEHOLDER);
        assert_eq!(row.entity_id, "abc");
        assert_eq!(row.detail, "Size: 0 bytes");
    }

    #[test]
    fn test_extra_segments_are_ignored() {
        let row = DefaultMapper::new().map("analysis:room:0:id:tail:more", b"v");
        assert_eq!(row.namespace, "room");
        assert_eq!(row.entity_id, "id");
        assert_eq!(row.timestamp, Local.timestamp_nanos(0).format("%H:%M:%S").to_string());
    }

    #[test]
    fn test_entity_id_truncation_respects_chars() {
        let row = DefaultMapper::new().map("a:b:1:ééééééééééé", b"");
        assert_eq!(row.entity_id.chars().count(), 8);
    }

    #[test]
    fn test_custom_schema() {
        let schema = KeySchema {
            delimiter: '/',
            min_segments: 2,
            namespace_segment: 0,
            timestamp_segment: 5,
            id_segment: 1,
            id_width: 4,
        };
        let row = DefaultMapper::with_schema(schema).map("tenant/abcdefgh", b"");
        assert_eq!(row.namespace, "tenant");
        assert_eq!(row.entity_id, "abcd");
        assert_eq!(row.timestamp, TIMESTAMP_PLACEHOLDER);
    }

    #[test]
    fn test_closure_is_a_mapper() {
        let mapper = |key: &str, value: &[u8]| DisplayRecord {
            kind: "MSG".to_string(),
            ..DisplayRecord::raw(key, value)
        };
        let row = RowMapper::map(&mapper, "k", b"v");
        assert_eq!(row.kind, "MSG");
        assert_eq!(row.detail, "Size: 1 bytes");
    }
}
