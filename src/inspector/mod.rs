//! Interactive inspection harness
//!
//! Pause a running test or benchmark, browse the key/value records it wrote
//! in a browser, and resume it by hand.
//!
//! | Part | Role |
//! |---|---|
//! | [`RowMapper`] | raw key + value to a [`DisplayRecord`] |
//! | [`InspectServer`] | HTTP page over a prefix scan, plus the resume route |
//! | [`ResumeGate`] | single-slot signal between operator and workload |
//! | [`Inspector`] | start server, run workload, wait |

mod config;
mod errors;
mod gate;
mod inspect_routes;
mod mapper;
mod orchestrator;
mod page;
mod server;
mod template;

pub use config::InspectorConfig;
pub use errors::{InspectError, InspectResult, TemplateError};
pub use gate::{ResumeGate, WaitOutcome};
pub use inspect_routes::{first_prefix, inspect_routes, InspectState};
pub use mapper::{
    format_clock, DefaultMapper, DisplayRecord, KeySchema, RowMapper, ENTITY_ID_PLACEHOLDER,
    KIND_RAW, NAMESPACE_DEFAULT, SCORES_PLACEHOLDER, TIMESTAMP_PLACEHOLDER,
};
pub use orchestrator::Inspector;
pub use page::PageView;
pub use server::{pause_banner, InspectServer};
pub use template::{escape_html, InspectTemplate, PageLinks, INSPECT_HTML};
