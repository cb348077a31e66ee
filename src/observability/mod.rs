//! Observability for the inspector
//!
//! Structured JSON logging of typed lifecycle events. Logging is for
//! reporting only: nothing here feeds back into control flow, and a failed
//! write to stdout/stderr is ignored.
//!
//! # Usage
//!
//! ```ignore
//! use chatlab_inspector::observability::{log_event_with_fields, Event, Logger};
//!
//! log_event_with_fields(Event::InspectorStarted, &[("port", "9999")]);
//! Logger::warn("CUSTOM_EVENT", &[("reason", "example")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::InspectorStopped);
        log_event_with_fields(Event::WorkloadPaused, &[("prefix", "analysis:")]);
    }
}
