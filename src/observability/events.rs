//! Observable events
//!
//! Events are explicit and typed. Each carries the severity it is logged at.

use std::fmt;

use super::logger::Severity;

/// Observable events in the inspector and its stores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Server lifecycle
    /// Listener bound and serving
    InspectorStarted,
    /// Listener could not bind or its runtime could not start
    InspectorBindFailed,
    /// Listener stopped
    InspectorStopped,

    // Inspection requests
    /// Snapshot could not be opened; page rendered empty
    InspectScanFailed,
    /// A single entry could not be read; row skipped
    InspectEntrySkipped,
    /// Scan or mapping task failed; page rendered without rows
    InspectRenderFailed,

    // Pause / resume
    /// Operator hit the resume endpoint
    ResumeSignalled,
    /// Workload thread parked on the gate
    WorkloadPaused,
    /// Workload thread released
    WorkloadResumed,
    /// Wait gave up before any resume
    WaitTimedOut,

    // Store
    /// Store opened and replayed
    StoreOpened,
    /// Unframeable bytes at the end of the log were discarded
    StoreTailTruncated,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::InspectorStarted => "INSPECTOR_STARTED",
            Event::InspectorBindFailed => "INSPECTOR_BIND_FAILED",
            Event::InspectorStopped => "INSPECTOR_STOPPED",

            Event::InspectScanFailed => "INSPECT_SCAN_FAILED",
            Event::InspectEntrySkipped => "INSPECT_ENTRY_SKIPPED",
            Event::InspectRenderFailed => "INSPECT_RENDER_FAILED",

            Event::ResumeSignalled => "RESUME_SIGNALLED",
            Event::WorkloadPaused => "WORKLOAD_PAUSED",
            Event::WorkloadResumed => "WORKLOAD_RESUMED",
            Event::WaitTimedOut => "WAIT_TIMED_OUT",

            Event::StoreOpened => "STORE_OPENED",
            Event::StoreTailTruncated => "STORE_TAIL_TRUNCATED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::InspectorBindFailed
            | Event::InspectScanFailed
            | Event::InspectRenderFailed => Severity::Error,
            Event::InspectEntrySkipped | Event::WaitTimedOut | Event::StoreTailTruncated => {
                Severity::Warn
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake() {
        let events = [
            Event::InspectorStarted,
            Event::InspectorBindFailed,
            Event::InspectorStopped,
            Event::InspectScanFailed,
            Event::InspectEntrySkipped,
            Event::InspectRenderFailed,
            Event::ResumeSignalled,
            Event::WorkloadPaused,
            Event::WorkloadResumed,
            Event::WaitTimedOut,
            Event::StoreOpened,
            Event::StoreTailTruncated,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failures_are_not_info() {
        assert_eq!(Event::InspectorBindFailed.severity(), Severity::Error);
        assert_eq!(Event::InspectEntrySkipped.severity(), Severity::Warn);
        assert_eq!(Event::ResumeSignalled.severity(), Severity::Info);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::WorkloadPaused), "WORKLOAD_PAUSED");
    }
}
