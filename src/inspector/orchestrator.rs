//! Pause-and-inspect orchestration
//!
//! ```ignore
//! let outcome = Inspector::new(store.clone())
//!     .with_prefix("analysis:room-42:")
//!     .run(|| run_benchmark(&store));
//! ```
//!
//! Starts the server, runs the workload, prints the operator URL and parks
//! until resumed. Nothing here fails the caller: a server that cannot start
//! is logged and reported as [`WaitOutcome::Unavailable`].

use std::sync::Arc;
use std::time::Duration;

use super::config::InspectorConfig;
use super::gate::WaitOutcome;
use super::mapper::RowMapper;
use super::server::InspectServer;
use crate::observability::{log_event_with_fields, Event};
use crate::storage::KvStore;

/// Builder for one pause.
pub struct Inspector {
    store: Arc<dyn KvStore>,
    config: InspectorConfig,
    mapper: Option<Arc<dyn RowMapper>>,
    prefix: Option<String>,
    timeout: Option<Duration>,
}

impl Inspector {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            config: InspectorConfig::default(),
            mapper: None,
            prefix: None,
            timeout: None,
        }
    }

    pub fn with_config(mut self, config: InspectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn with_mapper(mut self, mapper: impl RowMapper + 'static) -> Self {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    /// Prefix shown in the printed URL. Defaults to the configured prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Stop waiting after `timeout` instead of blocking indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Start the server, run `workload`, then park until resumed.
    pub fn run<F: FnOnce()>(self, workload: F) -> WaitOutcome {
        self.execute(Some(workload))
    }

    /// Park without running anything first.
    pub fn pause(self) -> WaitOutcome {
        self.execute(None::<fn()>)
    }

    fn execute<F: FnOnce()>(self, workload: Option<F>) -> WaitOutcome {
        let server = InspectServer::start(self.store, self.config, self.mapper);

        if let Some(workload) = workload {
            workload();
        }

        let server = match server {
            Ok(server) => server,
            Err(e) => {
                log_event_with_fields(
                    Event::InspectorBindFailed,
                    &[("error", e.to_string().as_str())],
                );
                return WaitOutcome::Unavailable;
            }
        };

        let prefix = self.prefix.unwrap_or_default();
        match self.timeout {
            Some(timeout) => server.wait_timeout(&prefix, timeout),
            None => server.wait(&prefix),
        }
    }
}
