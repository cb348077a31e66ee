//! # Inspection Server
//!
//! Hosts the inspection routes on a dedicated thread with its own tokio
//! runtime, so the caller's workload keeps running while operators browse.
//!
//! `start` returns once the listener is bound (or failed to bind). The bound
//! port lives on the instance; a config port of 0 picks an ephemeral one.
//! Dropping the server stops the listener.

use std::net::SocketAddr;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::config::InspectorConfig;
use super::errors::{InspectError, InspectResult};
use super::gate::{ResumeGate, WaitOutcome};
use super::inspect_routes::{inspect_routes, InspectState};
use super::mapper::{DefaultMapper, RowMapper};
use super::template::InspectTemplate;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::storage::KvStore;

/// Operator-facing banner printed once per wait.
pub fn pause_banner(url: &str) -> String {
    format!("\n--- TEST PAUSED ---\n\n{}\n\n-------------------\n", url)
}

/// A running inspection server.
pub struct InspectServer {
    config: InspectorConfig,
    local_addr: SocketAddr,
    gate: Arc<ResumeGate>,
    shutdown: Option<oneshot::Sender<()>>,
    listener: Option<JoinHandle<()>>,
}

impl InspectServer {
    /// Start serving `store` and wait for the bind outcome.
    ///
    /// `mapper` defaults to [`DefaultMapper`].
    pub fn start(
        store: Arc<dyn KvStore>,
        config: InspectorConfig,
        mapper: Option<Arc<dyn RowMapper>>,
    ) -> InspectResult<Self> {
        config.validate()?;
        let template = InspectTemplate::embedded()?;
        let gate = Arc::new(ResumeGate::new());

        let state = Arc::new(InspectState {
            store,
            mapper: mapper.unwrap_or_else(|| Arc::new(DefaultMapper::new())),
            template,
            gate: Arc::clone(&gate),
            config: config.clone(),
        });
        let router = inspect_routes(state);

        let addr = config.socket_addr();
        let (bound_tx, bound_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let listener = thread::Builder::new()
            .name("chatlab-inspector".to_string())
            .spawn(move || serve(router, addr, bound_tx, shutdown_rx))
            .map_err(InspectError::Runtime)?;

        let local_addr = match bound_rx.recv() {
            Ok(Ok(local_addr)) => local_addr,
            Ok(Err(e)) => {
                let _ = listener.join();
                return Err(e);
            }
            Err(_) => {
                let _ = listener.join();
                return Err(InspectError::ListenerLost);
            }
        };

        log_event_with_fields(
            Event::InspectorStarted,
            &[
                ("addr", local_addr.to_string().as_str()),
                ("endpoint", config.endpoint.as_str()),
                ("resume_path", config.resume_path.as_str()),
            ],
        );

        Ok(Self {
            config,
            local_addr,
            gate,
            shutdown: Some(shutdown_tx),
            listener: Some(listener),
        })
    }

    /// The bound port.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// URL an operator should open. An empty prefix means the default one.
    pub fn inspect_url(&self, prefix: &str) -> String {
        let prefix = if prefix.is_empty() {
            self.config.default_prefix.as_str()
        } else {
            prefix
        };
        self.config.inspect_url(self.port(), prefix)
    }

    /// The gate the resume route arms.
    pub fn resume_gate(&self) -> Arc<ResumeGate> {
        Arc::clone(&self.gate)
    }

    /// Print the pause banner and park until an operator resumes.
    pub fn wait(&self, prefix: &str) -> WaitOutcome {
        let url = self.announce(prefix);
        self.gate.block();
        log_event_with_fields(Event::WorkloadResumed, &[("url", url.as_str())]);
        WaitOutcome::Resumed
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    pub fn wait_timeout(&self, prefix: &str, timeout: Duration) -> WaitOutcome {
        let url = self.announce(prefix);
        let outcome = self.gate.block_timeout(timeout);
        match outcome {
            WaitOutcome::Resumed => {
                log_event_with_fields(Event::WorkloadResumed, &[("url", url.as_str())])
            }
            _ => log_event_with_fields(
                Event::WaitTimedOut,
                &[
                    ("url", url.as_str()),
                    ("timeout_ms", timeout.as_millis().to_string().as_str()),
                ],
            ),
        }
        outcome
    }

    fn announce(&self, prefix: &str) -> String {
        let url = self.inspect_url(prefix);
        print!("{}", pause_banner(&url));
        log_event_with_fields(Event::WorkloadPaused, &[("url", url.as_str())]);
        url
    }

    /// Stop the listener and wait for its thread to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(listener) = self.listener.take() {
            let _ = listener.join();
        }
    }
}

impl Drop for InspectServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Listener thread body: build a runtime, bind, report, serve until shutdown.
fn serve(
    router: Router,
    addr: String,
    bound: mpsc::Sender<InspectResult<SocketAddr>>,
    shutdown: oneshot::Receiver<()>,
) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("chatlab-inspector-worker")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = bound.send(Err(InspectError::Runtime(e)));
            return;
        }
    };

    runtime.block_on(async move {
        let bind = match TcpListener::bind(addr.as_str()).await {
            Ok(listener) => listener.local_addr().map(|local| (listener, local)),
            Err(e) => Err(e),
        };
        let (listener, local_addr) = match bind {
            Ok(bound) => bound,
            Err(source) => {
                let _ = bound.send(Err(InspectError::Bind { addr, source }));
                return;
            }
        };

        if bound.send(Ok(local_addr)).is_err() {
            return;
        }

        let result = axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown.await;
            })
            .await;
        if let Err(e) = result {
            Logger::error("INSPECTOR_SERVE_FAILED", &[("error", e.to_string().as_str())]);
        }
    });

    log_event(Event::InspectorStopped);
}
