//! Inspection HTTP Routes
//!
//! - `GET <endpoint>?prefix=<p>` renders the records under a prefix
//! - `GET <resume_path>` arms the resume gate
//!
//! Handlers never wait on the gate, and the scan runs on the blocking pool.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

use super::config::InspectorConfig;
use super::gate::ResumeGate;
use super::mapper::RowMapper;
use super::page::PageView;
use super::template::{InspectTemplate, PageLinks};
use crate::observability::{log_event_with_fields, Event};
use crate::storage::KvStore;

// ==================
// Shared State
// ==================

/// Everything the handlers need, shared across requests.
pub struct InspectState {
    pub store: Arc<dyn KvStore>,
    pub mapper: Arc<dyn RowMapper>,
    pub template: InspectTemplate,
    pub gate: Arc<ResumeGate>,
    pub config: InspectorConfig,
}

impl InspectState {
    fn links(&self) -> PageLinks<'_> {
        PageLinks {
            endpoint: &self.config.endpoint,
            resume_path: &self.config.resume_path,
        }
    }

    fn prefix_or_default(&self, prefix: Option<String>) -> String {
        prefix
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.config.default_prefix.clone())
    }
}

/// First `prefix` value of a query string. Later repeats are ignored.
pub fn first_prefix(params: Vec<(String, String)>) -> Option<String> {
    params
        .into_iter()
        .find(|(name, _)| name == "prefix")
        .map(|(_, value)| value)
}

// ==================
// Router
// ==================

/// Create the inspection routes at the configured paths.
pub fn inspect_routes(state: Arc<InspectState>) -> Router {
    let no_store = SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store"),
    );
    let endpoint = state.config.endpoint.clone();
    let resume_path = state.config.resume_path.clone();

    Router::new()
        .route(&endpoint, get(inspect_handler).layer(no_store))
        .route(&resume_path, get(resume_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn inspect_handler(
    State(state): State<Arc<InspectState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let prefix = state.prefix_or_default(first_prefix(params));

    let scan_state = Arc::clone(&state);
    let scan_prefix = prefix.clone();
    let scanned = tokio::task::spawn_blocking(move || {
        PageView::scan(
            scan_state.store.as_ref(),
            &scan_prefix,
            scan_state.mapper.as_ref(),
        )
    })
    .await;

    let page = match scanned {
        Ok(page) => page,
        Err(e) => {
            // A panicking mapper loses its rows, not the listener.
            log_event_with_fields(
                Event::InspectRenderFailed,
                &[("prefix", prefix.as_str()), ("error", e.to_string().as_str())],
            );
            PageView::empty(prefix)
        }
    };

    Html(state.template.render(&page, state.links()))
}

async fn resume_handler(State(state): State<Arc<InspectState>>) -> impl IntoResponse {
    state.gate.signal();
    log_event_with_fields(
        Event::ResumeSignalled,
        &[("path", state.config.resume_path.as_str())],
    );
    (StatusCode::OK, "RESUMED")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::mapper::{DefaultMapper, DisplayRecord};
    use crate::storage::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn state_with(store: MemoryStore, mapper: Arc<dyn RowMapper>) -> Arc<InspectState> {
        Arc::new(InspectState {
            store: Arc::new(store),
            mapper,
            template: InspectTemplate::embedded().unwrap(),
            gate: Arc::new(ResumeGate::new()),
            config: InspectorConfig::default(),
        })
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.put("analysis:room-1:0:aaaaaaaaaa", "one");
        store.put("analysis:room-2:0:bbbbbbbbbb", "two");
        store.put("chat:room-1:0:cccccccccc", "three");
        store
    }

    async fn fetch(router: Router, uri: &str) -> (StatusCode, String, Option<String>) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let cache = response
            .headers()
            .get(header::CACHE_CONTROL)
            .map(|v| v.to_str().unwrap().to_string());
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap(), cache)
    }

    #[tokio::test]
    async fn test_inspect_renders_matching_rows() {
        let router = inspect_routes(state_with(seeded(), Arc::new(DefaultMapper::new())));
        let (status, body, cache) = fetch(router, "/inspect?prefix=chat:").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("no-store"));
        assert!(body.contains("CHAT-LAB INSPECTOR"));
        assert!(body.contains("chat:room-1:0:cccccccccc"));
        assert!(!body.contains("analysis:room-1"));
    }

    #[tokio::test]
    async fn test_missing_or_empty_prefix_uses_default() {
        let state = state_with(seeded(), Arc::new(DefaultMapper::new()));

        for uri in ["/inspect", "/inspect?prefix="] {
            let (_, body, _) = fetch(inspect_routes(Arc::clone(&state)), uri).await;
            assert!(body.contains("analysis:room-1:0:aaaaaaaaaa"));
            assert!(body.contains("analysis:room-2:0:bbbbbbbbbb"));
            assert!(!body.contains("chat:room-1"));
            assert!(body.contains("2 record(s)"));
        }
    }

    #[tokio::test]
    async fn test_repeated_prefix_uses_first_value() {
        let router = inspect_routes(state_with(seeded(), Arc::new(DefaultMapper::new())));
        let (status, body, _) = fetch(router, "/inspect?prefix=chat:&prefix=analysis:").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("chat:room-1:0:cccccccccc"));
        assert!(!body.contains("analysis:room-1"));
    }

    #[tokio::test]
    async fn test_bare_and_unrelated_params_fall_back_to_default() {
        let state = state_with(seeded(), Arc::new(DefaultMapper::new()));

        for uri in ["/inspect?prefix", "/inspect?page=2&sort=key"] {
            let (status, body, _) = fetch(inspect_routes(Arc::clone(&state)), uri).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains("2 record(s)"));
        }
    }

    #[test]
    fn test_first_prefix() {
        let params = vec![
            ("page".to_string(), "2".to_string()),
            ("prefix".to_string(), "a:".to_string()),
            ("prefix".to_string(), "b:".to_string()),
        ];
        assert_eq!(first_prefix(params), Some("a:".to_string()));
        assert_eq!(first_prefix(Vec::new()), None);
    }

    #[tokio::test]
    async fn test_resume_arms_gate() {
        let state = state_with(MemoryStore::new(), Arc::new(DefaultMapper::new()));
        let (status, body, _) = fetch(inspect_routes(Arc::clone(&state)), "/resume").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "RESUMED");
        assert!(state.gate.is_armed());
    }

    #[tokio::test]
    async fn test_inspect_does_not_touch_gate() {
        let state = state_with(seeded(), Arc::new(DefaultMapper::new()));
        fetch(inspect_routes(Arc::clone(&state)), "/inspect").await;
        assert!(!state.gate.is_armed());
    }

    #[tokio::test]
    async fn test_panicking_mapper_renders_empty_page() {
        let mapper = |_: &str, _: &[u8]| -> DisplayRecord { panic!("mapper failure") };
        let router = inspect_routes(state_with(seeded(), Arc::new(mapper)));
        let (status, body, _) = fetch(router, "/inspect").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("CHAT-LAB INSPECTOR"));
        assert!(body.contains("0 record(s)"));
    }

    #[tokio::test]
    async fn test_prefix_is_escaped() {
        let router = inspect_routes(state_with(seeded(), Arc::new(DefaultMapper::new())));
        let (_, body, _) = fetch(router, "/inspect?prefix=%3Cscript%3E").await;
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }
}
