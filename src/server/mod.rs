//! Page server with incremental regeneration
//!
//! Serves the page data written by `build`. A page older than the
//! revalidation interval is still served, and regenerated in the background;
//! a page that was never generated is built on its first request.

use anyhow::Result;
use axum::{
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tower_http::trace::TraceLayer;

use crate::commands::build::{index_path, post_path, write_atomic};
use crate::error::Error;
use crate::generator::{PageBuilder, PageOutcome};
use crate::Site;

type LockTable = Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>;

/// Server state
pub struct ServerState {
    public_dir: PathBuf,
    revalidate: Duration,
    builder: PageBuilder,
    /// One lock per page being generated
    page_locks: LockTable,
}

impl ServerState {
    pub fn new(site: &Site, builder: PageBuilder) -> Self {
        Self {
            public_dir: site.public_dir.clone(),
            revalidate: Duration::from_secs(site.config.revalidate),
            builder,
            page_locks: Mutex::new(HashMap::new()),
        }
    }

    fn page_lock(&self, path: &Path) -> PageLock<'_> {
        let lock = self
            .page_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_path_buf())
            .or_default()
            .clone();
        PageLock {
            table: &self.page_locks,
            path: path.to_path_buf(),
            lock,
        }
    }
}

/// Handle on a page's generation lock; the table entry goes away with the
/// last handle
struct PageLock<'a> {
    table: &'a LockTable,
    path: PathBuf,
    lock: Arc<AsyncMutex<()>>,
}

impl Drop for PageLock<'_> {
    fn drop(&mut self) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the table and this handle left
        if Arc::strong_count(&self.lock) == 2 {
            table.remove(&self.path);
        }
    }
}

/// A page the server knows how to regenerate
#[derive(Debug, Clone)]
enum PageKey {
    Index,
    Post(String),
}

impl PageKey {
    fn path(&self, public_dir: &Path) -> PathBuf {
        match self {
            PageKey::Index => index_path(public_dir),
            PageKey::Post(uid) => post_path(public_dir, uid),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/post/:uid", get(post_handler))
        .route("/paths", get(paths_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, builder: PageBuilder, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(ServerState::new(site, builder));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("{} running at http://{}:{}", site.config.title, ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    serve_page(state, PageKey::Index).await
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    UrlPath(uid): UrlPath<String>,
) -> Response {
    serve_page(state, PageKey::Post(uid)).await
}

async fn paths_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.builder.static_paths().await {
        Ok(paths) => Json(paths).into_response(),
        Err(e) => error_response(fetch_status(&e), e.to_string()),
    }
}

async fn serve_page(state: Arc<ServerState>, key: PageKey) -> Response {
    let path = key.path(&state.public_dir);

    if let Some((body, age)) = read_cached(&path).await {
        if age >= state.revalidate {
            spawn_regeneration(state.clone(), key);
        }
        return json_response(body);
    }

    // Never generated: build it now, once
    let page_lock = state.page_lock(&path);
    let _generating = page_lock.lock.lock().await;
    if let Some((body, _)) = read_cached(&path).await {
        return json_response(body);
    }

    match regenerate(&state, &key).await {
        Ok(Some(body)) => json_response(body),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Not found".to_string()),
        Err(e) => {
            tracing::error!("Generating {:?} failed: {:#}", key, e);
            let status = match e.downcast_ref::<Error>() {
                Some(err) => fetch_status(err),
                None => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, e.to_string())
        }
    }
}

/// Regenerate a stale page unless that is already happening
fn spawn_regeneration(state: Arc<ServerState>, key: PageKey) {
    tokio::spawn(async move {
        let path = key.path(&state.public_dir);
        let page_lock = state.page_lock(&path);
        let Ok(_generating) = page_lock.lock.try_lock() else {
            return;
        };

        tracing::debug!("Revalidating {:?}", key);
        match regenerate(&state, &key).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                // The post was removed upstream
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    tracing::warn!("Failed to remove {:?}: {}", path, e);
                }
            }
            Err(e) => tracing::error!("Revalidating {:?} failed: {:#}", key, e),
        }
    });
}

/// Build a page, store it and return its JSON; `None` when it does not exist
async fn regenerate(state: &ServerState, key: &PageKey) -> Result<Option<String>> {
    let body = match key {
        PageKey::Index => serde_json::to_string_pretty(&state.builder.list_page().await?)?,
        PageKey::Post(uid) => match state.builder.detail_page(uid, false).await? {
            PageOutcome::Found(page) => serde_json::to_string_pretty(&page)?,
            PageOutcome::NotFound => return Ok(None),
        },
    };

    let path = key.path(&state.public_dir);
    let contents = body.clone();
    tokio::task::spawn_blocking(move || write_atomic(&path, contents.as_bytes())).await??;

    Ok(Some(body))
}

/// Read a generated page and how long ago it was written
async fn read_cached(path: &Path) -> Option<(String, Duration)> {
    let modified = tokio::fs::metadata(path).await.ok()?.modified().ok()?;
    let body = tokio::fs::read_to_string(path).await.ok()?;
    let age = modified.elapsed().unwrap_or_default();
    Some((body, age))
}

/// Upstream failures are the gateway's fault, bad documents are ours
fn fetch_status(err: &Error) -> StatusCode {
    match err {
        Error::TransientFetch(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn json_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::test_support::timeline;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct Fixture {
        _dir: tempfile::TempDir,
        public_dir: PathBuf,
        source: Arc<MemorySource>,
        app: Router,
    }

    fn fixture(revalidate: u64) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut site = Site::new(dir.path()).unwrap();
        site.config.revalidate = revalidate;

        let source = Arc::new(MemorySource::new(timeline(3)));
        let builder = site.builder(source.clone()).unwrap();
        let app = router(Arc::new(ServerState::new(&site, builder)));

        Fixture {
            public_dir: site.public_dir.clone(),
            _dir: dir,
            source,
            app,
        }
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_generates_missing_post_on_demand() {
        let fx = fixture(86400);
        let (status, body) = get(&fx.app, "/post/post-2").await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["props"]["post"]["uid"], "post-2");
        assert!(post_path(&fx.public_dir, "post-2").exists());
    }

    #[tokio::test]
    async fn test_unknown_post_is_404() {
        let fx = fixture(86400);
        let (status, _) = get(&fx.app, "/post/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!post_path(&fx.public_dir, "nope").exists());
    }

    #[tokio::test]
    async fn test_index_and_paths() {
        let fx = fixture(86400);
        let (status, body) = get(&fx.app, "/").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["props"]["results"].as_array().unwrap().len(), 3);

        let (status, body) = get(&fx.app, "/paths").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["paths"], serde_json::json!(["post-1"]));
        assert_eq!(json["fallback"], true);
    }

    #[tokio::test]
    async fn test_fresh_page_is_served_from_disk() {
        let fx = fixture(86400);
        let path = post_path(&fx.public_dir, "post-1");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"cached": true}"#).unwrap();

        let (status, body) = get(&fx.app, "/post/post-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"cached": true}"#);
        assert_eq!(fx.source.request_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_page_is_served_then_regenerated() {
        let fx = fixture(0);
        let path = post_path(&fx.public_dir, "post-1");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"cached": true}"#).unwrap();

        let (status, body) = get(&fx.app, "/post/post-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"cached": true}"#);

        let mut regenerated = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let content = std::fs::read_to_string(&path).unwrap_or_default();
            if content.contains("\"post-1\"") {
                regenerated = true;
                break;
            }
        }
        assert!(regenerated);
    }

    #[test]
    fn test_fetch_status() {
        assert_eq!(
            fetch_status(&Error::TransientFetch("timeout".to_string())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            fetch_status(&Error::InvalidRecord {
                id: "a".to_string(),
                reason: "no uid".to_string()
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_malformed_post_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let mut records = timeline(2);
        records[0].data.content.clear();
        let builder = site
            .builder(Arc::new(MemorySource::new(records)))
            .unwrap();
        let app = router(Arc::new(ServerState::new(&site, builder)));

        let (status, body) = get(&app, "/post/post-1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("malformed"));
    }

    async fn concurrent_gets(
        app: &Router,
        uri: &'static str,
        n: usize,
    ) -> Vec<(StatusCode, String)> {
        let handles: Vec<_> = (0..n)
            .map(|_| {
                let app = app.clone();
                tokio::spawn(async move { get(&app, uri).await })
            })
            .collect();

        let mut responses = Vec::new();
        for handle in handles {
            responses.push(handle.await.unwrap());
        }
        responses
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_during_regeneration_see_whole_pages() {
        let fx = fixture(0);
        let (status, _) = get(&fx.app, "/post/post-2").await;
        assert_eq!(status, StatusCode::OK);

        // Every request finds a stale page and kicks off a regeneration
        for _ in 0..50 {
            for (status, body) in concurrent_gets(&fx.app, "/post/post-2", 8).await {
                assert_eq!(status, StatusCode::OK);
                assert!(
                    serde_json::from_str::<serde_json::Value>(&body).is_ok(),
                    "incomplete page served: {:?}",
                    body
                );
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_requests_build_once() {
        let fx = fixture(86400);
        let responses = concurrent_gets(&fx.app, "/post/post-2", 8).await;

        let (_, first) = &responses[0];
        for (status, body) in &responses {
            assert_eq!(*status, StatusCode::OK);
            assert_eq!(body, first);
        }
        // One uid lookup plus the two navigation queries
        assert_eq!(fx.source.request_count(), 3);
    }

    #[tokio::test]
    async fn test_page_locks_are_released() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::new(dir.path()).unwrap();
        let builder = site
            .builder(Arc::new(MemorySource::new(timeline(2))))
            .unwrap();
        let state = ServerState::new(&site, builder);

        let path = post_path(&state.public_dir, "post-1");
        {
            let first = state.page_lock(&path);
            let second = state.page_lock(&path);
            assert!(Arc::ptr_eq(&first.lock, &second.lock));
            let _held = first.lock.try_lock().unwrap();
            assert!(second.lock.try_lock().is_err());
        }
        assert!(state.page_locks.lock().unwrap().is_empty());
    }
}
