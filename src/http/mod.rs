//! HTTP surface.
//!
//! Handlers translate requests into service calls. Success bodies are JSON;
//! errors are a plain-text message with the status from
//! [`NotebridgeError::status_code`].

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::db::Database;
use crate::error::NotebridgeError;
use crate::metrics::MetricsCollector;
use crate::service::{ChatService, FileService, LessonService, UserService};
use crate::storage::BlobStore;

mod auth;
mod chats;
mod files;
mod lessons;
mod users;

pub use auth::AuthUser;

/// Multipart framing on top of the raw file bytes
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    /// Accounts and credentials
    pub users: UserService,
    /// Lesson scheduling
    pub lessons: LessonService,
    /// Chats and messages
    pub chats: ChatService,
    /// Uploads and retrieval
    pub files: FileService,
    body_limit: usize,
}

impl AppState {
    /// Wire the services to one database and one blob store
    #[must_use]
    pub fn new(db: Database, blobs: Arc<dyn BlobStore>, config: &AppConfig) -> Self {
        let max_upload_bytes = config.storage.max_upload_bytes;
        Self {
            users: UserService::new(db.clone()),
            lessons: LessonService::new(db.clone()),
            chats: ChatService::new(db.clone(), &config.chat),
            files: FileService::new(Arc::new(db), blobs, max_upload_bytes),
            body_limit: max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
        }
    }
}

/// Build the full `/api` router
pub fn router(state: AppState) -> Router {
    // JSON routes keep axum's default limit
    let uploads = files::routes().layer(DefaultBodyLimit::max(state.body_limit));
    Router::new()
        .merge(users::routes())
        .merge(lessons::routes())
        .merge(chats::routes())
        .merge(uploads)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Bind `bind_addr` and serve until Ctrl-C
pub async fn serve(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    info!(addr = bind_addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    info!("Shutdown signal received");
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = std::time::Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let duration_ms = started.elapsed().as_millis();
    if response.status().is_server_error() {
        warn!(%method, path, status, duration_ms, "Request failed");
    } else {
        info!(%method, path, status, duration_ms, "Request handled");
    }
    response
}

impl IntoResponse for NotebridgeError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if !self.is_client_error() {
            error!(error = %self, "Internal error");
            MetricsCollector::default().record_error(self.kind());
        }

        let mut response = (status, self.to_string()).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic realm=\"notebridge\""));
        }
        response
    }
}

/// Handler result type
pub(crate) type ApiResult<T> = Result<T, NotebridgeError>;

/// Run a CPU-bound service call (argon2) on the blocking pool
pub(crate) async fn blocking<T, F>(task: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| NotebridgeError::Other(format!("Blocking task failed: {e}")))?
}
