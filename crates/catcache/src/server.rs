//! HTTP server for the image cache
//!
//! Every path is handled by a single method dispatcher: `GET`, `PUT` and
//! `DELETE` on `/<key>` act on `<cache_dir>/<key>.jpg`, everything else is
//! answered with 405.

use crate::cache::ImageCache;
use crate::error::{AppError, CacheError};
use crate::origin::OriginFetcher;
use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

const IMAGE_JPEG: &str = "image/jpeg";
const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: ImageCache,
    /// Fallback for cache misses; `None` answers misses with 404
    pub origin: Option<OriginFetcher>,
}

impl ServerState {
    pub fn new(cache: ImageCache, origin: Option<OriginFetcher>) -> Self {
        Self { cache, origin }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .fallback(handle_request)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until the process exits
pub async fn start_server(state: SharedState, host: &str, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Server running at http://{}/", listener.local_addr()?);

    axum::serve(listener, router).await
}

/// Derive the cache key from a request path.
///
/// The key is the first path segment, percent-decoded. Segments after the
/// first are ignored. Keys containing a path separator or NUL are rejected
/// since they would resolve outside the cache directory.
pub fn key_from_path(path: &str) -> Result<String, AppError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let segment = trimmed.split('/').next().unwrap_or_default();

    let key = urlencoding::decode(segment)
        .map_err(|_| AppError::InvalidKey(segment.to_string()))?
        .into_owned();

    if key.contains(['/', '\\', '\0']) {
        return Err(AppError::InvalidKey(key));
    }

    Ok(key)
}

async fn handle_request(
    State(state): State<SharedState>,
    request: Request,
) -> Result<Response, AppError> {
    let handler = match *request.method() {
        Method::GET => Handler::Get,
        Method::PUT => Handler::Put,
        Method::DELETE => Handler::Delete,
        _ => return Err(AppError::MethodNotAllowed),
    };

    let key = key_from_path(request.uri().path())?;

    match handler {
        Handler::Get => get_image(&state, &key).await,
        Handler::Put => {
            // Only PUT reads the body, buffered in full with no size limit
            let body = axum::body::to_bytes(request.into_body(), usize::MAX)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to read request body: {}", e)))?;
            put_image(&state, &key, &body).await
        }
        Handler::Delete => delete_image(&state, &key).await,
    }
}

enum Handler {
    Get,
    Put,
    Delete,
}

/// Serve from disk, falling back to the origin on a miss
async fn get_image(state: &ServerState, key: &str) -> Result<Response, AppError> {
    match state.cache.read(key).await {
        Ok(data) => Ok(image_response(data, "HIT")),
        Err(CacheError::NotFound) => {
            debug!(key, "Cache miss");
            let Some(origin) = &state.origin else {
                return Err(AppError::NotFound);
            };

            let data = origin.fetch(key).await.map_err(|e| {
                warn!(key, error = %e, "Origin fetch failed");
                AppError::NotFound
            })?;

            if let Err(e) = state.cache.write(key, &data).await {
                // Still serve what the origin gave us
                warn!(key, error = %e, "Failed to cache fetched image");
            }

            Ok(image_response(data, "MISS"))
        }
        Err(e) => Err(e.into()),
    }
}

async fn put_image(state: &ServerState, key: &str, body: &Bytes) -> Result<Response, AppError> {
    state.cache.write(key, body).await?;
    Ok((StatusCode::CREATED, "File created or updated").into_response())
}

async fn delete_image(state: &ServerState, key: &str) -> Result<Response, AppError> {
    state.cache.delete(key).await?;
    Ok((StatusCode::OK, "File deleted").into_response())
}

fn image_response(data: Vec<u8>, cache_status: &'static str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, IMAGE_JPEG), (X_CACHE, cache_status)],
        data,
    )
        .into_response()
}
