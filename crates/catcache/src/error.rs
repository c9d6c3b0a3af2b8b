//! Error types for the cat image cache

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

/// Process-level errors (startup and serving)
#[derive(Debug)]
pub enum CatCacheError {
    Config(String),
    Io(Box<std::io::Error>),
}

impl fmt::Display for CatCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatCacheError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CatCacheError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for CatCacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatCacheError::Io(err) => Some(err.as_ref()),
            CatCacheError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for CatCacheError {
    fn from(err: std::io::Error) -> Self {
        CatCacheError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for CatCacheError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        CatCacheError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatCacheError>;

/// Cache store errors
#[derive(Debug)]
pub enum CacheError {
    /// No file exists for the key
    NotFound,
    Io(std::io::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::NotFound => write!(f, "Cache entry not found"),
            CacheError::Io(err) => write!(f, "Cache IO error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(err) => Some(err),
            CacheError::NotFound => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CacheError::NotFound
        } else {
            CacheError::Io(err)
        }
    }
}

/// Origin fetch failures. Callers treat every variant as "unavailable".
#[derive(Debug)]
pub enum OriginError {
    Http(Box<reqwest::Error>),
    Status(StatusCode),
}

impl fmt::Display for OriginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginError::Http(err) => write!(f, "HTTP error: {}", err),
            OriginError::Status(status) => write!(f, "Origin returned status {}", status),
        }
    }
}

impl std::error::Error for OriginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OriginError::Http(err) => Some(err.as_ref()),
            OriginError::Status(_) => None,
        }
    }
}

impl From<reqwest::Error> for OriginError {
    fn from(err: reqwest::Error) -> Self {
        OriginError::Http(Box::new(err))
    }
}

/// Request handler error that converts to a plain-text HTTP response
#[derive(Debug)]
pub enum AppError {
    NotFound,
    MethodNotAllowed,
    InvalidKey(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "File not found"),
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"),
            AppError::InvalidKey(key) => {
                tracing::debug!(key = %key, "Rejected invalid key");
                (StatusCode::BAD_REQUEST, "Invalid key")
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotFound => AppError::NotFound,
            CacheError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}
