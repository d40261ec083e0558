use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LudexError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Validation(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification used at the feed, detail and bookmark boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Storage,
    Auth,
    Other,
}

impl LudexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LudexError::Http(_)
            | LudexError::Json(_)
            | LudexError::InvalidUrl(_)
            | LudexError::Network(_)
            | LudexError::Timeout(_) => ErrorKind::Network,
            LudexError::Database(_) | LudexError::Io(_) | LudexError::Storage(_) => {
                ErrorKind::Storage
            }
            LudexError::Auth(_) | LudexError::NotLoggedIn => ErrorKind::Auth,
            LudexError::Validation(_) | LudexError::Config(_) => ErrorKind::Other,
        }
    }

    /// Wrap a poisoned-lock error from a `std::sync::Mutex`.
    pub(crate) fn poisoned<E: std::fmt::Display>(e: E) -> Self {
        LudexError::Storage(format!("lock poisoned: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, LudexError>;
