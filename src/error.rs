use std::net::SocketAddr;

use thiserror::Error;

/// Failures at the edges of the estimator. The calculation itself never fails.
#[derive(Debug, Error)]
pub enum RoiError {
    #[error("invalid share link '{link}': {reason}")]
    InvalidLink { link: String, reason: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}
