use std::net::SocketAddr;

use thiserror::Error;

/// Fatal failures of the content server.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("Server task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Why the status client's health request failed.
#[derive(Error, Debug)]
pub enum StatusError {
    #[error("API base URL is not configured")]
    NotConfigured,

    #[error("API is not responding (HTTP {0})")]
    Status(u16),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid health payload: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
