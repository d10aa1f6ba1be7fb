// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrawlError>;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("transfer of {url} interrupted: {source}")]
    Interrupted {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read listing: {0}")]
    Parse(String),

    #[error("cannot write {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid location {input:?}: {source}")]
    InvalidLocation {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("download cancelled")]
    Cancelled,
}

impl CrawlError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CrawlError::Filesystem { path: path.into(), source }
    }

    /// Network-class failures: transport errors and HTTP status failures.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            CrawlError::Network(_) | CrawlError::Status { .. } | CrawlError::Interrupted { .. }
        )
    }
}
