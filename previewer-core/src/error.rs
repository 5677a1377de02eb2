//! Previewer error types with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by manifest generation, release resolution and checkout
#[derive(Error, Debug)]
pub enum PreviewerError {
    /// Bad paths, unreadable root, or a document that cannot be placed under the root
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Transport failure (DNS, connection, timeout)
    #[cfg(feature = "fetch")]
    #[error("Request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered with a non-success status
    #[error("Request to {url} failed: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The tag list payload did not have the expected shape
    #[error("Unexpected tags response for repository '{repo}': {reason}")]
    UnexpectedResponse { repo: String, reason: String },

    /// The remote repository has no usable release tag
    #[error("No tags found for repository '{repo}'.")]
    NoTags { repo: String },

    /// The downloaded release could not be installed
    #[error("Failed to fetch release '{tag}' from '{repo}': {reason}")]
    Fetch {
        repo: String,
        tag: String,
        reason: String,
    },

    /// I/O failure, surfaced with the path it happened on
    #[error("Filesystem error at {path}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The preview server could not bind or stopped with an I/O error
    #[error("Preview server on {addr} failed")]
    Server {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PreviewerError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PreviewerError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn fetch(repo: &str, tag: &str, reason: impl Into<String>) -> Self {
        PreviewerError::Fetch {
            repo: repo.to_string(),
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from talking to the remote host
    pub fn is_network(&self) -> bool {
        match self {
            #[cfg(feature = "fetch")]
            PreviewerError::Network { .. } => true,
            PreviewerError::HttpStatus { .. } => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PreviewerError>;
