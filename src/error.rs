use std::path::PathBuf;

use thiserror::Error;

/// A manifest could not be read or parsed. Local to one source.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {manifest}: {message}")]
    Malformed {
        manifest: &'static str,
        message: String,
    },
}

impl LoadError {
    pub fn malformed(manifest: &'static str, message: impl std::fmt::Display) -> Self {
        LoadError::Malformed {
            manifest,
            message: message.to_string(),
        }
    }
}

/// Fetching the license of one remote library failed. Local to that library.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {repo} failed: {source}")]
    Transport {
        repo: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{repo} returned HTTP {status}")]
    Status { repo: String, status: u16 },

    #[error("no license found for {0}")]
    NotFound(String),
}

/// Writing a report or the run summary failed.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", .path.display())]
pub struct PersistenceError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl PersistenceError {
    pub fn new(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}
