//! Error types for manifest handling.
//!
//! Every variant is structural: a run cannot safely continue with a
//! manifest it failed to read, parse or write.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("io error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest {path}: {source}")]
    Json {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid search pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },
}

impl ManifestError {
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            ManifestError::Io { path, .. } | ManifestError::Json { path, .. } => Some(path),
            ManifestError::Pattern { .. } => None,
        }
    }
}

pub type ManifestResult<T> = Result<T, ManifestError>;
