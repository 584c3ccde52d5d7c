use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("fetch {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("io error on {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cache record {path}: {message}")]
    Record { path: Utf8PathBuf, message: String },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    Checksum {
        path: Utf8PathBuf,
        expected: String,
        actual: String,
    },

    #[error("no cached artifact for {key}")]
    NotCached { key: String },

    #[error("mirror returned an empty provenance version")]
    EmptyProvenance,
}

pub type ArtifactResult<T> = Result<T, ArtifactError>;

pub(crate) fn io_err(path: &camino::Utf8Path) -> impl FnOnce(std::io::Error) -> ArtifactError + '_ {
    move |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}
