use camino::Utf8PathBuf;
use pubtidy_manifest::ManifestError;

/// Error that aborts a run. Every variant maps to exit code 1.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid target directory {path}: {reason}")]
    InvalidTarget { path: Utf8PathBuf, reason: String },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("no cache directory available; pass one explicitly")]
    NoCacheDir,

    #[error("write marker {path}: {source}")]
    Marker {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        1
    }
}
