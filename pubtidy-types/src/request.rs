use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// What to relocate and where to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationRequest {
    /// Absolute path of the publish directory.
    pub source_directory: Utf8PathBuf,
    /// Name of the subdirectory receiving relocated files.
    pub relocation_subdir: String,
}

impl RelocationRequest {
    pub fn new(source_directory: impl Into<Utf8PathBuf>, relocation_subdir: impl Into<String>) -> Self {
        Self {
            source_directory: source_directory.into(),
            relocation_subdir: relocation_subdir.into(),
        }
    }

    pub fn marker_path(&self) -> Utf8PathBuf {
        self.source_directory.join(crate::names::MARKER_FILE)
    }
}
