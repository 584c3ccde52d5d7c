//! Clap-free settings for the pipeline.

use camino::Utf8PathBuf;
use pubtidy_artifacts::{DEFAULT_MIRROR, DEFAULT_TIMEOUT_SECS, HttpMirror};
use pubtidy_types::names::DEFAULT_SUBDIR;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Absolute path of the publish directory.
    pub target_dir: Utf8PathBuf,
    pub subdir: String,

    // Host-resolver patching
    pub mirror: String,
    pub no_patch: bool,
    /// `None` uses the platform cache directory.
    pub cache_dir: Option<Utf8PathBuf>,
    pub timeout: Duration,
}

impl RunSettings {
    pub fn new(target_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            ..Self::default()
        }
    }

    pub fn http_mirror(&self) -> HttpMirror {
        HttpMirror::new(self.mirror.clone(), self.timeout)
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            target_dir: Utf8PathBuf::from("."),
            subdir: DEFAULT_SUBDIR.to_string(),
            mirror: DEFAULT_MIRROR.to_string(),
            no_patch: false,
            cache_dir: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
