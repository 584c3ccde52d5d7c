use crate::error::{ArtifactError, ArtifactResult, io_err};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pubtidy_types::artifact::{ArtifactKey, ArtifactRecord};
use tracing::debug;

const RECORD_FILE: &str = "provenance.json";

/// Default cache root: `<platform cache dir>/pubtidy`.
pub fn default_cache_root() -> Option<Utf8PathBuf> {
    let dir = dirs::cache_dir()?.join("pubtidy");
    Utf8PathBuf::from_path_buf(dir).ok()
}

/// On-disk artifact store.
///
/// ```text
/// <root>/patches/<fxr_version>/<rid>/<file_name>
/// <root>/patches/<fxr_version>/<rid>/provenance.json
/// <root>/tables/<table file>
/// ```
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: Utf8PathBuf,
}

impl ArtifactCache {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn artifact_dir(&self, key: &ArtifactKey) -> Utf8PathBuf {
        self.root
            .join("patches")
            .join(&key.fxr_version)
            .join(&key.rid)
    }

    pub fn binary_path(&self, key: &ArtifactKey, file_name: &str) -> Utf8PathBuf {
        self.artifact_dir(key).join(file_name)
    }

    pub fn record_path(&self, key: &ArtifactKey) -> Utf8PathBuf {
        self.artifact_dir(key).join(RECORD_FILE)
    }

    pub fn table_path(&self, name: &str) -> Utf8PathBuf {
        self.root.join("tables").join(name)
    }

    /// Reads the provenance record; `Ok(None)` when none was written yet.
    pub fn read_record(&self, key: &ArtifactKey) -> ArtifactResult<Option<ArtifactRecord>> {
        let path = self.record_path(key);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_err(&path)(e)),
        };
        let record = serde_json::from_str(&contents).map_err(|e| ArtifactError::Record {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(record))
    }

    /// Writes the provenance record atomically (temp file then rename).
    pub fn write_record(&self, key: &ArtifactKey, record: &ArtifactRecord) -> ArtifactResult<()> {
        let path = self.record_path(key);
        let json = serde_json::to_string_pretty(record).map_err(|e| ArtifactError::Record {
            path: path.clone(),
            message: e.to_string(),
        })?;
        write_atomic(&path, json.as_bytes())?;
        debug!(key = %key, path = %path, "recorded artifact provenance");
        Ok(())
    }

    /// Provenance tag of the cached artifact, empty when none is recorded
    /// or the record is unreadable.
    pub fn local_provenance(&self, key: &ArtifactKey) -> String {
        match self.read_record(key) {
            Ok(Some(record)) => record.provenance,
            Ok(None) => String::new(),
            Err(e) => {
                debug!(key = %key, error = %e, "ignoring unreadable artifact record");
                String::new()
            }
        }
    }
}

/// Writes `bytes` to a sibling temp file and renames it over `path`.
pub(crate) fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> ArtifactResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    let tmp = temp_sibling(path);
    fs::write(&tmp, bytes).map_err(io_err(&tmp))?;
    fs::rename(&tmp, path).map_err(io_err(path))?;
    Ok(())
}

pub(crate) fn temp_sibling(path: &Utf8Path) -> Utf8PathBuf {
    let name = path.file_name().unwrap_or("artifact");
    path.with_file_name(format!(".{name}.pubtidy-tmp"))
}
