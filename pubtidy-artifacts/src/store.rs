use crate::cache::{ArtifactCache, temp_sibling, write_atomic};
use crate::error::{ArtifactError, ArtifactResult, io_err};
use crate::mirror::{Mirror, paths};
use camino::Utf8Path;
use fs_err as fs;
use pubtidy_rid::{
    COMPATIBILITY_TABLE, RidGraph, RidTableError, SUPPORTED_TABLE, host_fxr_file_name,
};
use pubtidy_types::artifact::{ArtifactKey, ArtifactRecord};
use tracing::{debug, info, warn};

/// How [`ArtifactStore::ensure_local`] satisfied a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsureOutcome {
    Cached { provenance: String },
    Downloaded { provenance: String },
}

impl EnsureOutcome {
    pub fn provenance(&self) -> &str {
        match self {
            EnsureOutcome::Cached { provenance } | EnsureOutcome::Downloaded { provenance } => {
                provenance
            }
        }
    }
}

/// Cache + mirror.
pub struct ArtifactStore<'a> {
    cache: ArtifactCache,
    mirror: &'a dyn Mirror,
}

impl<'a> ArtifactStore<'a> {
    pub fn new(cache: ArtifactCache, mirror: &'a dyn Mirror) -> Self {
        Self { cache, mirror }
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    /// A record with a non-empty provenance exists for `key`.
    pub fn has_local(&self, key: &ArtifactKey) -> bool {
        !self.cache.local_provenance(key).is_empty()
    }

    /// Fetches the patched binary into the cache. Does not write the record.
    pub fn download(&self, key: &ArtifactKey) -> ArtifactResult<()> {
        let file_name = host_fxr_file_name(&key.rid);
        let rel = paths::artifact(&key.fxr_version, &key.rid, file_name);
        info!(key = %key, url = %self.mirror.url_for(&rel), "downloading patched host resolver");

        let bytes = self.mirror.fetch(&rel)?;
        let dest = self.cache.binary_path(key, file_name);
        write_atomic(&dest, &bytes)?;

        debug!(key = %key, path = %dest, bytes = bytes.len(), "artifact cached");
        Ok(())
    }

    /// Current provenance tag published by the mirror, trimmed.
    pub fn remote_provenance_version(&self) -> ArtifactResult<String> {
        let bytes = self.mirror.fetch(paths::PROVENANCE)?;
        let version = String::from_utf8_lossy(&bytes).trim().to_string();
        if version.is_empty() {
            return Err(ArtifactError::EmptyProvenance);
        }
        Ok(version)
    }

    /// Persists the record for an already downloaded binary.
    pub fn record_local(&self, key: &ArtifactKey, provenance: &str) -> ArtifactResult<()> {
        if provenance.trim().is_empty() {
            return Err(ArtifactError::EmptyProvenance);
        }
        let file_name = host_fxr_file_name(&key.rid);
        let binary = self.cache.binary_path(key, file_name);
        let sha256 = pubtidy_hash::sha256_file(&binary).map_err(io_err(&binary))?;

        let mut record = ArtifactRecord::new(provenance.trim(), file_name);
        record.sha256 = Some(sha256);
        record.recorded_at = Some(chrono::Utc::now());
        self.cache.write_record(key, &record)
    }

    /// Makes sure the artifact for `key` is cached and recorded.
    ///
    /// Downloads only when no record exists. A failed record counts as a
    /// failed download.
    pub fn ensure_local(&self, key: &ArtifactKey) -> ArtifactResult<EnsureOutcome> {
        let provenance = self.cache.local_provenance(key);
        if !provenance.is_empty() {
            debug!(key = %key, provenance = %provenance, "artifact already cached");
            return Ok(EnsureOutcome::Cached { provenance });
        }

        self.download(key)?;
        let provenance = self.remote_provenance_version()?;
        self.record_local(key, &provenance)?;
        Ok(EnsureOutcome::Downloaded { provenance })
    }

    /// Copies the cached binary over `dest` through a temporary sibling.
    ///
    /// The binary's sha256 is checked against the record first.
    pub fn copy_to(&self, key: &ArtifactKey, dest: &Utf8Path) -> ArtifactResult<u64> {
        let record = self
            .cache
            .read_record(key)?
            .ok_or_else(|| ArtifactError::NotCached {
                key: key.to_string(),
            })?;
        let source = self.cache.binary_path(key, &record.file_name);

        if let Some(expected) = &record.sha256 {
            let actual = pubtidy_hash::sha256_file(&source).map_err(io_err(&source))?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(ArtifactError::Checksum {
                    path: source,
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        let tmp = temp_sibling(dest);
        let bytes = fs::copy(&source, &tmp).map_err(io_err(&tmp))?;
        if let Err(e) = fs::rename(&tmp, dest) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(dest)(e));
        }
        Ok(bytes)
    }

    /// RID graph from the cached tables, then the mirror, then the built-in
    /// table. Mirror tables are cached only once they parse; unparseable
    /// cached tables are dropped and fetched again.
    pub fn rid_graph(&self) -> RidGraph {
        match self.load_tables() {
            Ok(graph) => graph,
            Err(e) => {
                warn!(error = %e, "falling back to built-in RID table");
                RidGraph::builtin()
            }
        }
    }

    fn load_tables(&self) -> ArtifactResult<RidGraph> {
        match self.cached_tables() {
            Ok(Some(graph)) => return Ok(graph),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "discarding cached RID tables");
                for name in [COMPATIBILITY_TABLE, SUPPORTED_TABLE] {
                    let path = self.cache.table_path(name);
                    if let Err(e) = fs::remove_file(&path)
                        && e.kind() != std::io::ErrorKind::NotFound
                    {
                        return Err(io_err(&path)(e));
                    }
                }
            }
        }

        let compatibility = self.fetch_table(COMPATIBILITY_TABLE)?;
        let supported = self.fetch_table(SUPPORTED_TABLE)?;
        let graph = self.parse_tables(&compatibility, &supported)?;
        for (name, contents) in [(COMPATIBILITY_TABLE, &compatibility), (SUPPORTED_TABLE, &supported)] {
            let path = self.cache.table_path(name);
            write_atomic(&path, contents.as_bytes())?;
            debug!(table = name, path = %path, "cached RID table");
        }
        Ok(graph)
    }

    /// Both tables from the cache. `None` when either is missing.
    fn cached_tables(&self) -> ArtifactResult<Option<RidGraph>> {
        let (Some(compatibility), Some(supported)) = (
            self.cached_table(COMPATIBILITY_TABLE)?,
            self.cached_table(SUPPORTED_TABLE)?,
        ) else {
            return Ok(None);
        };
        self.parse_tables(&compatibility, &supported).map(Some)
    }

    fn cached_table(&self, name: &str) -> ArtifactResult<Option<String>> {
        let path = self.cache.table_path(name);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    fn fetch_table(&self, name: &str) -> ArtifactResult<String> {
        let bytes = self.mirror.fetch(&paths::table(name))?;
        String::from_utf8(bytes).map_err(|e| ArtifactError::Record {
            path: self.cache.table_path(name),
            message: e.to_string(),
        })
    }

    fn parse_tables(&self, compatibility: &str, supported: &str) -> ArtifactResult<RidGraph> {
        RidGraph::from_json(compatibility, supported).map_err(|e| {
            let name = match e {
                RidTableError::Compatibility(_) => COMPATIBILITY_TABLE,
                RidTableError::Supported(_) => SUPPORTED_TABLE,
            };
            ArtifactError::Record {
                path: self.cache.table_path(name),
                message: e.to_string(),
            }
        })
    }
}
