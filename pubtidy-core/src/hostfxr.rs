//! Host-resolver patching: resolve a compatible RID, make sure the patched
//! build is cached, back up the live binary once, then overwrite it.

use crate::fs_util::{copy_file, path_exists};
use camino::{Utf8Path, Utf8PathBuf};
use pubtidy_artifacts::{ArtifactError, ArtifactStore, EnsureOutcome};
use pubtidy_rid::{RidGraph, host_fxr_file_name};
use pubtidy_types::artifact::ArtifactKey;
use pubtidy_types::names::BACKUP_SUFFIX;
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("cannot find a compatible rid for {rid}")]
    Unresolvable { rid: String },

    #[error("download patch {key} failed: {source}")]
    Download {
        key: ArtifactKey,
        #[source]
        source: ArtifactError,
    },

    #[error("backup {path} failed: {source}")]
    Backup {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("patch {path} failed: {source}")]
    Apply {
        path: Utf8PathBuf,
        #[source]
        source: ArtifactError,
    },
}

impl PatchError {
    /// Fatal errors fail the run; the others only fail this manifest's patch.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PatchError::Unresolvable { .. } | PatchError::Download { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchReport {
    pub key: ArtifactKey,
    pub provenance: String,
    pub downloaded: bool,
    /// A backup was written during this call.
    pub backed_up: bool,
    pub bytes: u64,
}

/// Cache key for the nearest RID with a published patched build.
pub fn resolve_key(
    graph: &RidGraph,
    fxr_version: &str,
    rid: &str,
) -> Result<ArtifactKey, PatchError> {
    let compatible = graph.resolve(rid).ok_or_else(|| PatchError::Unresolvable {
        rid: rid.to_string(),
    })?;
    info!(rid, compatible = %compatible, "using compatible rid");
    Ok(ArtifactKey::new(fxr_version, compatible))
}

/// Patches the host resolver in `app_dir` with the artifact for `key`.
///
/// An existing `.bak` is never overwritten, and a backup is never rolled
/// back.
pub fn patch_host_resolver(
    store: &ArtifactStore<'_>,
    key: &ArtifactKey,
    app_dir: &Utf8Path,
) -> Result<PatchReport, PatchError> {
    info!(key = %key, "patching host resolver");

    let outcome = store
        .ensure_local(key)
        .map_err(|source| PatchError::Download {
            key: key.clone(),
            source,
        })?;

    let live = app_dir.join(host_fxr_file_name(&key.rid));
    let backup = Utf8PathBuf::from(format!("{live}{BACKUP_SUFFIX}"));

    let backed_up = if path_exists(&backup) {
        debug!(path = %backup, "backup found, skipped");
        false
    } else {
        debug!(path = %backup, "backing up host resolver");
        copy_file(&live, &backup).map_err(|source| {
            error!(path = %backup, error = %source, "backup failed");
            PatchError::Backup {
                path: backup.clone(),
                source,
            }
        })?;
        true
    };

    let bytes = store.copy_to(key, &live).map_err(|source| {
        error!(path = %live, error = %source, "patch failed");
        PatchError::Apply {
            path: live.clone(),
            source,
        }
    })?;
    info!(path = %live, bytes, "patch succeeded");

    Ok(PatchReport {
        key: key.clone(),
        provenance: outcome.provenance().to_string(),
        downloaded: matches!(outcome, EnsureOutcome::Downloaded { .. }),
        backed_up,
        bytes,
    })
}
