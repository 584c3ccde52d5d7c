//! The run pipeline.
//!
//! Per target directory: marker check, manifest discovery, runtime-config
//! repair, then for each deps manifest its repair, host-resolver patch and
//! file relocation. Manifest parse errors abort the run. Patch failures are
//! recorded in the report and the run continues.

use crate::error::ToolError;
use crate::hostfxr::{PatchError, patch_host_resolver, resolve_key};
use crate::relocate::relocate;
use crate::settings::RunSettings;
use camino::Utf8Path;
use fs_err as fs;
use pubtidy_artifacts::{ArtifactCache, ArtifactStore, Mirror, default_cache_root};
use pubtidy_manifest::{
    find_deps_manifests, find_runtime_configs, patch_deps, patch_runtime_config,
};
use pubtidy_rid::RidGraph;
use pubtidy_types::facts::DepsFacts;
use pubtidy_types::names;
use pubtidy_types::report::{
    ManifestReport, PatchStatus, RelocationReport, RunReport, RunStatus, ToolInfo,
};
use pubtidy_types::request::RelocationRequest;
use tracing::{debug, error, info};

/// Tidy `settings.target_dir`.
///
/// Returns `Err` only for structural failures. Fatal patch failures are
/// listed in [`RunReport::fatal`]; the marker is not written in that case.
pub fn run(
    settings: &RunSettings,
    mirror: &dyn Mirror,
    tool: ToolInfo,
) -> Result<RunReport, ToolError> {
    let request = RelocationRequest::new(settings.target_dir.clone(), settings.subdir.clone());
    let target = request.source_directory.as_path();
    validate_target(target)?;

    info!(target = %target, "running pubtidy");

    let marker = request.marker_path();
    if marker.exists() {
        info!(marker = %marker, "already processed");
        return Ok(RunReport::new(
            tool,
            target.to_path_buf(),
            RunStatus::AlreadyProcessed,
        ));
    }

    let runtime_configs = find_runtime_configs(target)?;
    let deps_manifests = find_deps_manifests(target)?;
    if runtime_configs.is_empty() || deps_manifests.is_empty() {
        info!(
            runtime_configs = runtime_configs.len(),
            deps_manifests = deps_manifests.len(),
            "no manifests found, skipping"
        );
        return Ok(RunReport::new(
            tool,
            target.to_path_buf(),
            RunStatus::NothingToDo,
        ));
    }

    let mut report = RunReport::new(tool, target.to_path_buf(), RunStatus::Completed);

    for path in &runtime_configs {
        info!(path = %path, "fixing runtime config");
        let changed = patch_runtime_config(path, &request.relocation_subdir)?;
        debug!(path = %path, changed, "runtime config fixed");
    }
    report.runtime_configs = runtime_configs;

    let patcher = if settings.no_patch {
        None
    } else {
        let cache_root = match &settings.cache_dir {
            Some(dir) => dir.clone(),
            None => default_cache_root().ok_or(ToolError::NoCacheDir)?,
        };
        Some(Patcher::new(ArtifactStore::new(
            ArtifactCache::new(cache_root),
            mirror,
        )))
    };

    for path in &deps_manifests {
        info!(path = %path, "fixing deps manifest");
        let facts = patch_deps(path, &request.relocation_subdir)?;
        let app_dir = path.parent().unwrap_or(target);

        let patch = match &patcher {
            None => {
                info!("host resolver patch is disabled, skipped");
                PatchStatus::Disabled
            }
            Some(_) if !facts.has_fxr_info() => {
                error!(
                    path = %path,
                    fxr_version = %facts.fxr_version,
                    rid = %facts.rid,
                    "incomplete host resolver info, skipping patch"
                );
                PatchStatus::Skipped {
                    reason: "incomplete host resolver info".to_string(),
                }
            }
            Some(patcher) => patcher.patch(&facts, app_dir),
        };
        if let PatchStatus::Failed {
            reason,
            fatal: true,
        } = &patch
        {
            report.fatal.push(format!("{path}: {reason}"));
        }

        let relocation = if facts.deps_files.is_empty() {
            debug!(path = %path, "no relocatable files");
            RelocationReport::default()
        } else {
            let file_name = path.file_name().unwrap_or_default();
            relocate(
                &facts.deps_files,
                names::main_program(file_name),
                app_dir,
                &request.relocation_subdir,
            )
        };

        report.manifests.push(ManifestReport {
            path: path.clone(),
            facts,
            patch,
            relocation,
        });
    }

    if report.has_fatal() {
        error!(count = report.fatal.len(), "run finished with fatal errors");
        return Ok(report);
    }

    fs::write(&marker, b"").map_err(|source| ToolError::Marker {
        path: marker.clone(),
        source,
    })?;
    info!(target = %target, "done");
    Ok(report)
}

fn validate_target(target: &Utf8Path) -> Result<(), ToolError> {
    let reason = if !target.is_absolute() {
        "path is not absolute"
    } else if !target.is_dir() {
        "not a directory"
    } else {
        return Ok(());
    };
    Err(ToolError::InvalidTarget {
        path: target.to_path_buf(),
        reason: reason.to_string(),
    })
}

/// Artifact store plus the RID graph, loaded on first use.
struct Patcher<'a> {
    store: ArtifactStore<'a>,
    graph: std::cell::OnceCell<RidGraph>,
}

impl<'a> Patcher<'a> {
    fn new(store: ArtifactStore<'a>) -> Self {
        Self {
            store,
            graph: std::cell::OnceCell::new(),
        }
    }

    fn patch(&self, facts: &DepsFacts, app_dir: &Utf8Path) -> PatchStatus {
        let graph = self.graph.get_or_init(|| self.store.rid_graph());
        let result = resolve_key(graph, &facts.fxr_version, &facts.rid)
            .and_then(|key| patch_host_resolver(&self.store, &key, app_dir));
        match result {
            Ok(patched) => PatchStatus::Patched {
                rid: patched.key.rid,
                provenance: Some(patched.provenance),
            },
            Err(e) => failed(e),
        }
    }
}

fn failed(e: PatchError) -> PatchStatus {
    let fatal = e.is_fatal();
    error!(error = %e, fatal, "host resolver patch failed");
    PatchStatus::Failed {
        reason: e.to_string(),
        fatal,
    }
}
