use crate::error::{ManifestError, ManifestResult};
use camino::{Utf8Path, Utf8PathBuf};
use glob::{Pattern, glob};
use pubtidy_types::names::{DEPS_SUFFIX, RUNTIMECONFIG_SUFFIX};
use tracing::debug;

/// All `*.runtimeconfig.json` files under `root`, recursively, sorted.
pub fn find_runtime_configs(root: &Utf8Path) -> ManifestResult<Vec<Utf8PathBuf>> {
    find_with_suffix(root, RUNTIMECONFIG_SUFFIX)
}

/// All `*.deps.json` files under `root`, recursively, sorted.
pub fn find_deps_manifests(root: &Utf8Path) -> ManifestResult<Vec<Utf8PathBuf>> {
    find_with_suffix(root, DEPS_SUFFIX)
}

fn find_with_suffix(root: &Utf8Path, suffix: &str) -> ManifestResult<Vec<Utf8PathBuf>> {
    let pattern = format!("{}/**/*{}", Pattern::escape(root.as_str()), suffix);

    debug!(pattern = %pattern, "scanning for manifests");

    let entries = glob(&pattern).map_err(|e| ManifestError::Pattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut out = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !path.is_file() {
            continue;
        }
        match Utf8PathBuf::from_path_buf(path) {
            Ok(p) => out.push(p),
            Err(p) => debug!(path = %p.display(), "skipping non-utf8 path"),
        }
    }

    // Deterministic order matters.
    out.sort();
    Ok(out)
}
