//! `*.runtimeconfig.json`: the loader manifest consulted at process start.

use crate::error::ManifestResult;
use crate::json::{self, Layout};
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfigManifest {
    #[serde(rename = "runtimeOptions", default)]
    pub runtime_options: RuntimeOptions,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeOptions {
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(
        rename = "additionalProbingPaths",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub additional_probing_paths: Vec<String>,
}

impl RuntimeConfigManifest {
    /// Append `subdir` to the probing paths unless an equivalent entry exists.
    /// Returns true when the manifest changed.
    pub fn add_probing_path(&mut self, subdir: &str) -> bool {
        let wanted = normalize(subdir);
        let paths = &mut self.runtime_options.additional_probing_paths;
        if paths.iter().any(|p| normalize(p) == wanted) {
            return false;
        }
        paths.push(subdir.to_string());
        true
    }
}

fn normalize(p: &str) -> &str {
    p.trim_end_matches(['/', '\\'])
}

/// Pure form of [`patch_runtime_config`]: returns the rewritten document, or
/// `None` when `subdir` is already listed.
pub fn patch_runtime_config_str(
    contents: &str,
    subdir: &str,
) -> Result<Option<String>, serde_json::Error> {
    let (mut manifest, layout): (RuntimeConfigManifest, Layout) = json::parse_str(contents)?;
    if !manifest.add_probing_path(subdir) {
        return Ok(None);
    }
    json::render(&manifest, layout).map(Some)
}

/// Add `subdir` to the probing paths of the manifest at `path`, in place.
/// Returns whether the file was rewritten.
pub fn patch_runtime_config(path: &Utf8Path, subdir: &str) -> ManifestResult<bool> {
    let contents = json::read(path)?;
    match patch_runtime_config_str(&contents, subdir).map_err(|e| json::json_error(path, e))? {
        Some(updated) => {
            json::write(path, &updated)?;
            debug!(path = %path, subdir, "added probing path");
            Ok(true)
        }
        None => {
            debug!(path = %path, subdir, "probing path already present");
            Ok(false)
        }
    }
}
