//! `*.deps.json`: the build-generated dependency manifest.

use crate::error::ManifestResult;
use crate::json::{self, Layout};
use camino::Utf8Path;
use indexmap::{IndexMap, IndexSet};
use pubtidy_types::facts::DepsFacts;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Package holding the host resolver in framework-era publishes.
const HOST_RESOLVER_PACKAGE: &str = "Microsoft.NETCore.DotNetHostResolver";
/// Runtime pack holding the host resolver in self-contained publishes.
const RUNTIME_PACK_PREFIX: &str = "runtimepack.Microsoft.NETCore.App.Runtime";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepsManifest {
    #[serde(rename = "runtimeTarget", default, skip_serializing_if = "Option::is_none")]
    pub runtime_target: Option<RuntimeTarget>,

    #[serde(rename = "compilationOptions", default, skip_serializing_if = "Option::is_none")]
    pub compilation_options: Option<Value>,

    #[serde(default)]
    pub targets: IndexMap<String, IndexMap<String, TargetLibrary>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub libraries: IndexMap<String, Library>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeTarget {
    pub name: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One library entry inside a target block.
///
/// Fields stay raw JSON: an explicit `null` is kept as `Some(Value::Null)`
/// so a rewrite emits it again.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetLibrary {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub native: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TargetLibrary {
    fn assets(&self) -> impl Iterator<Item = &String> {
        self.runtime
            .iter()
            .chain(self.native.iter())
            .filter_map(Value::as_object)
            .flat_map(|m| m.keys())
    }

    fn has_assets(&self) -> bool {
        self.assets().next().is_some()
    }
}

/// One entry of the top-level `libraries` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Library {
    #[serde(rename = "type", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub serviceable: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub sha512: Option<Value>,

    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,

    #[serde(rename = "hashPath", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub hash_path: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Library {
    pub fn path(&self) -> Option<&str> {
        self.path.as_ref().and_then(Value::as_str)
    }
}

/// Distinguishes a key written as `null` from an absent one.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl DepsManifest {
    /// Key of the target block describing what actually ships.
    ///
    /// Falls back to the first target when `runtimeTarget` is absent.
    pub fn runtime_target_key(&self) -> Option<&str> {
        match &self.runtime_target {
            Some(rt) if !rt.name.is_empty() => Some(rt.name.as_str()),
            _ => self.targets.keys().next().map(String::as_str),
        }
    }

    fn runtime_block(&self) -> Option<&IndexMap<String, TargetLibrary>> {
        let key = self.runtime_target_key()?;
        let block = self.targets.get(key);
        if block.is_none() {
            warn!(target_key = key, "runtime target has no target block");
        }
        block
    }

    /// Runtime and native assets of the runtime target, deduplicated.
    pub fn deps_files(&self) -> Vec<String> {
        let Some(block) = self.runtime_block() else {
            return vec![];
        };
        let files: IndexSet<&String> = block.values().flat_map(TargetLibrary::assets).collect();
        files.into_iter().cloned().collect()
    }

    /// Version of the host-resolver package, empty when absent.
    pub fn fxr_version(&self) -> String {
        let Some(block) = self.runtime_block() else {
            return String::new();
        };
        let ids: Vec<(&str, &str)> = block
            .keys()
            .filter_map(|id| id.split_once('/'))
            .collect();

        ids.iter()
            .find(|(name, _)| name.contains(HOST_RESOLVER_PACKAGE))
            .or_else(|| ids.iter().find(|(name, _)| name.starts_with(RUNTIME_PACK_PREFIX)))
            .map(|(_, version)| version.to_string())
            .unwrap_or_default()
    }

    /// RID suffix of the runtime target key, empty for portable apps.
    pub fn rid(&self) -> String {
        self.runtime_target_key()
            .and_then(|key| key.rsplit_once('/'))
            .map(|(_, rid)| rid.to_string())
            .unwrap_or_default()
    }

    pub fn facts(&self) -> DepsFacts {
        DepsFacts {
            deps_files: self.deps_files(),
            fxr_version: self.fxr_version(),
            rid: self.rid(),
        }
    }

    /// Prefix `libraries[*].path` with `subdir` for every library that ships
    /// assets in the runtime target. Returns true when anything changed.
    pub fn relocate_library_paths(&mut self, subdir: &str) -> bool {
        let shipping: Vec<String> = match self.runtime_block() {
            Some(block) => block
                .iter()
                .filter(|(_, lib)| lib.has_assets())
                .map(|(id, _)| id.clone())
                .collect(),
            None => return false,
        };

        let prefix = format!("{}/", subdir.trim_end_matches(['/', '\\']));
        let mut changed = false;
        for id in shipping {
            let Some(Value::String(path)) = self.libraries.get_mut(&id).and_then(|l| l.path.as_mut()) else {
                continue;
            };
            if path.starts_with(&prefix) {
                continue;
            }
            *path = format!("{prefix}{path}");
            changed = true;
        }
        changed
    }
}

/// Pure form of [`patch_deps`]: returns the extracted facts and, when the
/// document changed, its new contents.
pub fn patch_deps_str(
    contents: &str,
    subdir: &str,
) -> Result<(DepsFacts, Option<String>), serde_json::Error> {
    let (mut manifest, layout): (DepsManifest, Layout) = json::parse_str(contents)?;
    let facts = manifest.facts();
    let updated = if manifest.relocate_library_paths(subdir) {
        Some(json::render(&manifest, layout)?)
    } else {
        None
    };
    Ok((facts, updated))
}

/// Extract [`DepsFacts`] from the manifest at `path` and rewrite its library
/// paths for the relocated layout, in place.
pub fn patch_deps(path: &Utf8Path, subdir: &str) -> ManifestResult<DepsFacts> {
    let contents = json::read(path)?;
    let (facts, updated) = patch_deps_str(&contents, subdir).map_err(|e| json::json_error(path, e))?;
    if let Some(updated) = updated {
        json::write(path, &updated)?;
        debug!(path = %path, "rewrote library paths");
    }
    debug!(
        path = %path,
        files = facts.deps_files.len(),
        fxr_version = %facts.fxr_version,
        rid = %facts.rid,
        "extracted deps facts"
    );
    Ok(facts)
}
