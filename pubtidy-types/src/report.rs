use crate::facts::DepsFacts;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The marker was present, nothing was touched.
    AlreadyProcessed,
    /// No manifests of one of the two kinds were found.
    NothingToDo,
    /// Every manifest was processed.
    Completed,
}

/// Progress of the file relocator for one deps manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationReport {
    /// Files moved, including skip-counted bootstrap files.
    pub moved: usize,
    /// Files listed by the manifest.
    pub total: usize,
    /// Moves that were attempted and failed.
    pub failed: usize,
}

/// What happened to the host-resolver binary for one deps manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PatchStatus {
    /// Patching is switched off by configuration.
    Disabled,
    /// The manifest lacks host-resolver version or RID.
    Skipped { reason: String },
    Patched {
        rid: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        provenance: Option<String>,
    },
    Failed { reason: String, fatal: bool },
}

impl PatchStatus {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PatchStatus::Failed { fatal: true, .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestReport {
    pub path: Utf8PathBuf,
    pub facts: DepsFacts,
    pub patch: PatchStatus,
    pub relocation: RelocationReport,
}

/// Serialized summary of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub target_dir: Utf8PathBuf,
    pub status: RunStatus,

    #[serde(default)]
    pub runtime_configs: Vec<Utf8PathBuf>,

    #[serde(default)]
    pub manifests: Vec<ManifestReport>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fatal: Vec<String>,
}

impl RunReport {
    pub fn new(tool: ToolInfo, target_dir: Utf8PathBuf, status: RunStatus) -> Self {
        Self {
            schema: crate::schema::PUBTIDY_RUN_V1.to_string(),
            tool,
            target_dir,
            status,
            runtime_configs: vec![],
            manifests: vec![],
            fatal: vec![],
        }
    }

    pub fn has_fatal(&self) -> bool {
        !self.fatal.is_empty()
    }
}
