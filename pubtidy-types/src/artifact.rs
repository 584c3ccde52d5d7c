use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a patched host-resolver build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub fxr_version: String,
    pub rid: String,
}

impl ArtifactKey {
    pub fn new(fxr_version: impl Into<String>, rid: impl Into<String>) -> Self {
        Self {
            fxr_version: fxr_version.into(),
            rid: rid.into(),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.fxr_version, self.rid)
    }
}

/// Persisted provenance of a locally cached artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub schema: String,
    /// Opaque version tag published by the mirror.
    pub provenance: String,
    pub file_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl ArtifactRecord {
    pub fn new(provenance: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            schema: crate::schema::PUBTIDY_ARTIFACT_RECORD_V1.to_string(),
            provenance: provenance.into(),
            file_name: file_name.into(),
            sha256: None,
            recorded_at: None,
        }
    }
}
