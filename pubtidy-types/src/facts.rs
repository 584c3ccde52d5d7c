use serde::{Deserialize, Serialize};

/// Facts extracted from one deps manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepsFacts {
    /// Relative asset paths, deduplicated, first-seen order.
    pub deps_files: Vec<String>,
    /// Host-resolver package version, empty when unknown.
    pub fxr_version: String,
    /// Runtime identifier of the runtime target, empty for portable apps.
    pub rid: String,
}

impl DepsFacts {
    /// Both the host-resolver version and the RID are known.
    pub fn has_fxr_info(&self) -> bool {
        !self.fxr_version.is_empty() && !self.rid.is_empty()
    }
}
