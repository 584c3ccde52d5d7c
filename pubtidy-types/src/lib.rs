//! Shared DTOs for the pubtidy workspace.
//!
//! # Design constraints
//! - Report and cache record types are serialized to disk.
//! - Be conservative with breaking changes.
//! - Prefer adding optional fields over changing semantics.

pub mod artifact;
pub mod facts;
pub mod report;
pub mod request;

/// Schema identifiers.
pub mod schema {
    pub const PUBTIDY_RUN_V1: &str = "pubtidy.run.v1";
    pub const PUBTIDY_ARTIFACT_RECORD_V1: &str = "pubtidy.artifact_record.v1";
}

/// File naming conventions of the managed runtime's publish layout.
pub mod names {
    /// Default relocation subdirectory.
    pub const DEFAULT_SUBDIR: &str = "runtimes";

    /// Zero-byte marker written into a processed target directory.
    pub const MARKER_FILE: &str = ".pubtidy";

    pub const RUNTIMECONFIG_SUFFIX: &str = ".runtimeconfig.json";
    pub const DEPS_SUFFIX: &str = ".deps.json";

    /// Suffix of the one-time host-resolver backup.
    pub const BACKUP_SUFFIX: &str = ".bak";

    /// Bootstrap binaries that must stay beside the entry point.
    pub const BOOTSTRAP_FRAGMENTS: &[&str] = &["apphost", "hostfxr", "hostpolicy"];

    /// Sidecar files that follow a relocated assembly.
    pub const SIDECAR_EXTENSIONS: &[&str] = &["pdb", "xml"];

    /// Main program base name for a deps manifest file name
    /// (`App.deps.json` -> `App`).
    pub fn main_program(deps_file_name: &str) -> &str {
        deps_file_name
            .strip_suffix(DEPS_SUFFIX)
            .unwrap_or(deps_file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::names;

    #[test]
    fn main_program_strips_deps_suffix() {
        assert_eq!(names::main_program("App.deps.json"), "App");
        assert_eq!(names::main_program("My.Cool.App.deps.json"), "My.Cool.App");
    }

    #[test]
    fn main_program_leaves_other_names_alone() {
        assert_eq!(names::main_program("App.json"), "App.json");
    }
}
