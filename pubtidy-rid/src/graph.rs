use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet, VecDeque};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RidTableError {
    #[error("invalid compatibility table: {0}")]
    Compatibility(#[source] serde_json::Error),

    #[error("invalid supported-rid list: {0}")]
    Supported(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RidGraph {
    fallbacks: IndexMap<String, Vec<String>>,
    supported: BTreeSet<String>,
}

impl RidGraph {
    pub fn new<I, S>(fallbacks: IndexMap<String, Vec<String>>, supported: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fallbacks = fallbacks
            .into_iter()
            .map(|(rid, parents)| {
                let parents: Vec<String> = parents.into_iter().filter(|p| *p != rid).collect();
                (rid, parents)
            })
            .collect();
        Self {
            fallbacks,
            supported: supported.into_iter().map(Into::into).collect(),
        }
    }

    /// The table compiled into this crate.
    pub fn builtin() -> Self {
        Self::new(crate::builtin::fallbacks(), crate::builtin::SUPPORTED.iter().copied())
    }

    /// Parse the mirror's `runtime.compatibility.json` (`{ rid: [fallback, ..] }`)
    /// and `runtime.supported.json` (`[rid, ..]`).
    pub fn from_json(compatibility: &str, supported: &str) -> Result<Self, RidTableError> {
        let fallbacks: IndexMap<String, Vec<String>> =
            serde_json::from_str(compatibility).map_err(RidTableError::Compatibility)?;
        let supported: Vec<String> =
            serde_json::from_str(supported).map_err(RidTableError::Supported)?;
        Ok(Self::new(fallbacks, supported))
    }

    pub fn is_supported(&self, rid: &str) -> bool {
        self.supported.contains(rid)
    }

    pub fn is_known(&self, rid: &str) -> bool {
        self.fallbacks.contains_key(rid) || self.supported.contains(rid)
    }

    pub fn fallbacks_of(&self, rid: &str) -> &[String] {
        self.fallbacks.get(rid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nearest RID with a published artifact, or `None`.
    ///
    /// Exact match first, then the fallback graph breadth-first in declared
    /// order. A RID the graph has never heard of starts from its
    /// version-stripped form (`ubuntu.24.04-x64` -> `ubuntu-x64`).
    pub fn resolve(&self, rid: &str) -> Option<String> {
        if rid.is_empty() {
            return None;
        }
        if self.is_supported(rid) {
            return Some(rid.to_string());
        }

        let start = if self.is_known(rid) {
            rid.to_string()
        } else {
            let stripped = strip_version(rid)?;
            debug!(rid, stripped = %stripped, "unknown rid, trying version-less form");
            stripped
        };

        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut seen: HashSet<&str> = HashSet::new();
        if self.is_supported(&start) {
            return Some(start);
        }
        for parent in self.fallbacks_of(&start) {
            if seen.insert(parent.as_str()) {
                queue.push_back(parent.as_str());
            }
        }

        while let Some(candidate) = queue.pop_front() {
            if self.is_supported(candidate) {
                debug!(rid, compatible = candidate, "resolved compatible rid");
                return Some(candidate.to_string());
            }
            for parent in self.fallbacks_of(candidate) {
                if seen.insert(parent.as_str()) {
                    queue.push_back(parent.as_str());
                }
            }
        }
        None
    }
}

/// `name.version-arch` -> `name-arch`; `None` when there is no version part.
pub fn strip_version(rid: &str) -> Option<String> {
    let (os, arch) = rid.rsplit_once('-')?;
    let (name, _version) = os.split_once('.')?;
    if name.is_empty() || arch.is_empty() {
        return None;
    }
    Some(format!("{name}-{arch}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(entries: &[(&str, &[&str])], supported: &[&str]) -> RidGraph {
        let fallbacks = entries
            .iter()
            .map(|(rid, parents)| {
                (
                    rid.to_string(),
                    parents.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect();
        RidGraph::new(fallbacks, supported.iter().copied())
    }

    #[test]
    fn exact_match_wins() {
        let g = graph(&[("linux-x64", &["linux"])], &["linux-x64", "linux"]);
        assert_eq!(g.resolve("linux-x64").as_deref(), Some("linux-x64"));
    }

    #[test]
    fn distro_falls_back_to_generic_linux() {
        let g = graph(
            &[("ubuntu.20.04-x64", &["linux-x64"]), ("linux-x64", &[])],
            &["linux-x64"],
        );
        assert_eq!(g.resolve("ubuntu.20.04-x64").as_deref(), Some("linux-x64"));
    }

    #[test]
    fn walk_is_breadth_first_in_declared_order() {
        let g = graph(
            &[
                ("a", &["b", "c"]),
                ("b", &["d"]),
                ("c", &[]),
                ("d", &[]),
            ],
            &["c", "d"],
        );
        assert_eq!(g.resolve("a").as_deref(), Some("c"));
    }

    #[test]
    fn cycles_terminate() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])], &["z"]);
        assert_eq!(g.resolve("a"), None);
    }

    #[test]
    fn unknown_versioned_rid_uses_version_less_node() {
        let g = graph(&[("ubuntu-x64", &["linux-x64"])], &["linux-x64"]);
        assert_eq!(g.resolve("ubuntu.99.10-x64").as_deref(), Some("linux-x64"));
    }

    #[test]
    fn unknown_rid_without_version_is_unresolvable() {
        let g = graph(&[("linux-x64", &[])], &["linux-x64"]);
        assert_eq!(g.resolve("plan9-mips"), None);
        assert_eq!(g.resolve(""), None);
    }

    #[test]
    fn self_references_are_dropped() {
        let g = graph(&[("win-x64", &["win-x64", "win"])], &["win"]);
        assert_eq!(g.fallbacks_of("win-x64"), ["win".to_string()]);
    }

    #[test]
    fn strip_version_shapes() {
        assert_eq!(strip_version("osx.10.15-x64").as_deref(), Some("osx-x64"));
        assert_eq!(strip_version("alpine.3.18-arm64").as_deref(), Some("alpine-arm64"));
        assert_eq!(strip_version("linux-musl-x64"), None);
        assert_eq!(strip_version("win"), None);
    }

    #[test]
    fn from_json_reads_both_tables() {
        let g = RidGraph::from_json(
            r#"{ "debian.11-x64": ["debian.11-x64", "debian-x64", "linux-x64"] }"#,
            r#"["linux-x64"]"#,
        )
        .unwrap();
        assert_eq!(g.resolve("debian.11-x64").as_deref(), Some("linux-x64"));
    }

    #[test]
    fn from_json_reports_which_table_is_broken() {
        let err = RidGraph::from_json("{}", "{").unwrap_err();
        assert!(matches!(err, RidTableError::Supported(_)));
        let err = RidGraph::from_json("[", "[]").unwrap_err();
        assert!(matches!(err, RidTableError::Compatibility(_)));
    }
}
