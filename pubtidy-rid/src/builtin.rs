//! Fallback table used when no mirror copy of the RID tables is cached.
//!
//! Shaped after the runtime's own RID graph: versioned distro RIDs point at
//! their version-less family, families point at the generic OS-arch RID,
//! which points at the OS.

use indexmap::IndexMap;

/// RIDs with a published patched host resolver.
pub(crate) const SUPPORTED: &[&str] = &[
    "win-x86",
    "win-x64",
    "win-arm",
    "win-arm64",
    "osx-x64",
    "osx-arm64",
    "linux-x64",
    "linux-arm",
    "linux-arm64",
    "linux-musl-x64",
    "linux-musl-arm64",
];

const BASE: &[(&str, &[&str])] = &[
    ("any", &[]),
    ("unix", &["any"]),
    ("unix-x64", &["unix"]),
    ("unix-arm64", &["unix"]),
    ("win", &["any"]),
    ("win-x86", &["win"]),
    ("win-x64", &["win"]),
    ("win-arm", &["win"]),
    ("win-arm64", &["win"]),
    ("osx", &["unix"]),
    ("osx-x64", &["osx", "unix-x64"]),
    ("osx-arm64", &["osx", "unix-arm64"]),
    ("linux", &["unix"]),
    ("linux-x64", &["linux", "unix-x64"]),
    ("linux-arm", &["linux"]),
    ("linux-arm64", &["linux", "unix-arm64"]),
    ("linux-musl-x64", &["linux-x64"]),
    ("linux-musl-arm64", &["linux-arm64"]),
    ("alpine-x64", &["linux-musl-x64"]),
    ("alpine-arm64", &["linux-musl-arm64"]),
    ("debian-x64", &["linux-x64"]),
    ("debian-arm", &["linux-arm"]),
    ("debian-arm64", &["linux-arm64"]),
    ("ubuntu-x64", &["debian-x64"]),
    ("ubuntu-arm", &["debian-arm"]),
    ("ubuntu-arm64", &["debian-arm64"]),
    ("rhel-x64", &["linux-x64"]),
    ("rhel-arm64", &["linux-arm64"]),
    ("centos-x64", &["rhel-x64"]),
    ("ol-x64", &["rhel-x64"]),
    ("fedora-x64", &["linux-x64"]),
    ("fedora-arm64", &["linux-arm64"]),
    ("opensuse-x64", &["linux-x64"]),
    ("sles-x64", &["linux-x64"]),
];

/// Versioned families: `(family, versions, archs)` expands to
/// `family.version-arch -> [family-arch]`.
const VERSIONED: &[(&str, &[&str], &[&str])] = &[
    ("win7", &[""], &["x86", "x64"]),
    ("win8", &[""], &["x86", "x64", "arm"]),
    ("win81", &[""], &["x86", "x64", "arm"]),
    ("win10", &[""], &["x86", "x64", "arm", "arm64"]),
    (
        "osx",
        &["10.10", "10.11", "10.12", "10.13", "10.14", "10.15", "11.0", "12", "13", "14"],
        &["x64", "arm64"],
    ),
    (
        "alpine",
        &["3.9", "3.10", "3.11", "3.12", "3.13", "3.14", "3.15", "3.16", "3.17", "3.18"],
        &["x64", "arm64"],
    ),
    ("debian", &["8", "9", "10", "11", "12"], &["x64", "arm", "arm64"]),
    (
        "ubuntu",
        &["14.04", "16.04", "18.04", "20.04", "21.04", "22.04", "24.04"],
        &["x64", "arm", "arm64"],
    ),
    ("rhel", &["7", "8", "9"], &["x64", "arm64"]),
    ("centos", &["7", "8"], &["x64"]),
    ("ol", &["7", "8"], &["x64"]),
    (
        "fedora",
        &["27", "28", "29", "30", "31", "32", "33", "34", "35", "36", "37", "38", "39"],
        &["x64", "arm64"],
    ),
    ("opensuse", &["15.0", "15.1", "15.2", "15.3", "15.4", "15.5"], &["x64"]),
    ("sles", &["12", "15"], &["x64"]),
];

pub(crate) fn fallbacks() -> IndexMap<String, Vec<String>> {
    let mut out: IndexMap<String, Vec<String>> = BASE
        .iter()
        .map(|(rid, parents)| {
            (
                rid.to_string(),
                parents.iter().map(|p| p.to_string()).collect(),
            )
        })
        .collect();

    for (family, versions, archs) in VERSIONED {
        for version in *versions {
            for arch in *archs {
                // Windows names carry the version in the family itself.
                let (rid, parent) = if version.is_empty() {
                    (format!("{family}-{arch}"), format!("win-{arch}"))
                } else {
                    (format!("{family}.{version}-{arch}"), format!("{family}-{arch}"))
                };
                out.entry(rid).or_default().push(parent);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::RidGraph;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_supported_rid_is_a_node() {
        let g = RidGraph::builtin();
        for rid in super::SUPPORTED {
            assert!(g.is_known(rid), "{rid} missing from the graph");
            assert_eq!(g.resolve(rid).as_deref(), Some(*rid));
        }
    }

    #[test]
    fn every_parent_is_a_node() {
        let fallbacks = super::fallbacks();
        for (rid, parents) in &fallbacks {
            for p in parents {
                assert!(fallbacks.contains_key(p), "{rid} -> {p} dangles");
            }
        }
    }

    #[test]
    fn common_distros_resolve() {
        let g = RidGraph::builtin();
        let cases = [
            ("ubuntu.20.04-x64", "linux-x64"),
            ("ubuntu.22.04-arm64", "linux-arm64"),
            ("debian.11-arm", "linux-arm"),
            ("alpine.3.18-x64", "linux-musl-x64"),
            ("centos.7-x64", "linux-x64"),
            ("osx.10.15-x64", "osx-x64"),
            ("osx.14-arm64", "osx-arm64"),
            ("win10-x64", "win-x64"),
            ("win7-x86", "win-x86"),
        ];
        for (rid, expected) in cases {
            assert_eq!(g.resolve(rid).as_deref(), Some(expected), "{rid}");
        }
    }

    #[test]
    fn bare_os_has_no_artifact() {
        let g = RidGraph::builtin();
        assert_eq!(g.resolve("linux"), None);
        assert_eq!(g.resolve("freebsd-x64"), None);
    }
}
