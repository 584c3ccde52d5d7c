//! Resolution is a pure function of the RID and the table.

use proptest::prelude::*;
use pubtidy_rid::RidGraph;

fn arb_rid() -> impl Strategy<Value = String> {
    let family = prop::sample::select(vec![
        "ubuntu", "debian", "alpine", "rhel", "fedora", "osx", "linux", "linux-musl", "win",
        "freebsd",
    ]);
    let version = prop::option::of(prop::sample::select(vec!["3.18", "20.04", "11", "10.15", "99"]));
    let arch = prop::sample::select(vec!["x64", "x86", "arm", "arm64", "s390x"]);
    (family, version, arch).prop_map(|(f, v, a)| match v {
        Some(v) => format!("{f}.{v}-{a}"),
        None => format!("{f}-{a}"),
    })
}

proptest! {
    #[test]
    fn repeated_lookups_agree(rid in arb_rid()) {
        let g = RidGraph::builtin();
        let first = g.resolve(&rid);
        for _ in 0..3 {
            prop_assert_eq!(g.resolve(&rid), first.clone());
        }
        prop_assert_eq!(RidGraph::builtin().resolve(&rid), first);
    }

    #[test]
    fn resolved_rid_is_always_supported(rid in arb_rid()) {
        let g = RidGraph::builtin();
        if let Some(found) = g.resolve(&rid) {
            prop_assert!(g.is_supported(&found));
        }
    }
}

#[test]
fn scenario_distro_to_generic() {
    let g = RidGraph::from_json(
        r#"{ "ubuntu.20.04-x64": ["linux-x64"], "linux-x64": [] }"#,
        r#"["linux-x64"]"#,
    )
    .unwrap();
    assert_eq!(g.resolve("ubuntu.20.04-x64").as_deref(), Some("linux-x64"));
}
