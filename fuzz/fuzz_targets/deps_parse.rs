#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else { return };

    let Ok((facts, updated)) = pubtidy_manifest::patch_deps_str(s, "runtimes") else {
        return;
    };

    // A rewritten manifest must parse again, yield the same facts, and need
    // no further rewrite.
    if let Some(updated) = updated {
        let (again, second) =
            pubtidy_manifest::patch_deps_str(&updated, "runtimes").expect("rewritten manifest parses");
        assert_eq!(facts, again);
        assert!(second.is_none(), "library path rewrite is not idempotent");
    }
});
