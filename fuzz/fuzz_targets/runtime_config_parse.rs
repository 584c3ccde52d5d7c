#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else { return };

    if let Ok(Some(updated)) = pubtidy_manifest::patch_runtime_config_str(s, "runtimes") {
        let again = pubtidy_manifest::patch_runtime_config_str(&updated, "runtimes")
            .expect("rewritten config parses");
        assert!(again.is_none(), "probing path append is not idempotent");
    }
});
