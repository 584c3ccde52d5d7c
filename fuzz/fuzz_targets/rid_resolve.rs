#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

static GRAPH: OnceLock<pubtidy_rid::RidGraph> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    let rid = String::from_utf8_lossy(data);
    let graph = GRAPH.get_or_init(pubtidy_rid::RidGraph::builtin);

    let first = graph.resolve(&rid);
    if let Some(found) = &first {
        assert!(graph.is_supported(found));
    }
    assert_eq!(first, graph.resolve(&rid));
});
