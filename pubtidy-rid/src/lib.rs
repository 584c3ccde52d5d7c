//! Runtime identifier (RID) compatibility.
//!
//! A [`RidGraph`] is a directed fallback graph: every RID lists the RIDs it
//! can fall back to, most specific first. Resolution walks that graph
//! breadth-first and stops at the first RID a patched host-resolver build is
//! published for. Everything here is pure and side-effect free.

mod builtin;
mod graph;

pub use graph::{RidGraph, RidTableError, strip_version};

/// Compatibility table file name, as published on the mirror.
pub const COMPATIBILITY_TABLE: &str = "runtime.compatibility.json";
/// Supported-RID list file name, as published on the mirror.
pub const SUPPORTED_TABLE: &str = "runtime.supported.json";

/// Platform file name of the host resolver for a RID.
pub fn host_fxr_file_name(rid: &str) -> &'static str {
    if rid.starts_with("win") {
        "hostfxr.dll"
    } else if rid.starts_with("osx") {
        "libhostfxr.dylib"
    } else {
        "libhostfxr.so"
    }
}
