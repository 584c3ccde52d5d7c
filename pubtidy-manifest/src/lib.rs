//! Manifest handling for pubtidy.
//!
//! Responsibilities:
//! - Find `*.runtimeconfig.json` and `*.deps.json` under a publish directory.
//! - Add the relocation subdirectory to the runtime config probing paths.
//! - Extract relocatable files, host-resolver version and RID from a deps
//!   manifest, and keep its library paths consistent with the new layout.
//!
//! Both manifests are modelled as typed documents covering only the fields
//! pubtidy reads or writes. Everything else is carried through untouched,
//! in its original key order.

mod error;
mod json;
mod locate;

pub mod deps;
pub mod runtime_config;

pub use deps::{DepsManifest, patch_deps, patch_deps_str};
pub use error::{ManifestError, ManifestResult};
pub use locate::{find_deps_manifests, find_runtime_configs};
pub use runtime_config::{RuntimeConfigManifest, patch_runtime_config, patch_runtime_config_str};
