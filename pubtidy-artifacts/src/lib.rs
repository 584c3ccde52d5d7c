//! Patched host-resolver artifacts.
//!
//! - [`Mirror`] is the port to the remote distributor; [`HttpMirror`] talks
//!   to a git-hosting mirror over HTTPS.
//! - [`ArtifactCache`] is the on-disk store, one directory per
//!   `(fxr_version, rid)` with a provenance record beside the binary.
//! - [`ArtifactStore`] ties the two together and enforces the
//!   download-then-record contract.

mod cache;
mod error;
mod mirror;
mod store;

pub use cache::{ArtifactCache, default_cache_root};
pub use error::{ArtifactError, ArtifactResult};
pub use mirror::{DEFAULT_MIRROR, DEFAULT_TIMEOUT_SECS, HttpMirror, Mirror, paths};
pub use store::{ArtifactStore, EnsureOutcome};
