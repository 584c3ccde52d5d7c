//! Embeddable core library for pubtidy.
//!
//! Provides a clap-free entry point that tidies a publish directory:
//! relocate dependency assemblies into a subdirectory, repair the
//! manifests so the loader still finds them, and swap in the patched host
//! resolver.
//!
//! # Ports
//!
//! Network access goes through [`Mirror`](pubtidy_artifacts::Mirror);
//! [`RunSettings::http_mirror`](settings::RunSettings::http_mirror) builds
//! the default HTTPS implementation.
//!
//! # Entry points
//!
//! - [`run`](pipeline::run): process one target directory and return a
//!   [`RunReport`](pubtidy_types::report::RunReport)

pub mod error;
pub mod fs_util;
pub mod hostfxr;
pub mod pipeline;
pub mod relocate;
pub mod settings;

pub use error::ToolError;
pub use pipeline::run;
pub use settings::RunSettings;

// Re-exported so embedders don't need pubtidy-artifacts directly.
pub use pubtidy_artifacts::{HttpMirror, Mirror};
