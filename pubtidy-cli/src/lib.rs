//! Library half of the `pubtidy` binary: configuration loading and log
//! level handling, kept out of `main.rs` so they can be tested directly.

pub mod config;
pub mod log_level;
