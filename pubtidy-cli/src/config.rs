//! Configuration file loading for pubtidy.
//!
//! Discovers and loads `pubtidy.toml` from the working directory, or from an
//! explicit path. Merges config file settings with CLI arguments (CLI takes
//! precedence).

use crate::log_level::LogLevel;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pubtidy_core::RunSettings;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "pubtidy.toml";

pub const DEFAULT_SUBDIR: &str = pubtidy_types::names::DEFAULT_SUBDIR;

/// Top-level configuration from pubtidy.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PubtidyConfig {
    pub relocation: RelocationConfig,
    pub patch: PatchConfig,
    pub cache: CacheConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelocationConfig {
    /// Subdirectory receiving relocated files.
    pub subdir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatchConfig {
    /// Patch the host resolver. Defaults to true.
    pub enabled: Option<bool>,

    /// Base URL of the artifact mirror.
    pub mirror: Option<String>,

    /// Connect/read timeout for mirror requests.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `Error`, `Detail` or `Info`.
    pub level: Option<String>,
}

/// Discover the pubtidy.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a pubtidy.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<PubtidyConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<PubtidyConfig> {
    let config: PubtidyConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load `explicit` if given, else discover in `dir`, else defaults.
pub fn load_or_default(
    explicit: Option<&Utf8Path>,
    dir: &Utf8Path,
) -> anyhow::Result<PubtidyConfig> {
    match explicit {
        Some(path) => load_config(path),
        None => match discover_config(dir) {
            Some(path) => load_config(&path),
            None => Ok(PubtidyConfig::default()),
        },
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub subdir: Option<String>,
    pub mirror: Option<String>,
    pub no_patch: bool,
    pub cache_dir: Option<Utf8PathBuf>,
    pub log_level: Option<String>,
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    pub subdir: String,
    pub mirror: String,
    pub no_patch: bool,
    pub cache_dir: Option<Utf8PathBuf>,
    pub timeout: Duration,
    pub log_level: LogLevel,
}

impl MergedConfig {
    pub fn into_settings(self, target_dir: Utf8PathBuf) -> RunSettings {
        RunSettings {
            target_dir,
            subdir: self.subdir,
            mirror: self.mirror,
            no_patch: self.no_patch,
            cache_dir: self.cache_dir,
            timeout: self.timeout,
        }
    }
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: PubtidyConfig,
}

impl ConfigMerger {
    pub fn new(config: PubtidyConfig) -> Self {
        Self { config }
    }

    /// Log level alone, needed before the rest of the merge so logging can
    /// start early.
    pub fn log_level(config: Option<&PubtidyConfig>, cli: Option<&str>) -> LogLevel {
        cli.or_else(|| config.and_then(|c| c.log.level.as_deref()))
            .map(LogLevel::parse_lenient)
            .unwrap_or_default()
    }

    /// CLI values win; `--no-patch` wins over `patch.enabled = true`.
    pub fn merge(self, cli: CliOverrides) -> anyhow::Result<MergedConfig> {
        let defaults = RunSettings::default();
        let log_level = Self::log_level(Some(&self.config), cli.log_level.as_deref());

        let subdir = cli
            .subdir
            .or(self.config.relocation.subdir)
            .unwrap_or(defaults.subdir);
        validate_subdir(&subdir)?;

        let mirror = cli
            .mirror
            .or(self.config.patch.mirror)
            .unwrap_or(defaults.mirror);
        if mirror.trim().is_empty() {
            anyhow::bail!("mirror URL must not be empty");
        }

        let timeout = match self.config.patch.timeout_secs {
            Some(0) => anyhow::bail!("patch.timeout_secs must be greater than zero"),
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        Ok(MergedConfig {
            subdir,
            mirror,
            no_patch: cli.no_patch || self.config.patch.enabled == Some(false),
            cache_dir: cli.cache_dir.or(self.config.cache.dir),
            timeout,
            log_level,
        })
    }
}

/// A single relative path segment.
fn validate_subdir(subdir: &str) -> anyhow::Result<()> {
    let trimmed = subdir.trim_matches(['/', '\\']);
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed.split(['/', '\\']).any(|part| part == "..")
        || subdir.starts_with(['/', '\\'])
        || Utf8Path::new(subdir).is_absolute()
    {
        anyhow::bail!("invalid relocation subdirectory '{}'", subdir);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_example_config() {
        let contents = r#"
[relocation]
subdir = "libs"

[patch]
enabled = true
mirror = "https://gitee.com/liesauer/HostFXRPatcher"
timeout_secs = 10

[cache]
dir = "/var/cache/pubtidy"

[log]
level = "Detail"
"#;

        let config = parse_config(contents).expect("parse");
        assert_eq!(config.relocation.subdir.as_deref(), Some("libs"));
        assert_eq!(config.patch.enabled, Some(true));
        assert_eq!(
            config.patch.mirror.as_deref(),
            Some("https://gitee.com/liesauer/HostFXRPatcher")
        );
        assert_eq!(config.patch.timeout_secs, Some(10));
        assert_eq!(
            config.cache.dir,
            Some(Utf8PathBuf::from("/var/cache/pubtidy"))
        );
        assert_eq!(config.log.level.as_deref(), Some("Detail"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").expect("parse");
        assert!(config.relocation.subdir.is_none());
        assert!(config.patch.enabled.is_none());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = parse_config("[patch]\nenable = false\n").expect_err("typo");
        assert!(format!("{err:#}").contains("enable"));
    }

    #[test]
    fn test_merge_defaults() {
        let merged = ConfigMerger::new(PubtidyConfig::default())
            .merge(CliOverrides::default())
            .expect("merge");

        assert_eq!(merged.subdir, "runtimes");
        assert_eq!(merged.mirror, "https://github.com/nulastudio/HostFXRPatcher");
        assert!(!merged.no_patch);
        assert!(merged.cache_dir.is_none());
        assert_eq!(merged.timeout, Duration::from_secs(30));
        assert_eq!(merged.log_level, LogLevel::Error);
    }

    #[test]
    fn test_merge_cli_overrides_config() {
        let config = parse_config(
            r#"
[relocation]
subdir = "libs"
[patch]
mirror = "https://config.example"
[cache]
dir = "/config/cache"
[log]
level = "Info"
"#,
        )
        .expect("parse");

        let merged = ConfigMerger::new(config)
            .merge(CliOverrides {
                subdir: Some("deps".into()),
                mirror: Some("https://cli.example".into()),
                cache_dir: Some("/cli/cache".into()),
                log_level: Some("detail".into()),
                no_patch: false,
            })
            .expect("merge");

        assert_eq!(merged.subdir, "deps");
        assert_eq!(merged.mirror, "https://cli.example");
        assert_eq!(merged.cache_dir, Some(Utf8PathBuf::from("/cli/cache")));
        assert_eq!(merged.log_level, LogLevel::Detail);
    }

    #[test]
    fn test_merge_config_used_when_cli_absent() {
        let config = parse_config("[relocation]\nsubdir = \"libs\"\n[patch]\nenabled = false\n")
            .expect("parse");

        let merged = ConfigMerger::new(config)
            .merge(CliOverrides::default())
            .expect("merge");

        assert_eq!(merged.subdir, "libs");
        assert!(merged.no_patch);
    }

    #[test]
    fn test_no_patch_flag_wins() {
        let config = parse_config("[patch]\nenabled = true\n").expect("parse");
        let merged = ConfigMerger::new(config)
            .merge(CliOverrides {
                no_patch: true,
                ..Default::default()
            })
            .expect("merge");
        assert!(merged.no_patch);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for subdir in ["", "/abs", "..", "a/../b", "."] {
            let result = ConfigMerger::new(PubtidyConfig::default()).merge(CliOverrides {
                subdir: Some(subdir.into()),
                ..Default::default()
            });
            assert!(result.is_err(), "{subdir:?} should be rejected");
        }

        let config = parse_config("[patch]\ntimeout_secs = 0\n").expect("parse");
        assert!(
            ConfigMerger::new(config)
                .merge(CliOverrides::default())
                .is_err()
        );
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_load_or_default_prefers_explicit_path() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        std::fs::write(root.join(CONFIG_FILE_NAME), "[relocation]\nsubdir = \"found\"\n")
            .expect("write");
        let explicit = root.join("other.toml");
        std::fs::write(&explicit, "[relocation]\nsubdir = \"explicit\"\n").expect("write");

        let found = load_or_default(None, &root).expect("discover");
        assert_eq!(found.relocation.subdir.as_deref(), Some("found"));

        let chosen = load_or_default(Some(&explicit), &root).expect("explicit");
        assert_eq!(chosen.relocation.subdir.as_deref(), Some("explicit"));

        assert!(load_or_default(Some(&root.join("missing.toml")), &root).is_err());
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let cfg = load_or_default(None, &root).expect("load default");
        assert!(cfg.relocation.subdir.is_none());
    }
}
