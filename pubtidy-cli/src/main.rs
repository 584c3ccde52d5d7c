use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fs_err as fs;
use pubtidy_cli::config::{self, CliOverrides, ConfigMerger};
use pubtidy_types::report::{RunReport, RunStatus, ToolInfo};
use std::process::ExitCode;
use tracing::{debug, error, info};

#[derive(Debug, Parser)]
#[command(
    name = "pubtidy",
    version,
    about = "Moves a .NET publish directory's dependency assemblies into a subdirectory and repairs its manifests."
)]
struct Cli {
    /// Publish directory to tidy.
    target_dir: String,

    /// Subdirectory receiving relocated files (default: runtimes).
    subdir: Option<String>,

    /// Mirror of the patched host-resolver builds.
    #[arg(long, visible_alias = "gitcdn", env = "PUBTIDY_MIRROR")]
    mirror: Option<String>,

    /// Log level: Error, Detail or Info.
    #[arg(long, alias = "loglevel")]
    log_level: Option<String>,

    /// Skip the host-resolver patch. Manifests and files are still relocated.
    #[arg(long, alias = "nopatch", default_value_t = false)]
    no_patch: bool,

    /// Artifact cache directory (default: platform cache dir).
    #[arg(long)]
    cache_dir: Option<Utf8PathBuf>,

    /// Config file (default: ./pubtidy.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Write a JSON summary of the run to this file.
    #[arg(long)]
    report: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<u8> {
    let cli = Cli::parse();

    let cwd = current_dir()?;
    let file_config = config::load_or_default(cli.config.as_deref(), &cwd);

    let level = ConfigMerger::log_level(file_config.as_ref().ok(), cli.log_level.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(level.env_filter())
        .with_writer(std::io::stderr)
        .init();

    let file_config = file_config.context("load pubtidy.toml config")?;
    let merged = ConfigMerger::new(file_config).merge(CliOverrides {
        subdir: cli.subdir.as_deref().map(trim_quotes),
        mirror: cli.mirror,
        no_patch: cli.no_patch,
        cache_dir: cli.cache_dir,
        log_level: cli.log_level,
    })?;
    debug!(?merged, "merged config");

    let target_dir = absolute(&cli.target_dir)?;
    let settings = merged.into_settings(target_dir);
    let mirror = settings.http_mirror();

    let report = match pubtidy_core::run(&settings, &mirror, tool_info()) {
        Ok(report) => report,
        Err(e) => {
            let code = e.exit_code();
            error!("{:#}", anyhow::Error::from(e));
            return Ok(code);
        }
    };

    if let Some(path) = &cli.report {
        write_json(path, &report)?;
    }

    Ok(summarize(&report))
}

fn summarize(report: &RunReport) -> u8 {
    match report.status {
        RunStatus::AlreadyProcessed => info!("already processed"),
        RunStatus::NothingToDo => info!("nothing to do"),
        RunStatus::Completed => {}
    }
    if report.has_fatal() {
        for fatal in &report.fatal {
            error!("{}", fatal);
        }
        return 1;
    }
    0
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "pubtidy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn trim_quotes(s: &str) -> String {
    s.trim().trim_matches('"').to_string()
}

fn current_dir() -> anyhow::Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("current directory is not UTF-8: {}", p.display()))
}

fn absolute(raw: &str) -> anyhow::Result<Utf8PathBuf> {
    let trimmed = trim_quotes(raw);
    if trimmed.is_empty() {
        anyhow::bail!("target directory must not be empty");
    }
    let abs = std::path::absolute(&trimmed).with_context(|| format!("resolve {}", trimmed))?;
    Utf8PathBuf::from_path_buf(abs)
        .map_err(|p| anyhow::anyhow!("target directory is not UTF-8: {}", p.display()))
}

fn write_json<T: serde::Serialize>(path: &Utf8Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent))?;
    }
    let json = serde_json::to_string_pretty(value).context("serialize report")?;
    fs::write(path, json).with_context(|| format!("write {}", path))?;
    Ok(())
}
