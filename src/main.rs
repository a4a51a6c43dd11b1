//! MOS FileBrowser - file browser shortcuts for the MOS web UI
//!
//! Main entry point for the MOS FileBrowser CLI.

mod cli;
mod cmd_scan;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mos_filebrowser_config::{Config, ConfigLoader, ConfigValidator, PluginManifest};
use mos_filebrowser_core::{plugin_url, NavigationIntent};

use crate::cli::{Cli, Commands};

/// Get the MOS FileBrowser home directory (~/.mos-filebrowser).
fn home_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".mos-filebrowser"))
        .unwrap_or_else(|| PathBuf::from(".mos-filebrowser"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.mos-filebrowser/debug/ with daily rotation.
fn init_tracing() -> anyhow::Result<()> {
    let log_dir = home_dir().join("debug");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("mos-filebrowser")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop; keep it for the whole run.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console on stderr so command output stays pipeable.
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Expand `~` in a user-supplied path.
fn expand_cli_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(ConfigLoader::expand_path(raw)),
        None => path.to_path_buf(),
    }
}

/// Load configuration. An explicit path must load; the default location
/// falls back to defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            let path = expand_cli_path(path);
            ConfigLoader::load(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => {
            let path = ConfigLoader::default_path();
            if path.exists() {
                Ok(ConfigLoader::load_or_default(&path))
            } else {
                debug!("No configuration at {}, using defaults", path.display());
                Ok(Config::default())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("File logging disabled: {:#}", e);
    }

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Manifest { out_dir } => handle_manifest(&config, &expand_cli_path(&out_dir)),
        Commands::Scan { snapshot, format } => {
            cmd_scan::handle_scan_command(&config, &expand_cli_path(&snapshot), format)
        }
        Commands::Url { path } => handle_url(&config, &path),
        Commands::Validate => handle_validate(&config),
    }
}

/// Write `manifest.json` into the output directory.
fn handle_manifest(config: &Config, out_dir: &Path) -> anyhow::Result<()> {
    let manifest = PluginManifest::from_plugin(&config.plugin);
    let path = manifest
        .write_to(out_dir)
        .with_context(|| format!("Failed to write manifest into {}", out_dir.display()))?;
    println!("{}", path.display());
    Ok(())
}

/// Print the fallback URL and the event payload for a path.
fn handle_url(config: &Config, path: &str) -> anyhow::Result<()> {
    println!("{}", plugin_url(&config.plugin.name, path));
    println!("{}", serde_json::to_string(&NavigationIntent::new(path))?);
    Ok(())
}

/// Print validation errors and warnings. Fails when any error was found.
fn handle_validate(config: &Config) -> anyhow::Result<()> {
    let result = ConfigValidator::validate(config)?;

    for warning in &result.warnings {
        warn!("{}: {}", warning.path, warning.message);
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for err in &result.errors {
        error!("{}: {}", err.path, err.message);
        println!("error: {}: {}", err.path, err.message);
    }

    if !result.is_valid() {
        anyhow::bail!("Configuration has {} error(s)", result.errors.len());
    }
    info!("Configuration is valid");
    println!("Configuration is valid ({} warning(s))", result.warnings.len());
    Ok(())
}
