//! `scan` subcommand: run the loader over a page snapshot.

use std::fmt::Write as _;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use tracing::info;

use mos_filebrowser_config::Config;
use mos_filebrowser_core::dom::Document;
use mos_filebrowser_core::host::memory::{
    BroadcastEvents, ManualTimers, MemoryLocation, MemorySessionStore,
};
use mos_filebrowser_core::{FileBrowserLoader, NavigationTargets, ScanReport};

use crate::cli::OutputFormat;

/// Handle the scan subcommand.
pub(crate) fn handle_scan_command(
    config: &Config,
    snapshot: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = scan_snapshot(config, snapshot)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print!("{}", render_table(&report)),
    }
    Ok(())
}

/// Boot a loader on the snapshot and return its first scan.
pub(crate) fn scan_snapshot(config: &Config, snapshot: &Path) -> anyhow::Result<ScanReport> {
    let json = std::fs::read_to_string(snapshot)
        .with_context(|| format!("Failed to read snapshot {}", snapshot.display()))?;
    let document = Document::from_json(&json)
        .with_context(|| format!("Invalid snapshot {}", snapshot.display()))?;

    let targets = NavigationTargets {
        events: Rc::new(BroadcastEvents::default()),
        router: None,
        session: Rc::new(MemorySessionStore::new()),
        location: Rc::new(MemoryLocation::new()),
    };
    let mut loader = FileBrowserLoader::new(config, document, ManualTimers::new(), targets)
        .context("Invalid row rules")?;

    let report = loader
        .boot()
        .or_else(|| loader.on_document_ready())
        .unwrap_or_default();
    loader.shutdown();

    info!(
        "Scanned {}: {} controls injected",
        snapshot.display(),
        report.injected_count()
    );
    Ok(report)
}

fn render_table(report: &ScanReport) -> String {
    let mut out = String::new();
    if report.injected.is_empty() {
        out.push_str("No rows received a control.\n");
    } else {
        let _ = writeln!(out, "{:<8} {:<40} {}", "CATEGORY", "PATH", "SOURCE");
        let _ = writeln!(out, "{}", "-".repeat(72));
        for row in &report.injected {
            let _ = writeln!(
                out,
                "{:<8} {:<40} {}",
                row.category.as_str(),
                row.path,
                row.source
            );
        }
    }
    let _ = writeln!(
        out,
        "\ninjected: {}  skipped (no path): {}  skipped (duplicate): {}",
        report.injected_count(),
        report.skipped_no_path,
        report.skipped_duplicate
    );
    out
}
