//! CLI definitions for MOS FileBrowser.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// MOS FileBrowser CLI.
#[derive(Parser)]
#[command(name = "mos-filebrowser")]
#[command(about = "Build and inspect the MOS FileBrowser plugin loader")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: <config dir>/mos-filebrowser/plugin.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Write the plugin manifest for the registry
    Manifest {
        /// Output directory
        #[arg(short, long, default_value = "dist")]
        out_dir: PathBuf,
    },

    /// Run one scan over a JSON page snapshot and print the report
    Scan {
        /// Path to the snapshot file
        snapshot: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the navigation URL and intent for a path
    Url {
        /// Absolute path to browse
        path: String,
    },

    /// Validate the configuration
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}
