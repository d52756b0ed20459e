//! ---
//! gd_section: "03-control-interfaces"
//! gd_subsection: "binary"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Control CLI for resolving and managing grid geo data."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use geo_data_common::{config::AppConfig, logging};

mod import;
mod resolve;

const DEFAULT_CONFIG_PATH: &str = "configs/geo-data.toml";

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Grid geo-data resolution utility",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to GEO_DATA_CONFIG, then configs/geo-data.toml).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write a rolling JSON log file into the configured log directory.
    #[arg(long = "log-file", global = true, action = ArgAction::SetTrue)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute missing substation coordinates and assemble line geo data.
    Resolve(resolve::ResolveArgs),
    /// List stored line geo data for the topology's lines.
    Lines(resolve::LinesArgs),
    #[command(subcommand, about = "Load geo data files into the store")]
    Import(import::ImportCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    if cli.log_file {
        logging::init_tracing("geo-datactl", &config.logging)?;
    } else {
        logging::init_stderr();
    }

    match cli.command {
        Commands::Resolve(args) => resolve::run_resolve(args, &config)?,
        Commands::Lines(args) => resolve::run_lines(args, &config)?,
        Commands::Import(cmd) => import::run(cmd, &config)?,
    }
    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit {
        Some(path) => AppConfig::load(&[path]),
        None => AppConfig::load_or_default(&[DEFAULT_CONFIG_PATH]),
    }
}

/// Store path from the command line, falling back to the configured one.
fn store_path(explicit: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    explicit.unwrap_or_else(|| config.store.path.clone())
}
