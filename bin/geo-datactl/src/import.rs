//! ---
//! gd_section: "03-control-interfaces"
//! gd_subsection: "binary"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Control CLI for resolving and managing grid geo data."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use geo_data_common::config::AppConfig;
use geo_data_engine::{
    io::{load_line_geo_data, load_substation_geo_data},
    store::{GeoStore, JsonFileGeoStore},
};

use crate::store_path;

#[derive(Debug, Subcommand)]
pub enum ImportCommand {
    /// Import a JSON array of substation geo data.
    Substations(ImportOptions),
    /// Import a JSON array of line geo data.
    Lines(ImportOptions),
}

#[derive(Debug, Args)]
pub struct ImportOptions {
    /// File to import.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Geo store file (defaults to the configured store path).
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,
}

pub fn run(command: ImportCommand, config: &AppConfig) -> Result<()> {
    match command {
        ImportCommand::Substations(opts) => {
            let substations = load_substation_geo_data(&opts.input)
                .with_context(|| format!("failed to read {}", opts.input.display()))?;
            let mut store = open_store(opts.store, config)?;
            store.save_substations(&substations)?;
            println!(
                "Imported {} substations into {}",
                substations.len(),
                store.path().display()
            );
        }
        ImportCommand::Lines(opts) => {
            let lines = load_line_geo_data(&opts.input)
                .with_context(|| format!("failed to read {}", opts.input.display()))?;
            let mut store = open_store(opts.store, config)?;
            store.save_lines(&lines)?;
            println!("Imported {} lines into {}", lines.len(), store.path().display());
        }
    }
    Ok(())
}

fn open_store(explicit: Option<PathBuf>, config: &AppConfig) -> Result<JsonFileGeoStore> {
    let path = store_path(explicit, config);
    JsonFileGeoStore::open(&path).with_context(|| format!("failed to open geo store {}", path.display()))
}
