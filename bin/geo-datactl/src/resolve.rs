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
use clap::Args;
use geo_data_common::config::AppConfig;
use geo_data_engine::{
    io::load_topology_from_file,
    model::{Country, NetworkTopology},
    orchestrator::{CountryFilter, GeoDataOrchestrator, GeoDataSnapshot},
    reports::ReportExporter,
    store::{GeoStore, JsonFileGeoStore},
};
use tracing::info;

use crate::store_path;

/// Inputs shared by commands that read a topology against the store.
#[derive(Debug, Args)]
pub struct TopologyArgs {
    /// Topology snapshot (JSON or YAML).
    #[arg(long, value_name = "FILE")]
    topology: PathBuf,

    /// Geo store file (defaults to the configured store path).
    #[arg(long, value_name = "FILE")]
    store: Option<PathBuf>,

    /// Restrict to substations of these countries (ISO alpha-2, repeatable).
    #[arg(long = "country", value_name = "CC")]
    countries: Vec<Country>,
}

impl TopologyArgs {
    fn load(&self, config: &AppConfig) -> Result<(NetworkTopology, JsonFileGeoStore, CountryFilter)> {
        let topology = load_topology_from_file(&self.topology)
            .with_context(|| format!("failed to load topology {}", self.topology.display()))?;
        let path = store_path(self.store.clone(), config);
        let store = JsonFileGeoStore::open(&path)
            .with_context(|| format!("failed to open geo store {}", path.display()))?;
        let countries = self.countries.iter().cloned().collect();
        Ok((topology, store, countries))
    }
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    input: TopologyArgs,

    /// Directory receiving substations.json, lines.json and resolution.json.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Override the configured sweep cap per phase.
    #[arg(long = "max-iterations", value_name = "N")]
    max_iterations: Option<usize>,
}

#[derive(Debug, Args)]
pub struct LinesArgs {
    #[command(flatten)]
    input: TopologyArgs,
}

pub fn run_resolve(args: ResolveArgs, config: &AppConfig) -> Result<()> {
    let (topology, store, countries) = args.input.load(config)?;
    let mut engine = config.engine.clone();
    if let Some(max_iterations) = args.max_iterations {
        engine.max_iterations = max_iterations;
    }

    let snapshot = GeoDataOrchestrator::new(engine)
        .resolve_from_store(&topology, &store, &countries)
        .context("geo data resolution failed")?;
    render_summary(&snapshot);

    if let Some(dir) = &args.output {
        let exporter = ReportExporter::new(&snapshot, topology.version.clone());
        exporter
            .export_all(dir)
            .with_context(|| format!("failed to write reports to {}", dir.display()))?;
        info!(run_id = %exporter.run_id(), "reports exported");
        println!("Reports written to {}", dir.display());
    }
    Ok(())
}

pub fn run_lines(args: LinesArgs, config: &AppConfig) -> Result<()> {
    let (topology, store, countries) = args.input.load(config)?;
    let stored = store.lines()?;
    let lines = GeoDataOrchestrator::new(config.engine.clone()).stored_lines(&topology, &stored, &countries);
    println!("{}", serde_json::to_string_pretty(&lines)?);
    Ok(())
}

fn render_summary(snapshot: &GeoDataSnapshot) {
    let resolution = &snapshot.substations;
    println!(
        "Known: {}\nComputed: {}\nUnresolved: {}\nAccuracy: {}%{}\nLines: {}",
        resolution.known,
        resolution.computed,
        resolution.unresolved.len(),
        resolution.accuracy.accuracy,
        if resolution.accuracy.low_confidence {
            " (low confidence)"
        } else {
            ""
        },
        snapshot.lines.len()
    );
    for id in &resolution.estimation.skipped_missing_country {
        println!("Skipped (no country): {id}");
    }
}
