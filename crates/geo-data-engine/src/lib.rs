//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
//! Fills in coordinates for substations and lines that have none, by
//! propagating stored positions through the electrical network topology.
//!
//! The engine is pure over its inputs: it reads a topology snapshot and a set
//! of known coordinates, and returns a completed set without touching either.
//! Persisting the result is left to the caller.

pub mod accuracy;
pub mod errors;
pub mod estimator;
pub mod io;
pub mod model;
pub mod neighbours;
pub mod ordering;
pub mod orchestrator;
pub mod reports;
pub mod store;

use std::path::Path;

use geo_data_common::config::EngineConfig;
use tracing::info;

use crate::{
    model::NetworkTopology,
    orchestrator::{CountryFilter, GeoDataOrchestrator, GeoDataSnapshot},
    reports::ReportExporter,
    store::GeoStore,
};

pub use errors::{GeoDataError, Result};
pub use model::{Coordinate, Country, LineGeoData, SubstationGeoData, SubstationId};

/// Resolves substation and line geo data for `topology` against `store`.
pub fn resolve_geo_data(
    topology: &NetworkTopology,
    store: &dyn GeoStore,
    countries: &CountryFilter,
    config: &EngineConfig,
) -> Result<GeoDataSnapshot> {
    info!(
        topology_version = topology.version.as_deref().unwrap_or(""),
        countries = countries.len(),
        "resolving geo data"
    );
    GeoDataOrchestrator::new(config.clone()).resolve_from_store(topology, store, countries)
}

/// Like [`resolve_geo_data`], additionally exporting the reports into `output_dir`.
pub fn resolve_and_export(
    topology: &NetworkTopology,
    store: &dyn GeoStore,
    countries: &CountryFilter,
    config: &EngineConfig,
    output_dir: &Path,
) -> Result<GeoDataSnapshot> {
    let snapshot = resolve_geo_data(topology, store, countries, config)?;
    ReportExporter::new(&snapshot, topology.version.clone()).export_all(output_dir)?;
    Ok(snapshot)
}
