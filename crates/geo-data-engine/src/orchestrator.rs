//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use geo_data_common::config::EngineConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    accuracy::{assess_accuracy, AccuracyReport},
    errors::Result,
    estimator::{CentroidEstimator, EstimationReport, EstimationState},
    model::{Country, LineGeoData, NetworkTopology, Substation, SubstationGeoData, SubstationId},
    neighbours::build_neighbour_graph,
    ordering::order_candidates,
    store::GeoStore,
};

/// Countries to keep. Empty keeps every substation, including those without a country.
pub type CountryFilter = BTreeSet<Country>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstationResolution {
    /// Known entries first, then computed ones in resolution order.
    pub substations: IndexMap<SubstationId, SubstationGeoData>,
    pub known: usize,
    pub computed: usize,
    pub unresolved: Vec<SubstationId>,
    pub accuracy: AccuracyReport,
    pub estimation: EstimationReport,
}

/// Substation and line geo data produced for one topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoDataSnapshot {
    pub substations: SubstationResolution,
    pub lines: Vec<LineGeoData>,
}

#[derive(Debug, Clone, Default)]
pub struct GeoDataOrchestrator {
    config: EngineConfig,
}

impl GeoDataOrchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Completes `known` with estimated coordinates for the topology's substations.
    pub fn resolve(
        &self,
        topology: &NetworkTopology,
        known: &IndexMap<SubstationId, SubstationGeoData>,
        countries: &CountryFilter,
    ) -> Result<SubstationResolution> {
        let substations: Vec<&Substation> = topology
            .substations
            .iter()
            .filter(|s| matches_filter(s.country.as_ref(), countries))
            .collect();

        let mut seeded = IndexMap::new();
        let mut to_compute = Vec::new();
        for substation in &substations {
            match known.get(substation.id.as_str()) {
                Some(geo_data) => {
                    seeded.insert(substation.id.clone(), geo_data.clone());
                }
                None => to_compute.push(substation.id.clone()),
            }
        }

        info!(
            substations = substations.len(),
            found = seeded.len(),
            not_found = to_compute.len(),
            "substations partitioned against stored geo data"
        );

        let known_count = seeded.len();
        let accuracy = assess_accuracy(
            known_count,
            to_compute.len(),
            self.config.accuracy_warning_threshold,
        );

        let mut state = EstimationState::new(seeded, to_compute);
        let graph = build_neighbour_graph(topology, &substations);
        let order = order_candidates(&graph, state.pending(), state.resolved());
        debug!(candidates = order.len(), "candidate order computed");

        let by_id: HashMap<&str, &Substation> =
            substations.iter().copied().map(|s| (s.id.as_str(), s)).collect();
        let estimation =
            CentroidEstimator::new(&graph, &order, &by_id, &self.config).run(&mut state)?;

        let unresolved: Vec<SubstationId> = state.pending().iter().cloned().collect();
        let resolved = state.into_resolved();
        Ok(SubstationResolution {
            known: known_count,
            computed: resolved.len() - known_count,
            substations: resolved,
            unresolved,
            accuracy,
            estimation,
        })
    }

    /// Builds drawable line geo data for lines whose two endpoints are positioned.
    ///
    /// The coordinates run from the first endpoint to the second, with the
    /// intermediate points of the matching entry of `shapes` in between.
    pub fn assemble_lines(
        &self,
        topology: &NetworkTopology,
        resolved: &IndexMap<SubstationId, SubstationGeoData>,
        shapes: &IndexMap<String, LineGeoData>,
    ) -> Vec<LineGeoData> {
        let vl_index = topology.voltage_level_index();
        let mut lines = Vec::new();
        for branch in topology.lines() {
            let Some(ends) = topology.branch_ends(branch, &vl_index) else {
                continue;
            };
            if ends.is_self_loop() {
                continue;
            }
            let (Some(start), Some(end)) = (
                resolved.get(ends.substation1),
                resolved.get(ends.substation2),
            ) else {
                continue;
            };

            let mut coordinates = vec![start.coordinate];
            if let Some(shape) = shapes.get(ends.branch_id) {
                if shape.substation_start == ends.substation2 && shape.substation_end == ends.substation1 {
                    coordinates.extend(shape.coordinates.iter().rev().copied());
                } else {
                    coordinates.extend(shape.coordinates.iter().copied());
                }
            }
            coordinates.push(end.coordinate);

            lines.push(LineGeoData {
                id: ends.branch_id.to_owned(),
                country1: start.country.clone(),
                country2: end.country.clone(),
                substation_start: start.id.clone(),
                substation_end: end.id.clone(),
                coordinates,
            });
        }
        info!(lines = lines.len(), "line geo data assembled");
        lines
    }

    /// Stored geo data of the topology's lines touching at least one filtered country.
    pub fn stored_lines(
        &self,
        topology: &NetworkTopology,
        stored: &IndexMap<String, LineGeoData>,
        countries: &CountryFilter,
    ) -> Vec<LineGeoData> {
        let vl_index = topology.voltage_level_index();
        let by_id = topology.substation_map();
        let country_of = |id: &str| by_id.get(id).and_then(|s| s.country.as_ref());

        topology
            .lines()
            .filter(|branch| {
                if countries.is_empty() {
                    return true;
                }
                topology
                    .branch_ends(*branch, &vl_index)
                    .map(|ends| {
                        [ends.substation1, ends.substation2]
                            .into_iter()
                            .filter_map(|id| country_of(id))
                            .any(|c| countries.contains(c))
                    })
                    .unwrap_or(false)
            })
            .filter_map(|branch| stored.get(branch.id()).cloned())
            .collect()
    }

    /// Loads the known set from `store`, resolves substations and assembles lines.
    pub fn resolve_from_store(
        &self,
        topology: &NetworkTopology,
        store: &dyn GeoStore,
        countries: &CountryFilter,
    ) -> Result<GeoDataSnapshot> {
        let started = Instant::now();
        let known = store.substations()?;
        info!(
            substations = known.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "substations read from store"
        );
        let substations = self.resolve(topology, &known, countries)?;
        let shapes = store.lines()?;
        let lines = self.assemble_lines(topology, &substations.substations, &shapes);
        Ok(GeoDataSnapshot { substations, lines })
    }
}

fn matches_filter(country: Option<&Country>, countries: &CountryFilter) -> bool {
    countries.is_empty() || country.is_some_and(|c| countries.contains(c))
}
