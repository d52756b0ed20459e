//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
//! Two-phase centroid estimation of missing substation coordinates.
//!
//! Phase [`Phase::One`] only places a substation once at least two of its
//! neighbours are positioned, using their unweighted centroid. Phase
//! [`Phase::Two`] additionally places substations with a single positioned
//! neighbour, slightly offset from it. Each phase sweeps the ordered
//! candidates until a sweep resolves nothing or `max_iterations` sweeps ran.
//!
//! Averaging raw degrees is only meaningful over small regional spans; no
//! wraparound or geodesic correction is applied.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use geo_data_common::config::{EngineConfig, MissingCountryPolicy, SweepVisibility};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    errors::{GeoDataError, Result},
    model::{Coordinate, Substation, SubstationGeoData, SubstationId},
    neighbours::NeighbourGraph,
    ordering::CandidateOrder,
};

/// Latitude shift applied to a substation placed from a single neighbour (1° ≈ 111 km).
pub const SINGLE_NEIGHBOUR_LATITUDE_OFFSET: f64 = -0.002;
/// Longitude shift applied to a substation placed from a single neighbour, not latitude corrected.
pub const SINGLE_NEIGHBOUR_LONGITUDE_OFFSET: f64 = -0.007;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    One,
    Two,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::One => f.write_str("1"),
            Phase::Two => f.write_str("2"),
        }
    }
}

/// Resolution policy for one substation given its positioned neighbours.
pub fn estimate_coordinate(phase: Phase, known_neighbours: &[Coordinate]) -> Option<Coordinate> {
    match (known_neighbours, phase) {
        ([], _) | ([_], Phase::One) => None,
        ([single], Phase::Two) => Some(single.offset(
            SINGLE_NEIGHBOUR_LATITUDE_OFFSET,
            SINGLE_NEIGHBOUR_LONGITUDE_OFFSET,
        )),
        (many, _) => Coordinate::centroid(many),
    }
}

/// Result and pending containers threaded through the estimation phases.
///
/// An id lives in at most one of `resolved`, `pending` and `rejected`. Ids
/// only ever leave `pending`, and a resolved entry is never overwritten.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimationState {
    resolved: IndexMap<SubstationId, SubstationGeoData>,
    pending: IndexSet<SubstationId>,
    rejected: IndexSet<SubstationId>,
}

impl EstimationState {
    /// Seeds the state with known entries. Pending ids already known are dropped.
    pub fn new(
        known: IndexMap<SubstationId, SubstationGeoData>,
        pending: impl IntoIterator<Item = SubstationId>,
    ) -> Self {
        let pending = pending
            .into_iter()
            .filter(|id| !known.contains_key(id))
            .collect();
        Self {
            resolved: known,
            pending,
            rejected: IndexSet::new(),
        }
    }

    pub fn resolved(&self) -> &IndexMap<SubstationId, SubstationGeoData> {
        &self.resolved
    }

    pub fn pending(&self) -> &IndexSet<SubstationId> {
        &self.pending
    }

    /// Substations dropped because they could not be given a country.
    pub fn rejected(&self) -> &IndexSet<SubstationId> {
        &self.rejected
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }

    /// Moves a pending substation into the result set. Returns `false` when it was not pending.
    fn resolve(&mut self, geo_data: SubstationGeoData) -> bool {
        if !self.pending.shift_remove(geo_data.id.as_str()) {
            return false;
        }
        self.resolved.entry(geo_data.id.clone()).or_insert(geo_data);
        true
    }

    fn reject(&mut self, id: &str) {
        if self.pending.shift_remove(id) {
            self.rejected.insert(id.to_owned());
        }
    }

    pub fn into_resolved(self) -> IndexMap<SubstationId, SubstationGeoData> {
        self.resolved
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub phase: Phase,
    pub iteration: usize,
    pub calculated: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimationReport {
    pub sweeps: Vec<SweepReport>,
    pub phase_two_ran: bool,
    /// Substations skipped for lack of a country.
    pub skipped_missing_country: Vec<SubstationId>,
}

impl EstimationReport {
    pub fn calculated(&self) -> usize {
        self.sweeps.iter().map(|s| s.calculated).sum()
    }

    pub fn calculated_in(&self, phase: Phase) -> usize {
        self.sweeps
            .iter()
            .filter(|s| s.phase == phase)
            .map(|s| s.calculated)
            .sum()
    }
}

pub struct CentroidEstimator<'a> {
    graph: &'a NeighbourGraph,
    order: &'a CandidateOrder,
    substations: &'a HashMap<&'a str, &'a Substation>,
    max_iterations: usize,
    visibility: SweepVisibility,
    missing_country: MissingCountryPolicy,
}

impl<'a> CentroidEstimator<'a> {
    pub fn new(
        graph: &'a NeighbourGraph,
        order: &'a CandidateOrder,
        substations: &'a HashMap<&'a str, &'a Substation>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            graph,
            order,
            substations,
            max_iterations: config.max_iterations,
            visibility: config.sweep_visibility,
            missing_country: config.missing_country,
        }
    }

    /// Runs phase one, then phase two if anything is still pending.
    pub fn run(&self, state: &mut EstimationState) -> Result<EstimationReport> {
        let started = Instant::now();
        let rejected_before = state.rejected.len();

        let mut sweeps = self.run_phase(Phase::One, state)?;
        let phase_two_ran = !state.pending.is_empty();
        if phase_two_ran {
            sweeps.extend(self.run_phase(Phase::Two, state)?);
        }

        let report = EstimationReport {
            sweeps,
            phase_two_ran,
            skipped_missing_country: state.rejected.iter().skip(rejected_before).cloned().collect(),
        };

        info!(
            calculated = report.calculated(),
            unresolved = state.pending.len(),
            skipped = report.skipped_missing_country.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "missing substation geo data calculated"
        );
        Ok(report)
    }

    /// Sweeps the candidates until a fixed point or the iteration cap.
    pub fn run_phase(&self, phase: Phase, state: &mut EstimationState) -> Result<Vec<SweepReport>> {
        let mut sweeps = Vec::new();
        for iteration in 0..self.max_iterations {
            let calculated = match self.visibility {
                SweepVisibility::InSweep => self.sweep_in_place(phase, state)?,
                SweepVisibility::SweepStart => self.sweep_from_snapshot(phase, state)?,
            };
            info!(
                step = %phase,
                iteration,
                calculated,
                remaining = state.pending.len(),
                "substation coordinates calculated"
            );
            sweeps.push(SweepReport {
                phase,
                iteration,
                calculated,
                remaining: state.pending.len(),
            });
            if calculated == 0 {
                break;
            }
        }
        Ok(sweeps)
    }

    fn sweep_in_place(&self, phase: Phase, state: &mut EstimationState) -> Result<usize> {
        let mut calculated = 0;
        for id in self.order.ids() {
            if !state.is_pending(id) {
                continue;
            }
            let Some(coordinate) = self.estimate(phase, id, &state.resolved) else {
                continue;
            };
            if self.place(id, coordinate, state)? {
                calculated += 1;
            }
        }
        Ok(calculated)
    }

    fn sweep_from_snapshot(&self, phase: Phase, state: &mut EstimationState) -> Result<usize> {
        let estimates: Vec<(&str, Coordinate)> = self
            .order
            .ids()
            .filter(|id| state.is_pending(id))
            .filter_map(|id| Some((id, self.estimate(phase, id, &state.resolved)?)))
            .collect();

        let mut calculated = 0;
        for (id, coordinate) in estimates {
            if self.place(id, coordinate, state)? {
                calculated += 1;
            }
        }
        Ok(calculated)
    }

    fn estimate(
        &self,
        phase: Phase,
        id: &str,
        resolved: &IndexMap<SubstationId, SubstationGeoData>,
    ) -> Option<Coordinate> {
        let known: Vec<Coordinate> = self
            .graph
            .neighbours(id)?
            .iter()
            .filter_map(|n| resolved.get(n.as_str()).map(|g| g.coordinate))
            .collect();
        estimate_coordinate(phase, &known)
    }

    fn place(&self, id: &str, coordinate: Coordinate, state: &mut EstimationState) -> Result<bool> {
        let substation = self
            .substations
            .get(id)
            .ok_or_else(|| GeoDataError::UnknownSubstation(id.to_owned()))?;
        match (&substation.country, self.missing_country) {
            (Some(country), _) => {
                debug!(substation = id, lat = coordinate.latitude, lon = coordinate.longitude, "coordinate computed");
                Ok(state.resolve(SubstationGeoData {
                    id: id.to_owned(),
                    country: country.clone(),
                    coordinate,
                }))
            }
            (None, MissingCountryPolicy::Abort) => Err(GeoDataError::MissingCountry(id.to_owned())),
            (None, MissingCountryPolicy::Skip) => {
                warn!(substation = id, "substation has no country, skipping");
                state.reject(id);
                Ok(false)
            }
        }
    }
}
