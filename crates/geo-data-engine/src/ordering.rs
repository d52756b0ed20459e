//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::model::{SubstationGeoData, SubstationId};
use crate::neighbours::NeighbourGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: SubstationId,
    /// Neighbours already present in the result set when the order was computed.
    pub known_neighbours: usize,
}

/// Resolution order for pending substations, fixed once per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateOrder {
    candidates: Vec<Candidate>,
}

impl CandidateOrder {
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Orders pending substations that have at least one neighbour by descending
/// count of neighbours already resolved.
///
/// Ties keep the graph's enumeration order. Pending substations without any
/// neighbour are left out and stay pending.
pub fn order_candidates(
    graph: &NeighbourGraph,
    pending: &IndexSet<SubstationId>,
    resolved: &IndexMap<SubstationId, SubstationGeoData>,
) -> CandidateOrder {
    let mut candidates: Vec<Candidate> = graph
        .iter()
        .filter(|(id, neighbours)| pending.contains(id.as_str()) && !neighbours.is_empty())
        .map(|(id, neighbours)| Candidate {
            id: id.clone(),
            known_neighbours: neighbours
                .iter()
                .filter(|n| resolved.contains_key(n.as_str()))
                .count(),
        })
        .collect();

    // stable: equal counts keep enumeration order
    candidates.sort_by(|a, b| b.known_neighbours.cmp(&a.known_neighbours));

    CandidateOrder { candidates }
}
