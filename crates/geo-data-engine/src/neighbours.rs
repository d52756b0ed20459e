//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
//! Undirected adjacency between substations derived from branch connectivity.

use std::collections::HashMap;
use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info};

use crate::model::{NetworkTopology, Substation, SubstationId};

/// Symmetric substation adjacency without self loops.
///
/// Keys keep the enumeration order of the substations the graph was built
/// from, and neighbour sets keep the order in which branches were met, so
/// iteration is reproducible across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighbourGraph {
    adjacency: IndexMap<SubstationId, IndexSet<SubstationId>>,
}

impl NeighbourGraph {
    /// Builds a graph directly from substation ids and undirected edges.
    ///
    /// Self edges and edges touching an id not listed in `ids` are dropped.
    pub fn from_edges<'a>(
        ids: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut graph = NeighbourGraph {
            adjacency: ids
                .into_iter()
                .map(|id| (id.to_owned(), IndexSet::new()))
                .collect(),
        };
        for (a, b) in edges {
            if a != b {
                graph.link(a, b);
            }
        }
        graph
    }

    pub fn neighbours(&self, id: &str) -> Option<&IndexSet<SubstationId>> {
        self.adjacency.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.adjacency.contains_key(id)
    }

    pub fn degree(&self, id: &str) -> usize {
        self.adjacency.get(id).map_or(0, IndexSet::len)
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Iterates substations with their neighbour sets, in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SubstationId, &IndexSet<SubstationId>)> {
        self.adjacency.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexSet::len).sum::<usize>() / 2
    }

    /// Links `a` and `b` both ways. No-op unless both are already keys.
    fn link(&mut self, a: &str, b: &str) -> bool {
        if !(self.adjacency.contains_key(a) && self.adjacency.contains_key(b)) {
            return false;
        }
        if let Some(set) = self.adjacency.get_mut(a) {
            set.insert(b.to_owned());
        }
        if let Some(set) = self.adjacency.get_mut(b) {
            set.insert(a.to_owned());
        }
        true
    }
}

/// Builds the neighbour graph over `substations`.
///
/// Every substation of the slice gets an entry, even without branches. Branch
/// endpoints outside the slice, or on unknown voltage levels, are ignored.
pub fn build_neighbour_graph(topology: &NetworkTopology, substations: &[&Substation]) -> NeighbourGraph {
    let started = Instant::now();

    let mut graph = NeighbourGraph {
        adjacency: substations
            .iter()
            .map(|s| (s.id.clone(), IndexSet::new()))
            .collect(),
    };

    let vl_index = topology.voltage_level_index();
    let mut branches_by_vl: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, branch) in topology.branches.iter().enumerate() {
        let (vl1, vl2) = branch.voltage_levels();
        branches_by_vl.entry(vl1).or_default().push(idx);
        if vl2 != vl1 {
            branches_by_vl.entry(vl2).or_default().push(idx);
        }
    }

    let mut skipped_self_loops = 0usize;
    let mut outside_endpoints = 0usize;
    for substation in substations {
        for vl in &substation.voltage_levels {
            let Some(branch_indices) = branches_by_vl.get(vl.id.as_str()) else {
                continue;
            };
            for &idx in branch_indices {
                let branch = &topology.branches[idx];
                let Some(ends) = topology.branch_ends(branch, &vl_index) else {
                    debug!(branch = branch.id(), "branch terminal on unknown voltage level");
                    continue;
                };
                if ends.is_self_loop() {
                    skipped_self_loops += 1;
                    continue;
                }
                if let Some(other) = ends.other(&substation.id) {
                    if !graph.link(&substation.id, other) {
                        outside_endpoints += 1;
                    }
                }
            }
        }
    }

    info!(
        substations = graph.len(),
        edges = graph.edge_count(),
        skipped_self_loops,
        outside_endpoints,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "neighbours calculated"
    );
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Branch, Country, DanglingLine, VoltageLevel};

    fn substation(id: &str, vls: &[&str]) -> Substation {
        Substation {
            id: id.into(),
            country: Some("FR".parse::<Country>().unwrap()),
            voltage_levels: vls
                .iter()
                .map(|vl| VoltageLevel {
                    id: (*vl).into(),
                    nominal_kv: Some(225.0),
                })
                .collect(),
        }
    }

    fn line(id: &str, vl1: &str, vl2: &str) -> Branch {
        Branch::Line {
            id: id.into(),
            voltage_level1: vl1.into(),
            voltage_level2: vl2.into(),
        }
    }

    fn topology() -> NetworkTopology {
        NetworkTopology {
            version: None,
            substations: vec![
                substation("A", &["A1", "A2"]),
                substation("B", &["B1"]),
                substation("C", &["C1"]),
                substation("D", &["D1"]),
            ],
            branches: vec![
                line("AB", "A1", "B1"),
                Branch::TwoWindingsTransformer {
                    id: "TA".into(),
                    voltage_level1: "A1".into(),
                    voltage_level2: "A2".into(),
                },
                Branch::TieLine {
                    id: "AC".into(),
                    half1: DanglingLine {
                        id: "AC-1".into(),
                        voltage_level: "A2".into(),
                    },
                    half2: DanglingLine {
                        id: "AC-2".into(),
                        voltage_level: "C1".into(),
                    },
                },
                line("AB-bis", "B1", "A1"),
                line("BX", "B1", "X1"),
            ],
        }
    }

    #[test]
    fn graph_is_symmetric_without_self_loops() {
        let topology = topology();
        let refs: Vec<&Substation> = topology.substations.iter().collect();
        let graph = build_neighbour_graph(&topology, &refs);

        for (id, neighbours) in graph.iter() {
            assert!(!neighbours.contains(id), "{id} is its own neighbour");
            for n in neighbours {
                assert!(graph.neighbours(n).unwrap().contains(id));
            }
        }
        let a: Vec<_> = graph.neighbours("A").unwrap().iter().cloned().collect();
        assert_eq!(a, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(graph.degree("B"), 1);
        assert_eq!(graph.degree("D"), 0);
        assert!(graph.contains("D"));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn endpoints_outside_the_considered_set_are_ignored() {
        let topology = topology();
        let refs: Vec<&Substation> = topology
            .substations
            .iter()
            .filter(|s| s.id != "C")
            .collect();
        let graph = build_neighbour_graph(&topology, &refs);
        assert!(!graph.contains("C"));
        assert_eq!(graph.degree("A"), 1);
    }
}
