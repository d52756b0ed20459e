//! ---
//! gd_section: "15-testing-qa"
//! gd_subsection: "integration-tests"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Integration and validation tests for the geo-data workspace."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use std::fs;

use geo_data_common::config::{AppConfig, SweepVisibility};
use geo_data_engine::{
    model::{Branch, Coordinate, NetworkTopology, Substation, SubstationGeoData, VoltageLevel},
    orchestrator::CountryFilter,
    resolve_and_export, resolve_geo_data,
    store::{GeoStore, JsonFileGeoStore},
};
use tempfile::tempdir;

/// 3x3 grid of substations, wired horizontally and vertically.
fn grid() -> NetworkTopology {
    let id = |r: usize, c: usize| format!("G{r}{c}");
    let substations = (0..3)
        .flat_map(|r| (0..3).map(move |c| (r, c)))
        .map(|(r, c)| Substation {
            id: id(r, c),
            country: Some("NL".parse().unwrap()),
            voltage_levels: vec![VoltageLevel {
                id: format!("{}_VL", id(r, c)),
                nominal_kv: Some(150.0),
            }],
        })
        .collect();

    let mut branches = Vec::new();
    for r in 0..3 {
        for c in 0..3 {
            if c < 2 {
                branches.push(Branch::Line {
                    id: format!("H{r}{c}"),
                    voltage_level1: format!("{}_VL", id(r, c)),
                    voltage_level2: format!("{}_VL", id(r, c + 1)),
                });
            }
            if r < 2 {
                branches.push(Branch::Line {
                    id: format!("V{r}{c}"),
                    voltage_level1: format!("{}_VL", id(r, c)),
                    voltage_level2: format!("{}_VL", id(r + 1, c)),
                });
            }
        }
    }

    NetworkTopology {
        version: Some("grid-3x3".into()),
        substations,
        branches,
    }
}

fn corners() -> Vec<SubstationGeoData> {
    [("G00", 52.0, 4.0), ("G02", 52.0, 6.0), ("G20", 50.0, 4.0), ("G22", 50.0, 6.0)]
        .into_iter()
        .map(|(id, lat, lon)| SubstationGeoData {
            id: id.into(),
            country: "NL".parse().unwrap(),
            coordinate: Coordinate::new(lat, lon),
        })
        .collect()
}

#[test]
fn grid_resolves_from_json_store_and_exports() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("store.json");
    JsonFileGeoStore::open(&store_path)
        .unwrap()
        .save_substations(&corners())
        .unwrap();

    let config = AppConfig::default();
    let store = JsonFileGeoStore::open(&store_path).unwrap();
    let out = dir.path().join("reports");
    let snapshot = resolve_and_export(
        &grid(),
        &store,
        &CountryFilter::new(),
        &config.engine,
        &out,
    )
    .unwrap();

    let resolution = &snapshot.substations;
    assert_eq!(resolution.known, 4);
    assert_eq!(resolution.computed, 5);
    assert!(resolution.unresolved.is_empty());
    // edge midpoints sit between two corners
    let g01 = resolution.substations["G01"].coordinate;
    assert!((g01.latitude - 52.0).abs() < 1e-9);
    assert!((g01.longitude - 5.0).abs() < 1e-9);
    assert_eq!(snapshot.lines.len(), 12);

    let lines: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("lines.json")).unwrap()).unwrap();
    assert_eq!(lines["data"].as_array().unwrap().len(), 12);
    assert_eq!(lines["topology_version"], "grid-3x3");
}

#[test]
fn both_visibility_modes_complete_the_grid() {
    let mut store = geo_data_engine::store::InMemoryGeoStore::new();
    store.save_substations(&corners()).unwrap();
    let topology = grid();

    for mode in ["in-sweep", "sweep-start"] {
        let config: AppConfig = format!("[engine]\nsweep_visibility = \"{mode}\"\n")
            .parse()
            .unwrap();
        let snapshot =
            resolve_geo_data(&topology, &store, &CountryFilter::new(), &config.engine).unwrap();
        assert_eq!(snapshot.substations.substations.len(), 9, "{mode}");
        if config.engine.sweep_visibility == SweepVisibility::SweepStart {
            // the centre only sees its neighbours after the edges land
            assert!(snapshot.substations.estimation.sweeps.len() >= 2);
        }
    }
}
