//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "tests"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use std::fs;

use geo_data_common::config::{EngineConfig, MissingCountryPolicy};
use geo_data_engine::{
    estimator::Phase,
    io::load_topology_from_file,
    model::{Coordinate, Country, LineGeoData, NetworkTopology, SubstationGeoData},
    orchestrator::{CountryFilter, GeoDataOrchestrator},
    store::{GeoStore, InMemoryGeoStore, JsonFileGeoStore},
    GeoDataError,
};
use indexmap::IndexMap;
use tempfile::tempdir;

const EPS: f64 = 1e-9;

const TOPOLOGY_YAML: &str = r#"
version: integration-test
substations:
  - id: S1
    country: FR
    voltage_levels: [{ id: S1_400 }]
  - id: S2
    country: FR
    voltage_levels: [{ id: S2_400 }]
  - id: S3
    country: FR
    voltage_levels: [{ id: S3_400 }, { id: S3_225 }]
  - id: S4
    country: BE
    voltage_levels: [{ id: S4_225 }]
  - id: ISO
    country: BE
    voltage_levels: [{ id: ISO_63 }]
branches:
  - { type: line, id: L1, voltage_level1: S1_400, voltage_level2: S3_400 }
  - { type: line, id: L2, voltage_level1: S3_400, voltage_level2: S2_400 }
  - { type: two_windings_transformer, id: T3, voltage_level1: S3_400, voltage_level2: S3_225 }
  - type: tie_line
    id: TL34
    half1: { id: TL34_FR, voltage_level: S3_225 }
    half2: { id: TL34_BE, voltage_level: S4_225 }
"#;

fn country(code: &str) -> Country {
    code.parse().unwrap()
}

fn geo(id: &str, code: &str, lat: f64, lon: f64) -> SubstationGeoData {
    SubstationGeoData {
        id: id.into(),
        country: country(code),
        coordinate: Coordinate::new(lat, lon),
    }
}

fn topology() -> NetworkTopology {
    let dir = tempdir().unwrap();
    let path = dir.path().join("network.yaml");
    fs::write(&path, TOPOLOGY_YAML).unwrap();
    load_topology_from_file(&path).unwrap()
}

fn known() -> IndexMap<String, SubstationGeoData> {
    [geo("S1", "FR", 51.0, 0.5), geo("S2", "FR", 52.0, 0.3)]
        .into_iter()
        .map(|g| (g.id.clone(), g))
        .collect()
}

#[test]
fn documented_chain_scenario() {
    let topology = topology();
    let resolution = GeoDataOrchestrator::default()
        .resolve(&topology, &known(), &CountryFilter::new())
        .unwrap();

    let s3 = resolution.substations["S3"].coordinate;
    assert!((s3.latitude - 51.5).abs() < EPS);
    assert!((s3.longitude - 0.4).abs() < EPS);

    let s4 = &resolution.substations["S4"];
    assert_eq!(s4.country, country("BE"));
    assert!((s4.coordinate.latitude - 51.498).abs() < EPS);
    assert!((s4.coordinate.longitude - 0.393).abs() < EPS);

    assert_eq!(resolution.known, 2);
    assert_eq!(resolution.computed, 2);
    assert_eq!(resolution.unresolved, vec!["ISO".to_string()]);
    assert_eq!(resolution.accuracy.accuracy, 40);
    assert!(resolution.accuracy.low_confidence);
    assert_eq!(resolution.estimation.calculated_in(Phase::One), 1);
    assert_eq!(resolution.estimation.calculated_in(Phase::Two), 1);
}

#[test]
fn known_entries_are_never_recomputed() {
    let topology = topology();
    let mut known = known();
    known.insert("S4".into(), geo("S4", "BE", 10.0, 10.0));
    let resolution = GeoDataOrchestrator::default()
        .resolve(&topology, &known, &CountryFilter::new())
        .unwrap();
    assert_eq!(resolution.substations["S4"], geo("S4", "BE", 10.0, 10.0));
    assert_eq!(resolution.substations["S1"], known["S1"]);
    // S3 now averages three known neighbours
    let s3 = resolution.substations["S3"].coordinate;
    assert!((s3.latitude - (51.0 + 52.0 + 10.0) / 3.0).abs() < EPS);
}

#[test]
fn country_filter_restricts_the_graph() {
    let topology = topology();
    let filter: CountryFilter = [country("BE")].into_iter().collect();
    let resolution = GeoDataOrchestrator::default()
        .resolve(&topology, &known(), &filter)
        .unwrap();

    // S4's only neighbour lies outside the filter, nothing can be placed
    assert!(resolution.substations.is_empty());
    assert_eq!(resolution.unresolved, vec!["S4".to_string(), "ISO".to_string()]);
    assert_eq!(resolution.accuracy.accuracy, 0);
}

#[test]
fn zero_iterations_returns_known_set() {
    let topology = topology();
    let orchestrator = GeoDataOrchestrator::new(EngineConfig {
        max_iterations: 0,
        ..EngineConfig::default()
    });
    let resolution = orchestrator
        .resolve(&topology, &known(), &CountryFilter::new())
        .unwrap();
    assert_eq!(resolution.substations, known());
    assert_eq!(resolution.computed, 0);
    assert_eq!(resolution.unresolved.len(), 3);
}

#[test]
fn missing_country_surfaces_or_skips() {
    let mut topology = topology();
    topology.substations[2].country = None;

    let err = GeoDataOrchestrator::default()
        .resolve(&topology, &known(), &CountryFilter::new())
        .unwrap_err();
    assert!(matches!(err, GeoDataError::MissingCountry(ref id) if id == "S3"));

    let resolution = GeoDataOrchestrator::new(EngineConfig {
        missing_country: MissingCountryPolicy::Skip,
        ..EngineConfig::default()
    })
    .resolve(&topology, &known(), &CountryFilter::new())
    .unwrap();
    assert_eq!(
        resolution.estimation.skipped_missing_country,
        vec!["S3".to_string()]
    );
    assert!(!resolution.substations.contains_key("S3"));
    assert!(!resolution.substations.contains_key("S4"));
}

#[test]
fn lines_follow_resolved_endpoints_and_shapes() {
    let topology = topology();
    let orchestrator = GeoDataOrchestrator::default();
    let resolution = orchestrator
        .resolve(&topology, &known(), &CountryFilter::new())
        .unwrap();

    let mut shapes = IndexMap::new();
    // stored against the reverse direction of L1
    shapes.insert(
        "L1".to_string(),
        LineGeoData {
            id: "L1".into(),
            country1: country("FR"),
            country2: country("FR"),
            substation_start: "S3".into(),
            substation_end: "S1".into(),
            coordinates: vec![Coordinate::new(51.4, 0.45), Coordinate::new(51.1, 0.49)],
        },
    );

    let lines = orchestrator.assemble_lines(&topology, &resolution.substations, &shapes);
    let ids: Vec<&str> = lines.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["L1", "L2", "TL34"]);

    let l1 = &lines[0];
    assert_eq!(l1.substation_start, "S1");
    assert_eq!(
        l1.coordinates,
        vec![
            Coordinate::new(51.0, 0.5),
            Coordinate::new(51.1, 0.49),
            Coordinate::new(51.4, 0.45),
            resolution.substations["S3"].coordinate,
        ]
    );

    let l2 = &lines[1];
    assert_eq!(l2.coordinates.len(), 2);
    assert_eq!(l2.coordinates[1], Coordinate::new(52.0, 0.3));

    let tie = &lines[2];
    assert!(tie.is_cross_border());
    assert_eq!(tie.country2, country("BE"));
}

#[test]
fn stored_lines_filtered_by_either_endpoint_country() {
    let topology = topology();
    let orchestrator = GeoDataOrchestrator::default();
    let mut store = InMemoryGeoStore::new();
    let tie = LineGeoData {
        id: "TL34".into(),
        country1: country("FR"),
        country2: country("BE"),
        substation_start: "S3".into(),
        substation_end: "S4".into(),
        coordinates: vec![],
    };
    let l1 = LineGeoData {
        id: "L1".into(),
        country1: country("FR"),
        country2: country("FR"),
        substation_start: "S1".into(),
        substation_end: "S3".into(),
        coordinates: vec![],
    };
    store.save_lines(&[tie.clone(), l1.clone()]).unwrap();
    let stored = store.lines().unwrap();

    let be: CountryFilter = [country("BE")].into_iter().collect();
    assert_eq!(orchestrator.stored_lines(&topology, &stored, &be), vec![tie.clone()]);

    let all = orchestrator.stored_lines(&topology, &stored, &CountryFilter::new());
    assert_eq!(all, vec![l1, tie]);
}

#[test]
fn resolve_from_json_store() {
    let topology = topology();
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");
    {
        let mut store = JsonFileGeoStore::open(&path).unwrap();
        store
            .save_substations(&known().into_values().collect::<Vec<_>>())
            .unwrap();
    }

    let store = JsonFileGeoStore::open(&path).unwrap();
    assert_eq!(store.substations().unwrap().len(), 2);
    let snapshot = GeoDataOrchestrator::default()
        .resolve_from_store(&topology, &store, &CountryFilter::new())
        .unwrap();
    assert_eq!(snapshot.substations.substations.len(), 4);
    assert_eq!(snapshot.lines.len(), 3);
}
