//! ---
//! gd_section: "01-core-functionality"
//! gd_subsection: "tests"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Configuration loading tests."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use std::fs;

use geo_data_common::{AppConfig, LogFormat, MissingCountryPolicy, SweepVisibility};
use tempfile::tempdir;

const SAMPLE: &str = r#"
[engine]
max_iterations = 12
accuracy_warning_threshold = 80
sweep_visibility = "sweep-start"
missing_country = "skip"

[store]
path = "data/store.json"

[logging]
directory = "logs"
format = "structured-json"
file_prefix = "geo"
"#;

#[test]
fn loads_first_existing_candidate() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let present = dir.path().join("geo-data.toml");
    fs::write(&present, SAMPLE).unwrap();

    let loaded = AppConfig::load_with_source(&[&missing, &present]).unwrap();
    assert_eq!(loaded.source, present);
    let config = loaded.config;
    assert_eq!(config.engine.max_iterations, 12);
    assert_eq!(config.engine.accuracy_warning_threshold, 80);
    assert_eq!(config.engine.sweep_visibility, SweepVisibility::SweepStart);
    assert_eq!(config.engine.missing_country, MissingCountryPolicy::Skip);
    assert_eq!(config.store.path, std::path::PathBuf::from("data/store.json"));
    assert_eq!(config.logging.format, LogFormat::StructuredJson);
    assert_eq!(config.logging.file_prefix.as_deref(), Some("geo"));
}

#[test]
fn missing_candidates_report_inspected_paths() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nowhere.toml");
    let err = AppConfig::load(&[&missing]).unwrap_err();
    assert!(err.to_string().contains("nowhere.toml"));
}

#[test]
fn load_or_default_without_files() {
    let dir = tempdir().unwrap();
    let config = AppConfig::load_or_default(&[dir.path().join("absent.toml")]).unwrap();
    assert_eq!(config.engine.max_iterations, 50);
}

#[test]
fn invalid_file_surfaces_parse_context() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[engine]\nmax_iterations = \"many\"\n").unwrap();
    let err = AppConfig::load(&[&path]).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse config file"));
}
