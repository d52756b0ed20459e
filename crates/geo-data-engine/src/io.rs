//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use std::{fs, path::Path};

use crate::{
    errors::{GeoDataError, Result},
    model::{LineGeoData, NetworkTopology, SubstationGeoData},
};

/// Reads a topology snapshot, as JSON when the document opens with `{`, YAML otherwise.
pub fn load_topology_from_file(path: impl AsRef<Path>) -> Result<NetworkTopology> {
    let data = fs::read_to_string(path)?;
    let topology = if data.trim_start().starts_with('{') {
        serde_json::from_str(&data)?
    } else {
        serde_yaml::from_str(&data).map_err(GeoDataError::YamlSerializationFailed)?
    };
    Ok(topology)
}

pub fn load_substation_geo_data(path: impl AsRef<Path>) -> Result<Vec<SubstationGeoData>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub fn load_line_geo_data(path: impl AsRef<Path>) -> Result<Vec<LineGeoData>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
