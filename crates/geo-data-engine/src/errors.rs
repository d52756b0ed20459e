//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoDataError>;

#[derive(Debug, Error)]
pub enum GeoDataError {
    #[error("substation {0} has no country")]
    MissingCountry(String),
    #[error("substation {0} not found in network topology")]
    UnknownSubstation(String),
    #[error("invalid country code '{0}', expected two uppercase ASCII letters")]
    InvalidCountry(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationFailed(#[from] serde_json::Error),
    #[error("yaml serialization error: {0}")]
    YamlSerializationFailed(#[from] serde_yaml::Error),
}
