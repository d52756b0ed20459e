//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GeoDataError;

pub type SubstationId = String;

/// A position in decimal degrees. No projection or wraparound is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Unweighted centroid of the given coordinates, `None` when empty.
    pub fn centroid(points: &[Coordinate]) -> Option<Coordinate> {
        if points.is_empty() {
            return None;
        }
        let count = points.len() as f64;
        let latitude = points.iter().map(|p| p.latitude).sum::<f64>() / count;
        let longitude = points.iter().map(|p| p.longitude).sum::<f64>() / count;
        Some(Coordinate::new(latitude, longitude))
    }

    pub fn offset(&self, d_latitude: f64, d_longitude: f64) -> Coordinate {
        Coordinate::new(self.latitude + d_latitude, self.longitude + d_longitude)
    }
}

/// ISO 3166-1 alpha-2 country code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Country(String);

impl Country {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Country {
    type Err = GeoDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Country(code.to_owned()))
        } else {
            Err(GeoDataError::InvalidCountry(s.to_owned()))
        }
    }
}

impl TryFrom<String> for Country {
    type Error = GeoDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Country> for String {
    fn from(country: Country) -> Self {
        country.0
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoltageLevel {
    pub id: String,
    #[serde(default)]
    pub nominal_kv: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Substation {
    pub id: SubstationId,
    #[serde(default)]
    pub country: Option<Country>,
    #[serde(default)]
    pub voltage_levels: Vec<VoltageLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DanglingLine {
    pub id: String,
    pub voltage_level: String,
}

/// An electrical connection between two voltage levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Branch {
    Line {
        id: String,
        voltage_level1: String,
        voltage_level2: String,
    },
    TwoWindingsTransformer {
        id: String,
        voltage_level1: String,
        voltage_level2: String,
    },
    /// Two dangling-line halves joined at a boundary point.
    TieLine {
        id: String,
        half1: DanglingLine,
        half2: DanglingLine,
    },
}

impl Branch {
    pub fn id(&self) -> &str {
        match self {
            Branch::Line { id, .. }
            | Branch::TwoWindingsTransformer { id, .. }
            | Branch::TieLine { id, .. } => id,
        }
    }

    pub fn voltage_levels(&self) -> (&str, &str) {
        match self {
            Branch::Line {
                voltage_level1,
                voltage_level2,
                ..
            }
            | Branch::TwoWindingsTransformer {
                voltage_level1,
                voltage_level2,
                ..
            } => (voltage_level1, voltage_level2),
            Branch::TieLine { half1, half2, .. } => (&half1.voltage_level, &half2.voltage_level),
        }
    }

    /// Lines and tie lines carry line geo data; transformers do not.
    pub fn is_line(&self) -> bool {
        matches!(self, Branch::Line { .. } | Branch::TieLine { .. })
    }
}

/// The two substations a branch connects, whatever the element kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchEnds<'a> {
    pub branch_id: &'a str,
    pub substation1: &'a str,
    pub substation2: &'a str,
}

impl<'a> BranchEnds<'a> {
    pub fn is_self_loop(&self) -> bool {
        self.substation1 == self.substation2
    }

    /// Returns the far end seen from `substation`, or `None` when it is not an endpoint.
    pub fn other(&self, substation: &str) -> Option<&'a str> {
        if self.substation1 == substation {
            Some(self.substation2)
        } else if self.substation2 == substation {
            Some(self.substation1)
        } else {
            None
        }
    }
}

/// Snapshot of the network supplied by the topology provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkTopology {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub substations: Vec<Substation>,
    #[serde(default)]
    pub branches: Vec<Branch>,
}

impl NetworkTopology {
    pub fn substation_map(&self) -> HashMap<&str, &Substation> {
        self.substations.iter().map(|s| (s.id.as_str(), s)).collect()
    }

    /// Maps every voltage level id to the id of the substation holding it.
    pub fn voltage_level_index(&self) -> HashMap<&str, &str> {
        self.substations
            .iter()
            .flat_map(|s| {
                s.voltage_levels
                    .iter()
                    .map(move |vl| (vl.id.as_str(), s.id.as_str()))
            })
            .collect()
    }

    /// Resolves a branch to its substations. `None` if a terminal's voltage level is unknown.
    pub fn branch_ends<'a>(
        &'a self,
        branch: &'a Branch,
        index: &HashMap<&'a str, &'a str>,
    ) -> Option<BranchEnds<'a>> {
        let (vl1, vl2) = branch.voltage_levels();
        Some(BranchEnds {
            branch_id: branch.id(),
            substation1: index.get(vl1).copied()?,
            substation2: index.get(vl2).copied()?,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter().filter(|b| b.is_line())
    }
}

/// Resolved position of a substation, either loaded from the store or computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstationGeoData {
    pub id: SubstationId,
    pub country: Country,
    pub coordinate: Coordinate,
}

/// Ordered coordinates drawing a line from `substation_start` to `substation_end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGeoData {
    pub id: String,
    pub country1: Country,
    pub country2: Country,
    pub substation_start: SubstationId,
    pub substation_end: SubstationId,
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
}

impl LineGeoData {
    pub fn is_cross_border(&self) -> bool {
        self.country1 != self.country2
    }
}
