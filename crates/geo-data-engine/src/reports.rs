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

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    errors::Result,
    model::{LineGeoData, SubstationGeoData},
    orchestrator::GeoDataSnapshot,
};

#[derive(Debug)]
pub struct ReportExporter<'a> {
    snapshot: &'a GeoDataSnapshot,
    topology_version: Option<String>,
    run_id: Uuid,
    timestamp: DateTime<Utc>,
}

/// Summary written to `resolution.json`.
#[derive(Debug, Serialize)]
struct ResolutionSummary<'a> {
    known: usize,
    computed: usize,
    unresolved: &'a [String],
    accuracy: u8,
    low_confidence: bool,
    phase_two_ran: bool,
    sweeps: &'a [crate::estimator::SweepReport],
    skipped_missing_country: &'a [String],
}

impl<'a> ReportExporter<'a> {
    pub fn new(snapshot: &'a GeoDataSnapshot, topology_version: Option<String>) -> Self {
        Self {
            snapshot,
            topology_version,
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Writes `substations.json`, `lines.json` and `resolution.json` into `output_dir`.
    pub fn export_all(&self, output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let timestamp = self.timestamp.to_rfc3339();
        let resolution = &self.snapshot.substations;
        let substations: Vec<&SubstationGeoData> = resolution.substations.values().collect();
        let summary = ResolutionSummary {
            known: resolution.known,
            computed: resolution.computed,
            unresolved: &resolution.unresolved,
            accuracy: resolution.accuracy.accuracy,
            low_confidence: resolution.accuracy.low_confidence,
            phase_two_ran: resolution.estimation.phase_two_ran,
            sweeps: &resolution.estimation.sweeps,
            skipped_missing_country: &resolution.estimation.skipped_missing_country,
        };

        write_json(
            output_dir.join("substations.json"),
            &self.envelope(&timestamp, substations_schema(), &substations),
        )?;
        write_json(
            output_dir.join("lines.json"),
            &self.envelope::<Vec<LineGeoData>>(&timestamp, lines_schema(), &self.snapshot.lines),
        )?;
        write_json(
            output_dir.join("resolution.json"),
            &self.envelope(&timestamp, resolution_schema(), &summary),
        )?;

        info!(run_id = %self.run_id, "reports exported to {}", output_dir.display());
        Ok(())
    }

    fn envelope<'b, T: Serialize>(
        &'b self,
        timestamp: &'b str,
        schema: serde_json::Value,
        data: &'b T,
    ) -> ReportEnvelope<'b, T> {
        ReportEnvelope {
            timestamp,
            run_id: self.run_id,
            topology_version: self.topology_version.clone(),
            schema,
            data,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a, T: Serialize> {
    timestamp: &'a str,
    run_id: Uuid,
    topology_version: Option<String>,
    schema: serde_json::Value,
    data: &'a T,
}

fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn coordinate_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "latitude": {"type": "number"},
            "longitude": {"type": "number"}
        },
        "required": ["latitude", "longitude"]
    })
}

fn substations_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "SubstationGeoData",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "country": {"type": "string", "pattern": "^[A-Z]{2}$"},
                "coordinate": coordinate_schema()
            },
            "required": ["id", "country", "coordinate"]
        }
    })
}

fn lines_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "LineGeoData",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": {"type": "string"},
                "country1": {"type": "string", "pattern": "^[A-Z]{2}$"},
                "country2": {"type": "string", "pattern": "^[A-Z]{2}$"},
                "substation_start": {"type": "string"},
                "substation_end": {"type": "string"},
                "coordinates": {"type": "array", "items": coordinate_schema(), "minItems": 2}
            },
            "required": ["id", "country1", "country2", "substation_start", "substation_end", "coordinates"]
        }
    })
}

fn resolution_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "SubstationResolution",
        "type": "object",
        "properties": {
            "known": {"type": "integer", "minimum": 0},
            "computed": {"type": "integer", "minimum": 0},
            "unresolved": {"type": "array", "items": {"type": "string"}},
            "accuracy": {"type": "integer", "minimum": 0, "maximum": 100},
            "low_confidence": {"type": "boolean"},
            "phase_two_ran": {"type": "boolean"},
            "sweeps": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "phase": {"enum": ["one", "two"]},
                        "iteration": {"type": "integer"},
                        "calculated": {"type": "integer"},
                        "remaining": {"type": "integer"}
                    },
                    "required": ["phase", "iteration", "calculated", "remaining"]
                }
            },
            "skipped_missing_country": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["known", "computed", "unresolved", "accuracy", "sweeps"]
    })
}
