//! ---
//! gd_section: "02-interpolation-engine"
//! gd_subsection: "module"
//! gd_type: "source"
//! gd_scope: "code"
//! gd_description: "Interpolation of missing substation and line coordinates."
//! gd_version: "v0.0.0-prealpha"
//! gd_owner: "tbd"
//! ---
//! Persistence of verified substation and line coordinates.
//!
//! Line records are kept per country perspective: a cross-border line is
//! stored once under each of its two countries, so that loading the lines of
//! one country finds it. [`GeoStore::lines`] hides that duplication and
//! exposes each line once.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    errors::Result,
    model::{Country, LineGeoData, SubstationGeoData, SubstationId},
};

pub trait GeoStore {
    fn substations(&self) -> Result<IndexMap<SubstationId, SubstationGeoData>>;

    /// Every stored line, once per id.
    fn lines(&self) -> Result<IndexMap<String, LineGeoData>>;

    /// Lines recorded under the perspective of `country`, cross-border lines included.
    fn lines_by_country(&self, country: &Country) -> Result<Vec<LineGeoData>>;

    fn save_substations(&mut self, substations: &[SubstationGeoData]) -> Result<()>;

    fn save_lines(&mut self, lines: &[LineGeoData]) -> Result<()>;
}

/// Which endpoint's country a line record is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSide {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub country: Country,
    pub other_country: Country,
    pub side: LineSide,
    pub line: LineGeoData,
}

impl LineRecord {
    fn perspectives(line: &LineGeoData) -> Vec<LineRecord> {
        let start = LineRecord {
            country: line.country1.clone(),
            other_country: line.country2.clone(),
            side: LineSide::Start,
            line: line.clone(),
        };
        if !line.is_cross_border() {
            return vec![start];
        }
        let end = LineRecord {
            country: line.country2.clone(),
            other_country: line.country1.clone(),
            side: LineSide::End,
            line: line.clone(),
        };
        vec![start, end]
    }
}

/// Serializable content shared by the store implementations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoStoreDocument {
    #[serde(default)]
    pub substations: IndexMap<SubstationId, SubstationGeoData>,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
}

impl GeoStoreDocument {
    fn upsert_substations(&mut self, substations: &[SubstationGeoData]) {
        for s in substations {
            self.substations.insert(s.id.clone(), s.clone());
        }
    }

    fn upsert_lines(&mut self, lines: &[LineGeoData]) {
        for line in lines {
            // perspectives of the previous save may not apply anymore
            self.lines.retain(|r| r.line.id != line.id);
            self.lines.extend(LineRecord::perspectives(line));
        }
    }

    fn unique_lines(&self) -> IndexMap<String, LineGeoData> {
        let mut unique = IndexMap::new();
        for record in &self.lines {
            match record.side {
                LineSide::Start => {
                    unique.insert(record.line.id.clone(), record.line.clone());
                }
                LineSide::End => {
                    unique
                        .entry(record.line.id.clone())
                        .or_insert_with(|| record.line.clone());
                }
            }
        }
        unique
    }

    fn lines_for(&self, country: &Country) -> Vec<LineGeoData> {
        self.lines
            .iter()
            .filter(|r| &r.country == country)
            .map(|r| r.line.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryGeoStore {
    document: GeoStoreDocument,
}

impl InMemoryGeoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &GeoStoreDocument {
        &self.document
    }
}

impl GeoStore for InMemoryGeoStore {
    fn substations(&self) -> Result<IndexMap<SubstationId, SubstationGeoData>> {
        Ok(self.document.substations.clone())
    }

    fn lines(&self) -> Result<IndexMap<String, LineGeoData>> {
        Ok(self.document.unique_lines())
    }

    fn lines_by_country(&self, country: &Country) -> Result<Vec<LineGeoData>> {
        Ok(self.document.lines_for(country))
    }

    fn save_substations(&mut self, substations: &[SubstationGeoData]) -> Result<()> {
        self.document.upsert_substations(substations);
        Ok(())
    }

    fn save_lines(&mut self, lines: &[LineGeoData]) -> Result<()> {
        self.document.upsert_lines(lines);
        Ok(())
    }
}

/// Store backed by a single JSON document, rewritten on every save.
#[derive(Debug, Clone)]
pub struct JsonFileGeoStore {
    path: PathBuf,
    document: GeoStoreDocument,
}

impl JsonFileGeoStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = if path.exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str(&data)?
        } else {
            debug!(path = %path.display(), "geo store file absent, starting empty");
            GeoStoreDocument::default()
        };
        info!(
            path = %path.display(),
            substations = document.substations.len(),
            line_records = document.lines.len(),
            "geo store opened"
        );
        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&self.document)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl GeoStore for JsonFileGeoStore {
    fn substations(&self) -> Result<IndexMap<SubstationId, SubstationGeoData>> {
        Ok(self.document.substations.clone())
    }

    fn lines(&self) -> Result<IndexMap<String, LineGeoData>> {
        Ok(self.document.unique_lines())
    }

    fn lines_by_country(&self, country: &Country) -> Result<Vec<LineGeoData>> {
        Ok(self.document.lines_for(country))
    }

    fn save_substations(&mut self, substations: &[SubstationGeoData]) -> Result<()> {
        self.document.upsert_substations(substations);
        self.persist()?;
        info!(count = substations.len(), "substation geo data saved");
        Ok(())
    }

    fn save_lines(&mut self, lines: &[LineGeoData]) -> Result<()> {
        self.document.upsert_lines(lines);
        self.persist()?;
        info!(count = lines.len(), "line geo data saved");
        Ok(())
    }
}
