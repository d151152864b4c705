//! Dataset configuration.
//!
//! A single TOML file names every input of the pipeline. Paths are
//! resolved relative to the directory containing the file. Only the
//! neighborhood layer is required; every other source may be omitted and
//! then contributes no rows.
//!
//! ```toml
//! [neighborhoods]
//! path = "bairros.geojson"
//! name_property = "nome"
//! crs = 31982
//!
//! [readings]
//! paths = ["AMV_01.csv", "AMV_02.csv"]
//! delimiter = "|"
//!
//! [incidents]
//! path = "SEGURANCA_PUBLICA.csv"
//! municipality = "Caxias do Sul"
//!
//! [survey]
//! path = "SATISFACAO.csv"
//!
//! [census]
//! sectors = "setores.geojson"
//! attributes = "AGREGADO_SETOR_RS.csv"
//! municipality = "Caxias do Sul"
//!
//! [aggregation]
//! rates = "sum"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use city_monitor_neighborhood_models::NeighborhoodLayer;
use city_monitor_source_models::{CensusVariable, RateAggregation, SurveyItem};
use city_monitor_spatial::PolygonPredicate;
use serde::Deserialize;

use crate::SourceError;

/// Top-level dataset configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Neighborhood boundary layer. Required.
    pub neighborhoods: NeighborhoodLayer,
    /// Environmental sensor exports.
    pub readings: Option<ReadingsSource>,
    /// Public-safety incident export.
    pub incidents: Option<IncidentsSource>,
    /// Satisfaction survey results.
    pub survey: Option<SurveySource>,
    /// Census sectors and their attributes.
    pub census: Option<CensusSource>,
    /// Aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationSettings,
    /// Directory relative paths are resolved against. Set by
    /// [`DatasetConfig::load`].
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl DatasetConfig {
    /// Parses a configuration from TOML text. Relative paths resolve
    /// against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the TOML is malformed or misses a
    /// required field.
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self, SourceError> {
        let mut config: Self = toml::from_str(text)?;
        config.base_dir = base_dir.to_path_buf();
        Ok(config)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let config = Self::parse(&text, base_dir)?;
        log::debug!("Loaded dataset configuration from {}", path.display());
        Ok(config)
    }

    /// Resolves a configured path against the configuration directory.
    #[must_use]
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_dir.join(path)
    }
}

/// Aggregation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct AggregationSettings {
    /// How rate-typed variables combine per neighborhood.
    #[serde(default)]
    pub rates: RateAggregation,
}

/// Environmental sensor exports. All files share one layout.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadingsSource {
    /// CSV files, concatenated in order.
    pub paths: Vec<String>,
    /// Field delimiter.
    #[serde(default = "default_pipe")]
    pub delimiter: String,
    /// Column names.
    #[serde(default)]
    pub columns: ReadingColumns,
}

/// Column names of a sensor export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReadingColumns {
    /// Record id column. Rows are identified by `file:row` when unset.
    pub id: Option<String>,
    /// Timestamp column.
    pub timestamp: String,
    /// Latitude column.
    pub latitude: String,
    /// Longitude column.
    pub longitude: String,
    /// Temperature column.
    pub temperature: String,
    /// Humidity column.
    pub humidity: String,
    /// Luminosity column.
    pub luminosity: String,
    /// Noise column.
    pub noise: String,
    /// eCO2 column.
    pub eco2: String,
    /// eTVOC column.
    pub etvoc: String,
}

impl Default for ReadingColumns {
    fn default() -> Self {
        Self {
            id: None,
            timestamp: "data".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            temperature: "temperatura".to_string(),
            humidity: "umidade".to_string(),
            luminosity: "luminosidade".to_string(),
            noise: "ruido".to_string(),
            eco2: "eco2".to_string(),
            etvoc: "etvoc".to_string(),
        }
    }
}

/// Public-safety incident export.
#[derive(Debug, Clone, Deserialize)]
pub struct IncidentsSource {
    /// CSV file.
    pub path: String,
    /// Field delimiter.
    #[serde(default = "default_comma")]
    pub delimiter: String,
    /// Keep only incidents in this municipality (compared after name
    /// normalization).
    pub municipality: Option<String>,
    /// Column names.
    #[serde(default)]
    pub columns: IncidentColumns,
}

/// Column names of an incident export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IncidentColumns {
    /// Record id column. Rows are identified by `file:row` when unset.
    pub id: Option<String>,
    /// Municipality column.
    pub municipality: String,
    /// Neighborhood column, used when the row has no coordinates.
    pub neighborhood: String,
    /// Date column (text date, or spreadsheet serial).
    pub date: String,
    /// Time-of-day column. When unset, the date column must carry the time.
    pub time: Option<String>,
    /// Place type column.
    pub place_type: Option<String>,
    /// Description column.
    pub description: String,
    /// Completion status column.
    pub completion: String,
    /// Flagrant flag column.
    pub flagrant: Option<String>,
    /// Latitude column, when the export carries coordinates.
    pub latitude: Option<String>,
    /// Longitude column, when the export carries coordinates.
    pub longitude: Option<String>,
}

impl Default for IncidentColumns {
    fn default() -> Self {
        Self {
            id: None,
            municipality: "Municipio".to_string(),
            neighborhood: "Bairro".to_string(),
            date: "Data Fato".to_string(),
            time: Some("Hora Fato".to_string()),
            place_type: Some("Tipo Local".to_string()),
            description: "Desc Fato".to_string(),
            completion: "Tipo Fato".to_string(),
            flagrant: Some("Flagrante".to_string()),
            latitude: None,
            longitude: None,
        }
    }
}

/// Satisfaction survey results, one row per neighborhood.
#[derive(Debug, Clone, Deserialize)]
pub struct SurveySource {
    /// CSV file.
    pub path: String,
    /// Field delimiter.
    #[serde(default = "default_comma")]
    pub delimiter: String,
    /// Column names.
    #[serde(default)]
    pub columns: SurveyColumns,
}

/// Column names of a survey export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SurveyColumns {
    /// Neighborhood column.
    pub neighborhood: String,
    /// Response count column.
    pub responses: String,
    /// Per-item header overrides. Items not listed use their question text.
    pub items: BTreeMap<SurveyItem, String>,
}

impl Default for SurveyColumns {
    fn default() -> Self {
        Self {
            neighborhood: "BAIRRO".to_string(),
            responses: "Qtd respostas".to_string(),
            items: BTreeMap::new(),
        }
    }
}

impl SurveyColumns {
    /// Header of one survey item.
    #[must_use]
    pub fn header(&self, item: SurveyItem) -> &str {
        self.items
            .get(&item)
            .map_or_else(|| item.question(), String::as_str)
    }
}

/// Census sector polygons and the attribute table keyed by sector code.
#[derive(Debug, Clone, Deserialize)]
pub struct CensusSource {
    /// `GeoJSON` `FeatureCollection` of sector polygons.
    pub sectors: String,
    /// EPSG code of the sector layer, overriding its `crs` member.
    pub crs: Option<u32>,
    /// Attribute CSV joined to the sectors by code. Variables may also be
    /// read from the sector features' properties.
    pub attributes: Option<String>,
    /// Attribute CSV delimiter.
    #[serde(default = "default_semicolon")]
    pub delimiter: String,
    /// Keep only sectors in this municipality.
    pub municipality: Option<String>,
    /// Spatial predicate joining sectors to neighborhoods.
    #[serde(default)]
    pub predicate: PolygonPredicate,
    /// Column and property names.
    #[serde(default)]
    pub columns: CensusColumns,
}

/// Column and property names of the census inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CensusColumns {
    /// Sector code, in both the layer and the attribute table.
    pub code: String,
    /// Municipality name, in both the layer and the attribute table.
    pub municipality: String,
    /// Per-variable header overrides. Variables not listed use their code.
    pub variables: BTreeMap<CensusVariable, String>,
}

impl Default for CensusColumns {
    fn default() -> Self {
        Self {
            code: "CD_SETOR".to_string(),
            municipality: "NM_MUN".to_string(),
            variables: BTreeMap::new(),
        }
    }
}

impl CensusColumns {
    /// Header of one census variable.
    #[must_use]
    pub fn header(&self, variable: CensusVariable) -> &str {
        self.variables
            .get(&variable)
            .map_or_else(|| variable.code(), String::as_str)
    }
}

fn default_pipe() -> String {
    "|".to_string()
}

fn default_comma() -> String {
    ",".to_string()
}

fn default_semicolon() -> String {
    ";".to_string()
}

/// Converts a configured delimiter to the single byte `csv` expects.
///
/// # Errors
///
/// Returns [`SourceError::InvalidDelimiter`] unless the delimiter is
/// exactly one ASCII character.
pub fn delimiter_byte(delimiter: &str) -> Result<u8, SourceError> {
    match delimiter.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(SourceError::InvalidDelimiter {
            delimiter: delimiter.to_string(),
        }),
    }
}
