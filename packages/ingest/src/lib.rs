#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset preparation.
//!
//! Loads every source named in the dataset configuration, re-projects
//! geometry to EPSG:4326, joins each record to a neighborhood, and derives
//! calendar fields. The result is an immutable [`PreparedDatasets`] that
//! every filter change recomputes indicators from.
//!
//! The neighborhood layer is required. Every other source is optional: a
//! source that is not configured, or whose file cannot be read, is logged
//! and contributes no rows.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use city_monitor_neighborhood::{NeighborhoodError, load_neighborhoods};
use city_monitor_neighborhood_models::Neighborhood;
use city_monitor_source::SourceError;
use city_monitor_source::cache::SourceCache;
use city_monitor_source::census::{merge_attributes, parse_attributes, parse_sectors};
use city_monitor_source::config::{
    CensusSource, DatasetConfig, IncidentsSource, ReadingsSource, SurveySource,
};
use city_monitor_source::incidents::parse_incidents;
use city_monitor_source::normalize::decompose_timestamp;
use city_monitor_source::progress::ProgressCallback;
use city_monitor_source::readings::parse_readings;
use city_monitor_source::survey::parse_survey;
use city_monitor_source::tabular::CsvTable;
use city_monitor_source_models::{
    IncidentRecord, IncidentRow, LoadReport, RateAggregation, ReadingRow, SectorContribution,
    SurveyRow,
};
use city_monitor_spatial::layer::FeatureLayer;
use city_monitor_spatial::{JoinReport, NeighborhoodIndex};
use serde::Serialize;

/// Number of preparation steps reported through [`ProgressCallback`].
pub const PREPARE_STEPS: u64 = 5;

/// Errors that abort dataset preparation.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The dataset configuration could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The neighborhood layer could not be loaded.
    #[error(transparent)]
    Neighborhood(#[from] NeighborhoodError),
}

/// Load and join counters for one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    /// File parsing counters.
    pub load: LoadReport,
    /// Neighborhood join counters.
    pub join: JoinReport,
    /// Attribute table counters, for sources that merge one in. Rows
    /// matching no record are counted as skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<LoadReport>,
}

/// Counters for every source of one preparation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareReport {
    pub neighborhoods: usize,
    pub readings: Option<SourceSummary>,
    pub incidents: Option<SourceSummary>,
    pub survey: Option<SourceSummary>,
    pub census: Option<SourceSummary>,
}

/// Every dataset joined to neighborhoods, ready for filtering.
pub struct PreparedDatasets {
    /// Neighborhood polygons and their spatial index.
    pub neighborhoods: NeighborhoodIndex,
    /// Sensor readings with their neighborhood and calendar fields.
    pub readings: Vec<ReadingRow>,
    /// Incidents with their neighborhood and calendar fields.
    pub incidents: Vec<IncidentRow>,
    /// Survey rows, one per neighborhood.
    pub survey: Vec<SurveyRow>,
    /// Census sectors attributed to neighborhoods.
    pub census: Vec<SectorContribution>,
    /// How rate-typed variables combine per neighborhood.
    pub rates: RateAggregation,
    /// Counters from loading and joining.
    pub report: PrepareReport,
}

/// Reads the dataset configuration at `path` and prepares it.
///
/// # Errors
///
/// Returns [`IngestError`] if the configuration cannot be read or the
/// neighborhood layer cannot be loaded.
pub fn prepare_from_path(
    path: &Path,
    cache: &mut SourceCache,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PreparedDatasets, IngestError> {
    let config = DatasetConfig::load(path)?;
    prepare(&config, cache, progress)
}

/// Loads and joins every configured source.
///
/// # Errors
///
/// Returns [`IngestError::Neighborhood`] if the neighborhood layer cannot
/// be loaded. Failures in optional sources are logged, not returned.
pub fn prepare(
    config: &DatasetConfig,
    cache: &mut SourceCache,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PreparedDatasets, IngestError> {
    let start = Instant::now();
    progress.set_total(PREPARE_STEPS);

    progress.set_message("neighborhoods".to_string());
    let neighborhoods = load_neighborhoods(&config.neighborhoods, &config.base_dir)?;
    let index = NeighborhoodIndex::new(neighborhoods);
    let mut report = PrepareReport {
        neighborhoods: index.len(),
        ..PrepareReport::default()
    };
    progress.inc(1);

    progress.set_message("sensor readings".to_string());
    let readings = match &config.readings {
        Some(source) => {
            let (rows, summary) = prepare_readings(config, source, &index, cache);
            report.readings = Some(summary);
            rows
        }
        None => not_configured("readings"),
    };
    progress.inc(1);

    progress.set_message("incidents".to_string());
    let incidents = match &config.incidents {
        Some(source) => optional_source(
            "incidents",
            prepare_incidents(config, source, &index, cache),
            &mut report.incidents,
        ),
        None => not_configured("incidents"),
    };
    progress.inc(1);

    progress.set_message("survey".to_string());
    let survey = match &config.survey {
        Some(source) => optional_source(
            "survey",
            prepare_survey(config, source, &index, cache),
            &mut report.survey,
        ),
        None => not_configured("survey"),
    };
    progress.inc(1);

    progress.set_message("census sectors".to_string());
    let census = match &config.census {
        Some(source) => optional_source(
            "census",
            prepare_census(config, source, &index, cache),
            &mut report.census,
        ),
        None => not_configured("census"),
    };
    progress.inc(1);

    let summary = format!(
        "Prepared {} neighborhoods, {} readings, {} incidents, {} survey rows, {} sector rows in {:.1}s",
        index.len(),
        readings.len(),
        incidents.len(),
        survey.len(),
        census.len(),
        start.elapsed().as_secs_f64()
    );
    log::info!("{summary}");
    progress.finish(summary);

    Ok(PreparedDatasets {
        neighborhoods: index,
        readings,
        incidents,
        survey,
        census,
        rates: config.aggregation.rates,
        report,
    })
}

fn not_configured<T>(name: &str) -> Vec<T> {
    log::info!("No {name} source configured");
    Vec::new()
}

fn optional_source<T>(
    name: &str,
    result: Result<(Vec<T>, SourceSummary), SourceError>,
    slot: &mut Option<SourceSummary>,
) -> Vec<T> {
    match result {
        Ok((rows, summary)) => {
            *slot = Some(summary);
            rows
        }
        Err(e) => {
            log::warn!("Skipping {name} source: {e}");
            Vec::new()
        }
    }
}

fn read_table(
    cache: &mut SourceCache,
    path: &Path,
    delimiter: &str,
) -> Result<Arc<CsvTable>, SourceError> {
    let file = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    cache.get_or_load(path, |bytes| CsvTable::from_bytes(&file, bytes, delimiter))
}

/// Sensor exports are read file by file; an unreadable file is skipped
/// without discarding the others.
fn prepare_readings(
    config: &DatasetConfig,
    source: &ReadingsSource,
    index: &NeighborhoodIndex,
    cache: &mut SourceCache,
) -> (Vec<ReadingRow>, SourceSummary) {
    let mut load = LoadReport::default();
    let mut readings = Vec::new();

    for path in &source.paths {
        let path = config.resolve(path);
        let parsed = read_table(cache, &path, &source.delimiter)
            .and_then(|table| parse_readings(&table, &source.columns));
        match parsed {
            Ok((rows, file_report)) => {
                log::debug!(
                    "{}: kept {}/{} readings",
                    path.display(),
                    file_report.kept,
                    file_report.rows
                );
                load.merge(&file_report);
                readings.extend(rows);
            }
            Err(e) => log::warn!("Skipping readings file {}: {e}", path.display()),
        }
    }
    log_load("readings", &load);

    let joined = index.assign_points(readings, |r| Some((r.longitude, r.latitude)));
    let rows = joined
        .rows
        .into_iter()
        .map(|assigned| {
            let reading = assigned.record;
            ReadingRow {
                time: decompose_timestamp(&reading.timestamp),
                id: reading.id,
                neighborhood: assigned.neighborhood,
                timestamp: reading.timestamp,
                channels: reading.channels,
            }
        })
        .collect();

    (
        rows,
        SourceSummary {
            load,
            join: joined.report,
            attributes: None,
        },
    )
}

fn prepare_incidents(
    config: &DatasetConfig,
    source: &IncidentsSource,
    index: &NeighborhoodIndex,
    cache: &mut SourceCache,
) -> Result<(Vec<IncidentRow>, SourceSummary), SourceError> {
    let path = config.resolve(&source.path);
    let table = read_table(cache, &path, &source.delimiter)?;
    let (records, load) = parse_incidents(&table, source)?;
    log_load("incidents", &load);

    let (rows, join) = join_incidents(records, index);
    Ok((
        rows,
        SourceSummary {
            load,
            join,
            attributes: None,
        },
    ))
}

/// Attributes incidents by point when the export carries coordinates that
/// fall in a neighborhood, otherwise by the normalized neighborhood column.
///
/// Name-attributed incidents are kept even when the name is not in the
/// boundary layer; they simply never match a reading downstream.
fn join_incidents(
    records: Vec<IncidentRecord>,
    index: &NeighborhoodIndex,
) -> (Vec<IncidentRow>, JoinReport) {
    let mut report = JoinReport {
        input: records.len(),
        ..JoinReport::default()
    };
    let mut unknown_names = 0;
    let mut rows = Vec::with_capacity(records.len());

    for incident in records {
        let by_point = incident
            .point()
            .and_then(|(lng, lat)| index.lookup_point(lng, lat))
            .map(str::to_string);
        let Some(neighborhood) = by_point.or_else(|| incident.neighborhood.clone()) else {
            report.unmatched += 1;
            continue;
        };
        if index.get(&neighborhood).is_none() {
            unknown_names += 1;
        }
        rows.push(IncidentRow {
            neighborhood,
            time: decompose_timestamp(&incident.timestamp),
            incident,
        });
    }

    if unknown_names > 0 {
        log::warn!("{unknown_names} incidents name a neighborhood missing from the boundary layer");
    }
    report.assigned = rows.len();
    (rows, report)
}

fn prepare_survey(
    config: &DatasetConfig,
    source: &SurveySource,
    index: &NeighborhoodIndex,
    cache: &mut SourceCache,
) -> Result<(Vec<SurveyRow>, SourceSummary), SourceError> {
    let path = config.resolve(&source.path);
    let table = read_table(cache, &path, &source.delimiter)?;
    let (rows, load) = parse_survey(&table, &source.columns)?;
    log_load("survey", &load);

    let unknown: Vec<&str> = rows
        .iter()
        .map(|r| r.neighborhood.as_str())
        .filter(|name| index.get(name).is_none())
        .collect();
    if !unknown.is_empty() {
        log::warn!(
            "Survey rows for unknown neighborhoods: {}",
            unknown.join(", ")
        );
    }

    let join = JoinReport {
        input: rows.len(),
        assigned: rows.len(),
        ..JoinReport::default()
    };
    Ok((
        rows,
        SourceSummary {
            load,
            join,
            attributes: None,
        },
    ))
}

fn prepare_census(
    config: &DatasetConfig,
    source: &CensusSource,
    index: &NeighborhoodIndex,
    cache: &mut SourceCache,
) -> Result<(Vec<SectorContribution>, SourceSummary), SourceError> {
    let path = config.resolve(&source.sectors);
    let layer = cache.get_or_load(&path, |bytes| {
        FeatureLayer::parse(&String::from_utf8_lossy(bytes), source.crs).map_err(SourceError::from)
    })?;
    let (mut sectors, load) = parse_sectors(&layer, source);
    log_load("census sectors", &load);

    let attributes = source.attributes.as_ref().and_then(|attributes| {
        let path = config.resolve(attributes);
        let parsed = read_table(cache, &path, &source.delimiter)
            .and_then(|table| parse_attributes(&table, source));
        match parsed {
            Ok((attributes, mut report)) => {
                let orphaned = merge_attributes(&mut sectors, &attributes);
                report.kept -= orphaned;
                report.skipped += orphaned;
                log_load("census attributes", &report);
                Some(report)
            }
            Err(e) => {
                log::warn!(
                    "Skipping census attributes {}: {e}; sectors keep their layer values",
                    path.display()
                );
                None
            }
        }
    });

    let joined = index.assign_polygons(sectors, |s| Some(&s.boundary), source.predicate);
    let rows = joined
        .rows
        .into_iter()
        .map(|assigned| SectorContribution {
            neighborhood: assigned.neighborhood,
            code: assigned.record.code,
            values: assigned.record.values,
        })
        .collect();

    Ok((
        rows,
        SourceSummary {
            load,
            join: joined.report,
            attributes,
        },
    ))
}

fn log_load(name: &str, report: &LoadReport) {
    log::info!(
        "Loaded {name}: kept {}/{} rows ({} bad timestamps, {} bad coordinates, {} skipped)",
        report.kept,
        report.rows,
        report.bad_timestamp,
        report.bad_coordinates,
        report.skipped
    );
}

/// Neighborhoods of a prepared dataset, sorted by name.
#[must_use]
pub fn neighborhood_list(prepared: &PreparedDatasets) -> Vec<&Neighborhood> {
    let mut list: Vec<&Neighborhood> = prepared.neighborhoods.neighborhoods().iter().collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    list
}
