//! Public-safety incident export loader.

use city_monitor_neighborhood::names::{normalize_key, normalize_name};
use city_monitor_source_models::{IncidentRecord, LoadReport};

use crate::SourceError;
use crate::config::IncidentsSource;
use crate::normalize::outside_municipality;
use crate::parsing::{non_empty, parse_flag, parse_number, parse_time_of_day, parse_timestamp};
use crate::tabular::{CsvTable, cell, optional_cell};
use crate::type_mapping::classify_incident;

/// Parses an incident export.
///
/// The occurrence time is the date column combined with the time-of-day
/// column when one is configured. Rows whose date or time cannot be parsed
/// are dropped, since their period of day cannot be derived. Rows naming
/// another municipality than the configured one are skipped; rows with a
/// blank municipality are kept.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumn`] if the date, description, or
/// completion column is absent.
pub fn parse_incidents(
    table: &CsvTable,
    source: &IncidentsSource,
) -> Result<(Vec<IncidentRecord>, LoadReport), SourceError> {
    let columns = &source.columns;
    let date_col = table.require(&columns.date)?;
    let description_col = table.require(&columns.description)?;
    let completion_col = table.require(&columns.completion)?;
    let time_col = columns
        .time
        .as_deref()
        .map(|c| table.require(c))
        .transpose()?;
    let municipality_col = table.optional(Some(&columns.municipality));
    let neighborhood_col = table.optional(Some(&columns.neighborhood));
    let place_col = table.optional(columns.place_type.as_deref());
    let flagrant_col = table.optional(columns.flagrant.as_deref());
    let lat_col = table.optional(columns.latitude.as_deref());
    let lng_col = table.optional(columns.longitude.as_deref());
    let id_col = table.optional(columns.id.as_deref());

    let wanted_municipality = source.municipality.as_deref().map(normalize_name);

    let mut report = LoadReport {
        rows: table.records.len(),
        ..LoadReport::default()
    };
    let mut incidents = Vec::with_capacity(table.records.len());

    for (row, record) in table.records.iter().enumerate() {
        let municipality = optional_cell(record, municipality_col).and_then(normalize_key);
        if outside_municipality(wanted_municipality.as_deref(), municipality.as_deref()) {
            report.skipped += 1;
            continue;
        }

        let Some(date) = parse_timestamp(cell(record, date_col)) else {
            report.bad_timestamp += 1;
            continue;
        };
        let timestamp = match time_col {
            Some(index) => match parse_time_of_day(cell(record, index)) {
                Some(time) => date.date().and_time(time),
                None => {
                    report.bad_timestamp += 1;
                    continue;
                }
            },
            None => date,
        };

        let description = cell(record, description_col).trim().to_string();
        let (completion, class) = classify_incident(cell(record, completion_col), &description);

        let id = optional_cell(record, id_col)
            .and_then(non_empty)
            .map_or_else(|| format!("{}:{}", table.file(), row + 1), str::to_string);

        incidents.push(IncidentRecord {
            id,
            timestamp,
            latitude: optional_cell(record, lat_col).and_then(parse_number),
            longitude: optional_cell(record, lng_col).and_then(parse_number),
            municipality,
            neighborhood: optional_cell(record, neighborhood_col).and_then(normalize_key),
            place_type: optional_cell(record, place_col)
                .and_then(non_empty)
                .map(str::to_string),
            description,
            completion,
            flagrant: optional_cell(record, flagrant_col).and_then(parse_flag),
            class,
        });
    }

    report.kept = incidents.len();
    Ok((incidents, report))
}
