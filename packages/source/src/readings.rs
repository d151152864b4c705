//! Environmental sensor export loader.

use city_monitor_source_models::{Channel, EnvironmentalChannels, LoadReport, SensorReading};

use crate::SourceError;
use crate::config::ReadingColumns;
use crate::normalize::drop_zero_coordinates;
use crate::parsing::{parse_number, parse_timestamp};
use crate::tabular::{CsvTable, cell, optional_cell};

/// Parses one sensor export.
///
/// Rows with an unparseable timestamp or coordinates are dropped and
/// counted, as are rows whose latitude or longitude is zero. Blank or
/// non-numeric channel cells become `None`.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumn`] if a timestamp or coordinate
/// column is absent.
pub fn parse_readings(
    table: &CsvTable,
    columns: &ReadingColumns,
) -> Result<(Vec<SensorReading>, LoadReport), SourceError> {
    let timestamp_col = table.require(&columns.timestamp)?;
    let lat_col = table.require(&columns.latitude)?;
    let lng_col = table.require(&columns.longitude)?;
    let id_col = table.optional(columns.id.as_deref());

    let channel_cols: Vec<(Channel, Option<usize>)> = Channel::ALL
        .into_iter()
        .map(|channel| (channel, table.optional(Some(channel_column(columns, channel)))))
        .collect();

    let mut report = LoadReport {
        rows: table.records.len(),
        ..LoadReport::default()
    };
    let mut readings = Vec::with_capacity(table.records.len());

    for (row, record) in table.records.iter().enumerate() {
        let Some(timestamp) = parse_timestamp(cell(record, timestamp_col)) else {
            report.bad_timestamp += 1;
            continue;
        };
        let (Some(latitude), Some(longitude)) = (
            parse_number(cell(record, lat_col)),
            parse_number(cell(record, lng_col)),
        ) else {
            report.bad_coordinates += 1;
            continue;
        };

        let mut channels = EnvironmentalChannels::default();
        for (channel, index) in &channel_cols {
            channels.set(*channel, optional_cell(record, *index).and_then(parse_number));
        }

        let id = optional_cell(record, id_col)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| format!("{}:{}", table.file(), row + 1), str::to_string);

        readings.push(SensorReading {
            id,
            timestamp,
            latitude,
            longitude,
            channels,
        });
    }

    let (readings, zero) = drop_zero_coordinates(readings);
    report.bad_coordinates += zero;
    report.kept = readings.len();

    Ok((readings, report))
}

fn channel_column(columns: &ReadingColumns, channel: Channel) -> &str {
    match channel {
        Channel::Temperature => columns.temperature.as_str(),
        Channel::Humidity => columns.humidity.as_str(),
        Channel::Luminosity => columns.luminosity.as_str(),
        Channel::Noise => columns.noise.as_str(),
        Channel::Eco2 => columns.eco2.as_str(),
        Channel::Etvoc => columns.etvoc.as_str(),
    }
}
