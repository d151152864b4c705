//! Satisfaction survey loader.

use std::collections::BTreeMap;

use city_monitor_neighborhood::names::normalize_key;
use city_monitor_source_models::{LoadReport, SurveyItem, SurveyRow};

use crate::SourceError;
use crate::config::SurveyColumns;
use crate::parsing::parse_number;
use crate::tabular::{CsvTable, cell, optional_cell};

/// Parses a survey export. Rows without a neighborhood are skipped;
/// blank or missing score columns are left out of the row.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumn`] if the neighborhood column is
/// absent.
pub fn parse_survey(
    table: &CsvTable,
    columns: &SurveyColumns,
) -> Result<(Vec<SurveyRow>, LoadReport), SourceError> {
    let neighborhood_col = table.require(&columns.neighborhood)?;
    let responses_col = table.optional(Some(&columns.responses));
    let item_cols: Vec<(SurveyItem, Option<usize>)> = SurveyItem::ALL
        .into_iter()
        .map(|item| (item, table.optional(Some(columns.header(item)))))
        .collect();

    let mut report = LoadReport {
        rows: table.records.len(),
        ..LoadReport::default()
    };
    let mut rows = Vec::with_capacity(table.records.len());

    for record in &table.records {
        let Some(neighborhood) = normalize_key(cell(record, neighborhood_col)) else {
            report.skipped += 1;
            continue;
        };

        let scores: BTreeMap<SurveyItem, f64> = item_cols
            .iter()
            .filter_map(|(item, index)| {
                optional_cell(record, *index)
                    .and_then(parse_number)
                    .map(|value| (*item, value))
            })
            .collect();

        rows.push(SurveyRow {
            neighborhood,
            responses: optional_cell(record, responses_col).and_then(parse_number),
            scores,
        });
    }

    report.kept = rows.len();
    Ok((rows, report))
}
