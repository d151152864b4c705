//! Per-neighborhood aggregation and the wide indicator table.

use std::collections::BTreeMap;

use city_monitor_analytics_models::{FilterSpec, IndicatorRow, IndicatorTable};
use city_monitor_source_models::{
    CensusVariable, IncidentRow, RateAggregation, ReadingRow, SectorContribution, SurveyItem,
    SurveyRow, VariableKind,
};

use crate::filter::{filter_incidents, filter_readings};

/// Running sum and count of one value.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self, kind: VariableKind, rates: RateAggregation) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(match (kind, rates) {
            (VariableKind::Rate, RateAggregation::Mean) => self.sum / self.count as f64,
            (VariableKind::Count | VariableKind::Rate, RateAggregation::Sum)
            | (VariableKind::Count, RateAggregation::Mean) => self.sum,
        })
    }
}

/// Survey totals of one neighborhood.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyAggregate {
    pub responses: Option<f64>,
    pub scores: BTreeMap<SurveyItem, f64>,
}

/// Incidents per neighborhood: the row count, not a column sum.
#[must_use]
pub fn count_crimes(incidents: &[&IncidentRow]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for incident in incidents {
        *counts.entry(incident.neighborhood.clone()).or_insert(0) += 1;
    }
    counts
}

/// Survey rows combined per neighborhood.
///
/// Response counts are summed. Scores are treated as rates and follow
/// `rates`. A value missing from every row of a neighborhood stays
/// missing.
#[must_use]
pub fn aggregate_survey(
    rows: &[SurveyRow],
    rates: RateAggregation,
) -> BTreeMap<String, SurveyAggregate> {
    let mut accumulators: BTreeMap<&str, (Accumulator, BTreeMap<SurveyItem, Accumulator>)> =
        BTreeMap::new();
    for row in rows {
        let (responses, scores) = accumulators.entry(row.neighborhood.as_str()).or_default();
        if let Some(value) = row.responses {
            responses.add(value);
        }
        for (item, value) in &row.scores {
            scores.entry(*item).or_default().add(*value);
        }
    }

    accumulators
        .into_iter()
        .map(|(name, (responses, scores))| {
            let aggregate = SurveyAggregate {
                responses: responses.finish(VariableKind::Count, rates),
                scores: scores
                    .into_iter()
                    .filter_map(|(item, acc)| {
                        acc.finish(VariableKind::Rate, rates).map(|v| (item, v))
                    })
                    .collect(),
            };
            (name.to_string(), aggregate)
        })
        .collect()
}

/// Census contributions combined per neighborhood.
///
/// Count variables are summed. Rate variables follow `rates`. Sectors
/// duplicated across neighborhoods by the spatial join count in each.
#[must_use]
pub fn aggregate_census(
    rows: &[SectorContribution],
    rates: RateAggregation,
) -> BTreeMap<String, BTreeMap<CensusVariable, f64>> {
    let mut accumulators: BTreeMap<&str, BTreeMap<CensusVariable, Accumulator>> = BTreeMap::new();
    for row in rows {
        let variables = accumulators.entry(row.neighborhood.as_str()).or_default();
        for (variable, value) in &row.values {
            variables.entry(*variable).or_default().add(*value);
        }
    }

    accumulators
        .into_iter()
        .map(|(name, variables)| {
            let values = variables
                .into_iter()
                .filter_map(|(variable, acc)| {
                    acc.finish(variable.kind(), rates).map(|v| (variable, v))
                })
                .collect();
            (name.to_string(), values)
        })
        .collect()
}

/// Builds the wide indicator table for one filter selection.
///
/// Filtered readings form the base. Crime counts of the filtered
/// incidents, then survey aggregates, then census aggregates are
/// left-joined on neighborhood name. Survey and census rows are not
/// filtered; they describe the neighborhood, not a moment.
#[must_use]
pub fn aggregate(
    readings: &[ReadingRow],
    incidents: &[IncidentRow],
    survey: &[SurveyRow],
    census: &[SectorContribution],
    filter: &FilterSpec,
    rates: RateAggregation,
) -> IndicatorTable {
    let base = filter_readings(readings, filter);
    let crimes = count_crimes(&filter_incidents(incidents, filter));
    let survey = aggregate_survey(survey, rates);
    let census = aggregate_census(census, rates);

    log::debug!(
        "Aggregating {} of {} readings against {} neighborhoods with incidents",
        base.len(),
        readings.len(),
        crimes.len()
    );

    let rows = base
        .into_iter()
        .map(|reading| {
            let answers = survey.get(&reading.neighborhood);
            IndicatorRow {
                id: reading.id.clone(),
                neighborhood: reading.neighborhood.clone(),
                timestamp: reading.timestamp,
                time: reading.time,
                channels: reading.channels,
                crime_count: crimes.get(&reading.neighborhood).copied(),
                responses: answers.and_then(|s| s.responses),
                survey: answers.map(|s| s.scores.clone()).unwrap_or_default(),
                census: census
                    .get(&reading.neighborhood)
                    .cloned()
                    .unwrap_or_default(),
            }
        })
        .collect();

    IndicatorTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use city_monitor_analytics_models::IndicatorColumn;

    use crate::filter::tests::{at, fields, incident_record, reading};

    fn incident(neighborhood: &str, hour: u32) -> IncidentRow {
        let timestamp = at(4, hour);
        IncidentRow {
            neighborhood: neighborhood.to_string(),
            time: fields(&timestamp),
            incident: incident_record(timestamp),
        }
    }

    fn survey_row(neighborhood: &str, responses: f64, sat01: Option<f64>) -> SurveyRow {
        SurveyRow {
            neighborhood: neighborhood.to_string(),
            responses: Some(responses),
            scores: sat01
                .map(|v| BTreeMap::from([(SurveyItem::Sat01, v)]))
                .unwrap_or_default(),
        }
    }

    fn sector(neighborhood: &str, v0001: f64, v0005: f64) -> SectorContribution {
        SectorContribution {
            neighborhood: neighborhood.to_string(),
            code: format!("{neighborhood}-{v0001}"),
            values: BTreeMap::from([
                (CensusVariable::V0001, v0001),
                (CensusVariable::V0005, v0005),
            ]),
        }
    }

    #[test]
    fn crime_count_is_row_count() {
        let incidents = [incident("A", 9), incident("A", 10), incident("B", 20)];
        let refs: Vec<&IncidentRow> = incidents.iter().collect();
        let counts = count_crimes(&refs);
        assert_eq!(counts.get("A"), Some(&2));
        assert_eq!(counts.get("B"), Some(&1));
    }

    #[test]
    fn rates_sum_or_average() {
        let sectors = [sector("A", 100.0, 3.0), sector("A", 50.0, 2.0)];

        let summed = aggregate_census(&sectors, RateAggregation::Sum);
        assert_eq!(summed["A"][&CensusVariable::V0001], 150.0);
        assert_eq!(summed["A"][&CensusVariable::V0005], 5.0);

        let averaged = aggregate_census(&sectors, RateAggregation::Mean);
        assert_eq!(averaged["A"][&CensusVariable::V0001], 150.0);
        assert_eq!(averaged["A"][&CensusVariable::V0005], 2.5);
    }

    #[test]
    fn survey_missing_scores_stay_missing() {
        let rows = [survey_row("A", 10.0, None), survey_row("A", 5.0, None)];
        let aggregated = aggregate_survey(&rows, RateAggregation::Sum);
        assert_eq!(aggregated["A"].responses, Some(15.0));
        assert!(aggregated["A"].scores.is_empty());
    }

    #[test]
    fn left_join_yields_none_not_dropped_rows() {
        let readings = [
            reading("A", at(4, 9), Some(10.0)),
            reading("B", at(4, 9), Some(15.0)),
        ];
        let incidents = [incident("A", 9)];
        let survey = [survey_row("A", 12.0, Some(7.0))];
        let census = [sector("B", 80.0, 2.0)];

        let table = aggregate(
            &readings,
            &incidents,
            &survey,
            &census,
            &FilterSpec::default(),
            RateAggregation::Sum,
        );

        assert_eq!(table.len(), 2);
        let a = &table.rows[0];
        assert_eq!(a.value(IndicatorColumn::CrimeCount), Some(1.0));
        assert_eq!(a.value(IndicatorColumn::Survey(SurveyItem::Sat01)), Some(7.0));
        assert_eq!(a.value(IndicatorColumn::Census(CensusVariable::V0001)), None);

        let b = &table.rows[1];
        assert_eq!(b.crime_count, None);
        assert_eq!(b.responses, None);
        assert_eq!(b.value(IndicatorColumn::Census(CensusVariable::V0001)), Some(80.0));
    }

    #[test]
    fn filters_that_match_nothing_give_an_empty_table() {
        let readings = [reading("A", at(4, 9), Some(10.0))];
        let filter = FilterSpec {
            neighborhoods: BTreeSet::from(["Z".to_string()]),
            ..FilterSpec::default()
        };
        let table = aggregate(&readings, &[], &[], &[], &filter, RateAggregation::Sum);
        assert!(table.is_empty());
    }

    #[test]
    fn incidents_follow_categorical_filters() {
        let readings = [reading("A", at(4, 9), Some(10.0))];
        let incidents = [incident("A", 9), incident("A", 20)];
        let filter = FilterSpec {
            periods: BTreeSet::from([city_monitor_source_models::DayPeriod::Morning]),
            ..FilterSpec::default()
        };
        let table = aggregate(&readings, &incidents, &[], &[], &filter, RateAggregation::Sum);
        assert_eq!(table.rows[0].crime_count, Some(1));
    }
}
