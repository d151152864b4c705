//! Census sector layer and attribute table loader.

use std::collections::{BTreeMap, BTreeSet};

use city_monitor_neighborhood::names::{normalize_key, normalize_name};
use city_monitor_source_models::{CensusSectorRow, CensusVariable, LoadReport};
use city_monitor_spatial::layer::FeatureLayer;
use geojson::Feature;

use crate::SourceError;
use crate::config::CensusSource;
use crate::normalize::outside_municipality;
use crate::parsing::{non_empty, parse_number};
use crate::tabular::{CsvTable, cell, optional_cell};

/// Census values keyed by sector code.
pub type SectorAttributes = BTreeMap<String, BTreeMap<CensusVariable, f64>>;

/// Converts sector features into rows.
///
/// Features without a code or usable polygon are dropped and counted.
/// When a municipality filter is configured, features naming another
/// municipality are skipped. Variables found among the feature properties
/// are kept as initial values.
#[must_use]
pub fn parse_sectors(layer: &FeatureLayer, source: &CensusSource) -> (Vec<CensusSectorRow>, LoadReport) {
    let columns = &source.columns;
    let wanted = source.municipality.as_deref().map(normalize_name);

    let mut report = LoadReport {
        rows: layer.features.len(),
        ..LoadReport::default()
    };
    let mut sectors = Vec::with_capacity(layer.features.len());

    for feature in &layer.features {
        let municipality = property_text(feature, &columns.municipality)
            .as_deref()
            .and_then(normalize_key);
        if outside_municipality(wanted.as_deref(), municipality.as_deref()) {
            report.skipped += 1;
            continue;
        }

        let Some(code) = property_text(feature, &columns.code) else {
            report.skipped += 1;
            continue;
        };
        let Some(boundary) = layer.polygons(feature) else {
            report.bad_coordinates += 1;
            continue;
        };

        let values = CensusVariable::ALL
            .into_iter()
            .filter_map(|variable| {
                property_text(feature, columns.header(variable))
                    .as_deref()
                    .and_then(parse_number)
                    .map(|value| (variable, value))
            })
            .collect();

        sectors.push(CensusSectorRow {
            code,
            municipality,
            boundary,
            values,
        });
    }

    if report.bad_coordinates > 0 {
        log::warn!(
            "{} census sectors without usable geometry were dropped",
            report.bad_coordinates
        );
    }

    report.kept = sectors.len();
    (sectors, report)
}

/// Reads the census attribute table into values keyed by sector code.
///
/// Rows naming another municipality or lacking a sector code are skipped
/// and counted.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumn`] if the code column is absent.
pub fn parse_attributes(
    table: &CsvTable,
    source: &CensusSource,
) -> Result<(SectorAttributes, LoadReport), SourceError> {
    let columns = &source.columns;
    let code_col = table.require(&columns.code)?;
    let municipality_col = table.optional(Some(&columns.municipality));
    let variable_cols: Vec<(CensusVariable, Option<usize>)> = CensusVariable::ALL
        .into_iter()
        .map(|variable| (variable, table.optional(Some(columns.header(variable)))))
        .collect();
    let wanted = source.municipality.as_deref().map(normalize_name);

    let mut report = LoadReport {
        rows: table.records.len(),
        ..LoadReport::default()
    };
    let mut attributes = SectorAttributes::new();
    for record in &table.records {
        let municipality = optional_cell(record, municipality_col).and_then(normalize_key);
        if outside_municipality(wanted.as_deref(), municipality.as_deref()) {
            report.skipped += 1;
            continue;
        }
        let Some(code) = non_empty(cell(record, code_col)) else {
            report.skipped += 1;
            continue;
        };

        let values = variable_cols
            .iter()
            .filter_map(|(variable, index)| {
                optional_cell(record, *index)
                    .and_then(parse_number)
                    .map(|value| (*variable, value))
            })
            .collect();
        attributes.insert(code.to_string(), values);
    }

    report.kept = attributes.len();
    log::debug!("Read attributes for {} census sectors", attributes.len());
    Ok((attributes, report))
}

/// Overlays attribute-table values onto sector rows.
///
/// Returns the number of attribute rows whose code matches no sector.
/// Sectors without an attribute row keep the values read from the layer.
pub fn merge_attributes(sectors: &mut [CensusSectorRow], attributes: &SectorAttributes) -> usize {
    let mut used = BTreeSet::new();
    let mut bare = 0;
    for sector in sectors.iter_mut() {
        match attributes.get_key_value(&sector.code) {
            Some((code, values)) => {
                sector.values.extend(values.iter().map(|(k, v)| (*k, *v)));
                used.insert(code.as_str());
            }
            None => bare += 1,
        }
    }
    if bare > 0 {
        log::warn!("{bare} census sectors have no row in the attribute table");
    }

    let orphaned = attributes.len() - used.len();
    if orphaned > 0 {
        log::warn!("{orphaned} attribute rows match no census sector");
    }
    orphaned
}

/// Reads a feature property as text; numbers are rendered without
/// exponent.
fn property_text(feature: &Feature, name: &str) -> Option<String> {
    match feature.property(name)? {
        serde_json::Value::String(s) => non_empty(s).map(str::to_string),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_monitor_spatial::PolygonPredicate;

    use crate::config::CensusColumns;

    const SECTORS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"CD_SETOR": "430510805000001", "NM_MUN": "Caxias do Sul"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"CD_SETOR": 430510805000002, "NM_MUN": "Caxias do Sul", "v0001": 10},
                "geometry": {"type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,1],[1,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"CD_SETOR": "430790305000001", "NM_MUN": "Farroupilha"},
                "geometry": {"type": "Polygon", "coordinates": [[[5,5],[6,5],[6,6],[5,6],[5,5]]]}
            },
            {
                "type": "Feature",
                "properties": {"CD_SETOR": "430510805000003", "NM_MUN": "Caxias do Sul"},
                "geometry": null
            }
        ]
    }"#;

    const ATTRIBUTES: &str = "\
CD_SETOR;NM_MUN;v0001;v0002;v0005;v0006
430510805000001;Caxias do Sul;120;40;2,9;95,5
430510805000002;Caxias do Sul;80;30;;
430790305000001;Farroupilha;999;999;9;9
430510805000009;;5;;;
;Caxias do Sul;1;;;
";

    fn source() -> CensusSource {
        CensusSource {
            sectors: "setores.geojson".to_string(),
            crs: None,
            attributes: Some("agregado.csv".to_string()),
            delimiter: ";".to_string(),
            municipality: Some("Caxias do Sul".to_string()),
            predicate: PolygonPredicate::Intersects,
            columns: CensusColumns::default(),
        }
    }

    #[test]
    fn filters_municipality_and_merges_attributes() {
        let layer = FeatureLayer::parse(SECTORS, None).unwrap();
        let (mut sectors, report) = parse_sectors(&layer, &source());

        assert_eq!(report.rows, 4);
        assert_eq!(report.kept, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.bad_coordinates, 1);
        assert_eq!(sectors[1].code, "430510805000002");
        assert_eq!(sectors[1].values.get(&CensusVariable::V0001), Some(&10.0));

        let table = CsvTable::from_bytes("agregado.csv", ATTRIBUTES.as_bytes(), ";").unwrap();
        let (attributes, attribute_report) = parse_attributes(&table, &source()).unwrap();
        assert_eq!(attributes.len(), 3);
        assert_eq!(attribute_report.rows, 5);
        assert_eq!(attribute_report.kept, 3);
        assert_eq!(attribute_report.skipped, 2);

        // 430510805000009 has a blank municipality, so it is kept, but no
        // sector carries its code.
        let orphaned = merge_attributes(&mut sectors, &attributes);
        assert_eq!(orphaned, 1);
        assert_eq!(sectors[0].values.get(&CensusVariable::V0005), Some(&2.9));
        assert_eq!(sectors[0].values.get(&CensusVariable::V0006), Some(&95.5));
        assert_eq!(sectors[1].values.get(&CensusVariable::V0001), Some(&80.0));
        assert_eq!(sectors[1].values.get(&CensusVariable::V0005), None);
    }
}
