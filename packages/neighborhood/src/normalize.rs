//! Normalizes boundary features into [`Neighborhood`] values.
//!
//! Uses the layer's [`NeighborhoodFieldMapping`] to extract the
//! neighborhood name from each feature, and the layer's CRS to bring the
//! geometry into EPSG:4326.

use std::collections::BTreeMap;

use city_monitor_neighborhood_models::{Neighborhood, NeighborhoodFieldMapping};
use city_monitor_spatial::layer::FeatureLayer;
use geo::MultiPolygon;
use geojson::Feature;

use crate::names::normalize_key;

/// Counters from normalizing a boundary layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Features in the layer.
    pub features: usize,
    /// Features dropped for lacking a usable name.
    pub missing_name: usize,
    /// Features dropped for missing or degenerate geometry.
    pub invalid_geometry: usize,
    /// Features merged into a same-named neighborhood.
    pub merged: usize,
}

/// Normalizes every feature of a layer into neighborhoods, sorted by name.
///
/// Features sharing a normalized name are merged into one multi-polygon.
#[must_use]
pub fn normalize_features(
    layer: &FeatureLayer,
    fields: &NeighborhoodFieldMapping,
) -> (Vec<Neighborhood>, NormalizeReport) {
    let mut report = NormalizeReport {
        features: layer.features.len(),
        ..NormalizeReport::default()
    };
    let mut by_name: BTreeMap<String, MultiPolygon<f64>> = BTreeMap::new();

    for feature in &layer.features {
        let Some(name) = feature_name(feature, fields) else {
            report.missing_name += 1;
            continue;
        };
        let Some(boundary) = layer.polygons(feature) else {
            log::warn!("Neighborhood {name} has no usable geometry, skipping");
            report.invalid_geometry += 1;
            continue;
        };

        match by_name.get_mut(&name) {
            Some(existing) => {
                existing.0.extend(boundary.0);
                report.merged += 1;
            }
            None => {
                by_name.insert(name, boundary);
            }
        }
    }

    let neighborhoods = by_name
        .into_iter()
        .map(|(name, boundary)| Neighborhood::new(name, boundary))
        .collect();

    (neighborhoods, report)
}

/// Reads the name property of a feature as a normalized key.
fn feature_name(feature: &Feature, fields: &NeighborhoodFieldMapping) -> Option<String> {
    let value = feature.property(&fields.name_property)?;
    match value {
        serde_json::Value::String(s) => normalize_key(s),
        serde_json::Value::Number(n) => normalize_key(&n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"nome": "Água Verde"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"nome": "agua  verde"},
                "geometry": {"type": "Polygon", "coordinates": [[[2,0],[3,0],[3,1],[2,1],[2,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"nome": "Batel"},
                "geometry": {"type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,1],[1,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"nome": null},
                "geometry": {"type": "Polygon", "coordinates": [[[5,5],[6,5],[6,6],[5,6],[5,5]]]}
            },
            {
                "type": "Feature",
                "properties": {"nome": "Vazio"},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn merges_same_name_and_skips_invalid() {
        let layer = FeatureLayer::parse(LAYER, None).unwrap();
        let (neighborhoods, report) =
            normalize_features(&layer, &NeighborhoodFieldMapping::default());

        let names: Vec<&str> = neighborhoods.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["AGUA VERDE", "BATEL"]);
        assert_eq!(neighborhoods[0].boundary.0.len(), 2);
        assert_eq!(
            report,
            NormalizeReport {
                features: 5,
                missing_name: 1,
                invalid_geometry: 1,
                merged: 1,
            }
        );
    }

    #[test]
    fn honors_custom_name_property() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"NM_BAIRRO": "Centro"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
            }]
        }"#;
        let layer = FeatureLayer::parse(text, None).unwrap();
        let fields = NeighborhoodFieldMapping {
            name_property: "NM_BAIRRO".to_string(),
        };
        let (neighborhoods, _) = normalize_features(&layer, &fields);
        assert_eq!(neighborhoods.len(), 1);
        assert_eq!(neighborhoods[0].name, "CENTRO");
    }
}
