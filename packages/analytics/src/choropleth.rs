//! `GeoJSON` choropleth layers of neighborhood means.
//!
//! One layer per radar column over the neighborhoods present in the
//! radar, each feature carrying the neighborhood name, its raw mean, the
//! bin it falls in, and the bin's fill colour. A second collection holds
//! one label point per neighborhood centroid.

use std::collections::BTreeMap;

use city_monitor_analytics_models::{ColorRamp, GroupKey, IndicatorColumn, RadarOutput};
use city_monitor_neighborhood_models::Neighborhood;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use serde::Serialize;

use crate::AnalyticsError;

/// Bin count used when none is requested.
pub const DEFAULT_BINS: usize = 10;

/// Fill opacity of every layer.
pub const FILL_OPACITY: f64 = 0.75;

/// One indicator drawn over the neighborhood polygons.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethLayer {
    pub column: IndicatorColumn,
    /// Layer title, e.g. `Temperatura por Bairro`.
    pub name: String,
    pub ramp: ColorRamp,
    /// `bins + 1` linear edges from the layer minimum to its maximum.
    /// Empty when no neighborhood has a value.
    pub bins: Vec<f64>,
    pub fill_opacity: f64,
    pub features: FeatureCollection,
}

/// Every layer plus the neighborhood name labels.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethMap {
    pub layers: Vec<ChoroplethLayer>,
    pub labels: FeatureCollection,
}

/// Linear edges spanning `[min, max]`.
#[allow(clippy::cast_precision_loss)]
fn bin_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let width = (max - min) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { max } else { width.mul_add(i as f64, min) })
        .collect()
}

/// Index of the bin holding `value`. The last bin is closed on the right.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn bin_of(value: f64, min: f64, max: f64, bins: usize) -> usize {
    let range = max - min;
    if range <= 0.0 {
        return 0;
    }
    let bin = ((value - min) / range * bins as f64).floor().max(0.0) as usize;
    bin.min(bins - 1)
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn feature(geometry: Geometry, id: usize, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: Some(geojson::feature::Id::String(id.to_string())),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn layer(
    neighborhoods: &[&Neighborhood],
    means: &BTreeMap<&str, Option<f64>>,
    column: IndicatorColumn,
    bins: usize,
) -> ChoroplethLayer {
    let ramp = column.ramp();
    let present = neighborhoods
        .iter()
        .filter_map(|n| means.get(n.name.as_str()).copied().flatten());
    let bounds = present.fold(None, |acc: Option<(f64, f64)>, v| {
        Some(acc.map_or((v, v), |(min, max)| (min.min(v), max.max(v))))
    });

    let features = neighborhoods
        .iter()
        .enumerate()
        .map(|(geoid, neighborhood)| {
            let value = means.get(neighborhood.name.as_str()).copied().flatten();
            let bin = value.zip(bounds).map(|(v, (min, max))| bin_of(v, min, max, bins));

            let mut properties = JsonObject::new();
            properties.insert("GEOID".to_string(), JsonValue::from(geoid.to_string()));
            properties.insert("BAIRRO".to_string(), JsonValue::from(neighborhood.name.clone()));
            properties.insert(column.code().to_string(), JsonValue::from(value));
            properties.insert("bin".to_string(), JsonValue::from(bin));
            properties.insert(
                "fill".to_string(),
                JsonValue::from(bin.map(|b| ramp.color_for_bin(b, bins))),
            );

            feature(
                Geometry::new(geojson::Value::from(&neighborhood.boundary)),
                geoid,
                properties,
            )
        })
        .collect();

    ChoroplethLayer {
        column,
        name: format!("{} por Bairro", column.label()),
        ramp,
        bins: bounds.map_or_else(Vec::new, |(min, max)| bin_edges(min, max, bins)),
        fill_opacity: FILL_OPACITY,
        features: collection(features),
    }
}

fn labels(neighborhoods: &[&Neighborhood]) -> FeatureCollection {
    let features = neighborhoods
        .iter()
        .enumerate()
        .filter_map(|(geoid, neighborhood)| {
            let (lat, lon) = neighborhood.centroid_lat_lon()?;
            let mut properties = JsonObject::new();
            properties.insert("BAIRRO".to_string(), JsonValue::from(neighborhood.name.clone()));
            properties.insert("LAT".to_string(), JsonValue::from(lat));
            properties.insert("LON".to_string(), JsonValue::from(lon));
            Some(feature(
                Geometry::new(geojson::Value::Point(vec![lon, lat])),
                geoid,
                properties,
            ))
        })
        .collect();
    collection(features)
}

/// Builds one choropleth layer per radar column.
///
/// Only neighborhoods with a radar group are drawn; their raw means are
/// left-joined by name so a neighborhood without a value still appears,
/// unfilled.
///
/// # Errors
///
/// * [`AnalyticsError::NotGroupedByNeighborhood`] if the radar is grouped
///   by period or weekday
/// * [`AnalyticsError::NoBins`] if `bins` is zero
pub fn choropleth_layers(
    neighborhoods: &[&Neighborhood],
    radar: &RadarOutput,
    bins: usize,
) -> Result<ChoroplethMap, AnalyticsError> {
    if radar.group_key != GroupKey::Neighborhood {
        return Err(AnalyticsError::NotGroupedByNeighborhood(radar.group_key));
    }
    if bins == 0 {
        return Err(AnalyticsError::NoBins);
    }

    let selected: Vec<&Neighborhood> = neighborhoods
        .iter()
        .copied()
        .filter(|n| radar.raw_group(&n.name).is_some())
        .collect();

    let layers = radar
        .columns
        .iter()
        .map(|column| {
            let means: BTreeMap<&str, Option<f64>> = radar
                .raw
                .iter()
                .map(|profile| (profile.group.as_str(), profile.value(*column)))
                .collect();
            layer(&selected, &means, *column, bins)
        })
        .collect();

    log::debug!(
        "Built {} choropleth layers over {} neighborhoods",
        radar.columns.len(),
        selected.len()
    );

    Ok(ChoroplethMap {
        layers,
        labels: labels(&selected),
    })
}
