#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood boundary loading and name normalization.
//!
//! Reads the neighborhood polygon layer named in the dataset
//! configuration, re-projects it to EPSG:4326, normalizes every name, and
//! hands back the [`Neighborhood`] list that the spatial index and the
//! aggregation stage key on.

pub mod names;
pub mod normalize;

use std::path::Path;

use city_monitor_neighborhood_models::{Neighborhood, NeighborhoodLayer};
use city_monitor_spatial::{SpatialError, layer::FeatureLayer};
use thiserror::Error;

/// Errors that can occur while loading neighborhoods.
#[derive(Debug, Error)]
pub enum NeighborhoodError {
    /// Reading or re-projecting the boundary layer failed.
    #[error("Spatial error: {0}")]
    Spatial(#[from] SpatialError),

    /// The layer contained no usable neighborhood.
    #[error("No usable neighborhoods in {path}")]
    Empty {
        /// The layer path.
        path: String,
    },
}

/// Loads and normalizes the neighborhood layer.
///
/// Relative layer paths are resolved against `base_dir`.
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if the layer cannot be read, names an
/// unsupported CRS, or yields no neighborhood at all.
pub fn load_neighborhoods(
    layer: &NeighborhoodLayer,
    base_dir: &Path,
) -> Result<Vec<Neighborhood>, NeighborhoodError> {
    let path = base_dir.join(&layer.path);
    log::info!("Loading neighborhoods from {}", path.display());

    let features = FeatureLayer::read(&path, layer.crs)?;
    let (neighborhoods, report) = normalize::normalize_features(&features, &layer.fields);

    if report.missing_name > 0 {
        log::warn!(
            "{} neighborhood features have no '{}' property, skipped",
            report.missing_name,
            layer.fields.name_property
        );
    }
    if report.merged > 0 {
        log::debug!(
            "{} neighborhood features merged into same-named neighborhoods",
            report.merged
        );
    }

    if neighborhoods.is_empty() {
        return Err(NeighborhoodError::Empty {
            path: path.display().to_string(),
        });
    }

    log::info!(
        "Loaded {} neighborhoods ({} features, CRS {})",
        neighborhoods.len(),
        report.features,
        features.crs
    );
    Ok(neighborhoods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use city_monitor_neighborhood_models::NeighborhoodFieldMapping;

    fn write_layer(dir: &Path, name: &str, text: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(name), text).unwrap();
    }

    fn temp_dir(label: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "city_monitor_neighborhood_{label}_{}",
            std::process::id()
        ))
    }

    #[test]
    fn loads_relative_to_base_dir() {
        let dir = temp_dir("load");
        write_layer(
            &dir,
            "bairros.geojson",
            r#"{"type": "FeatureCollection", "features": [{
                "type": "Feature",
                "properties": {"nome": "Rebouças"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
            }]}"#,
        );

        let layer = NeighborhoodLayer {
            path: "bairros.geojson".to_string(),
            fields: NeighborhoodFieldMapping::default(),
            crs: None,
        };
        let neighborhoods = load_neighborhoods(&layer, &dir).unwrap();
        assert_eq!(neighborhoods.len(), 1);
        assert_eq!(neighborhoods[0].name, "REBOUCAS");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_layer_is_an_error() {
        let dir = temp_dir("empty");
        write_layer(
            &dir,
            "empty.geojson",
            r#"{"type": "FeatureCollection", "features": []}"#,
        );
        let layer = NeighborhoodLayer {
            path: "empty.geojson".to_string(),
            fields: NeighborhoodFieldMapping::default(),
            crs: None,
        };
        assert!(matches!(
            load_neighborhoods(&layer, &dir),
            Err(NeighborhoodError::Empty { .. })
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_an_error() {
        let layer = NeighborhoodLayer {
            path: "does-not-exist.geojson".to_string(),
            fields: NeighborhoodFieldMapping::default(),
            crs: None,
        };
        assert!(matches!(
            load_neighborhoods(&layer, &temp_dir("missing")),
            Err(NeighborhoodError::Spatial(SpatialError::Io(_)))
        ));
    }
}
