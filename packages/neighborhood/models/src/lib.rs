#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood reference data types.
//!
//! Defines the TOML schema for a neighborhood boundary layer and the
//! [`Neighborhood`] value every other stage groups by. Neighborhoods are
//! loaded once and never mutated afterwards.

use geo::{Centroid, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

/// A neighborhood boundary layer, deserialized from the dataset
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodLayer {
    /// Path to a `GeoJSON` `FeatureCollection` of neighborhood polygons.
    pub path: String,
    /// Field mapping for extracting the name from each feature.
    #[serde(flatten)]
    pub fields: NeighborhoodFieldMapping,
    /// EPSG code of the file's coordinates. Overrides any `crs` member
    /// declared in the file itself.
    pub crs: Option<u32>,
}

/// Field mapping for extracting the neighborhood name from a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodFieldMapping {
    /// Property holding the neighborhood name.
    #[serde(default = "default_name_property")]
    pub name_property: String,
}

impl Default for NeighborhoodFieldMapping {
    fn default() -> Self {
        Self {
            name_property: default_name_property(),
        }
    }
}

fn default_name_property() -> String {
    "nome".to_string()
}

/// A neighborhood polygon in EPSG:4326.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighborhood {
    /// Normalized (accent-free, upper-case) name. The grouping key for all
    /// aggregation.
    pub name: String,
    /// Boundary in longitude/latitude order.
    pub boundary: MultiPolygon<f64>,
    /// Centroid of the boundary, `None` for an empty boundary.
    pub centroid: Option<Point<f64>>,
}

impl Neighborhood {
    /// Creates a neighborhood and derives its centroid.
    #[must_use]
    pub fn new(name: String, boundary: MultiPolygon<f64>) -> Self {
        let centroid = boundary.centroid();
        Self {
            name,
            boundary,
            centroid,
        }
    }

    /// Centroid as `(latitude, longitude)`, the order map labels expect.
    #[must_use]
    pub fn centroid_lat_lon(&self) -> Option<(f64, f64)> {
        self.centroid.map(|p| (p.y(), p.x()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn centroid_of_unit_square() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        let n = Neighborhood::new("CENTRO".to_string(), MultiPolygon(vec![square]));
        let (lat, lon) = n.centroid_lat_lon().unwrap();
        assert!((lat - 1.0).abs() < 1e-9);
        assert!((lon - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_boundary_has_no_centroid() {
        let n = Neighborhood::new("VAZIO".to_string(), MultiPolygon(vec![]));
        assert!(n.centroid.is_none());
    }

    #[test]
    fn layer_name_property_defaults() {
        let layer: NeighborhoodLayer = toml::from_str("path = \"bairros.geojson\"").unwrap();
        assert_eq!(layer.fields.name_property, "nome");
        assert!(layer.crs.is_none());
    }
}
