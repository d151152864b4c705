//! `GeoJSON` polygon layers.
//!
//! Reads a `FeatureCollection` from disk, resolves the coordinate system it
//! is expressed in, and converts each feature's geometry into a
//! WGS84 [`MultiPolygon`].

use std::path::Path;

use geo::{Area, BoundingRect, CoordsIter, MultiPolygon};
use geojson::{Feature, GeoJson};
use rstar::AABB;

use crate::SpatialError;
use crate::crs::Crs;

/// A parsed polygon layer with its resolved source CRS.
#[derive(Debug, Clone)]
pub struct FeatureLayer {
    /// Raw features, still in the source CRS.
    pub features: Vec<Feature>,
    /// The CRS the feature coordinates are expressed in.
    pub crs: Crs,
}

impl FeatureLayer {
    /// Parses a `FeatureCollection` from text.
    ///
    /// `crs_override` wins over a `crs` member declared in the document;
    /// with neither, EPSG:4326 is assumed (RFC 7946).
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the text is not a `FeatureCollection` or
    /// names an unsupported CRS.
    pub fn parse(text: &str, crs_override: Option<u32>) -> Result<Self, SpatialError> {
        let geojson: GeoJson = text.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(SpatialError::NotFeatureCollection);
        };

        let crs = match crs_override {
            Some(code) => Crs::from_epsg(code)?,
            None => declared_crs(collection.foreign_members.as_ref())?.unwrap_or(Crs::Wgs84),
        };

        Ok(Self {
            features: collection.features,
            crs,
        })
    }

    /// Reads and parses a `FeatureCollection` file.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the file cannot be read or parsed.
    pub fn read(path: &Path, crs_override: Option<u32>) -> Result<Self, SpatialError> {
        let text = std::fs::read_to_string(path)?;
        let layer = Self::parse(&text, crs_override)?;
        log::debug!(
            "Read {} features from {} ({})",
            layer.features.len(),
            path.display(),
            layer.crs
        );
        Ok(layer)
    }

    /// Converts one feature's geometry to a WGS84 [`MultiPolygon`].
    ///
    /// Returns `None` for missing, non-polygonal, or degenerate geometry.
    #[must_use]
    pub fn polygons(&self, feature: &Feature) -> Option<MultiPolygon<f64>> {
        let geometry = feature.geometry.clone()?;
        let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
        let multi_polygon = match geo_geom {
            geo::Geometry::MultiPolygon(mp) => mp,
            geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
            _ => return None,
        };

        let projected = self.crs.reproject(&multi_polygon);
        if is_degenerate(&projected) {
            return None;
        }
        Some(projected)
    }
}

/// Reads the legacy `crs` member (`{"type": "name", "properties":
/// {"name": "..."}}`) if present.
fn declared_crs(
    foreign_members: Option<&geojson::JsonObject>,
) -> Result<Option<Crs>, SpatialError> {
    let Some(name) = foreign_members
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(serde_json::Value::as_str)
    else {
        return Ok(None);
    };

    Crs::from_name(name).map(Some)
}

/// Whether a polygon set is unusable for spatial predicates: empty, with
/// non-finite coordinates, or enclosing no area.
#[must_use]
pub fn is_degenerate(mp: &MultiPolygon<f64>) -> bool {
    if mp.0.is_empty() {
        return true;
    }
    if mp.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return true;
    }
    mp.unsigned_area() <= 0.0
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
#[must_use]
pub fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"nome": "Centro"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"nome": "Linha"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[1,0],[2,0],[0,0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"nome": "Ponto"},
                "geometry": {"type": "Point", "coordinates": [0, 0]}
            },
            {
                "type": "Feature",
                "properties": {"nome": "Nulo"},
                "geometry": null
            }
        ]
    }"#;

    #[test]
    fn defaults_to_wgs84() {
        let layer = FeatureLayer::parse(SQUARE, None).unwrap();
        assert_eq!(layer.crs, Crs::Wgs84);
        assert_eq!(layer.features.len(), 4);
    }

    #[test]
    fn keeps_only_usable_polygons() {
        let layer = FeatureLayer::parse(SQUARE, None).unwrap();
        let usable: Vec<_> = layer
            .features
            .iter()
            .filter_map(|f| layer.polygons(f))
            .collect();
        assert_eq!(usable.len(), 1);
        assert!((usable[0].unsigned_area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reads_declared_crs_member() {
        let text = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::31982"}},
            "features": []
        }"#;
        let layer = FeatureLayer::parse(text, None).unwrap();
        assert_eq!(layer.crs, Crs::SirgasUtmSouth { zone: 22 });

        let overridden = FeatureLayer::parse(text, Some(4674)).unwrap();
        assert_eq!(overridden.crs, Crs::Sirgas2000);
    }

    #[test]
    fn rejects_bare_geometry() {
        let text = r#"{"type": "Point", "coordinates": [0, 0]}"#;
        assert!(matches!(
            FeatureLayer::parse(text, None),
            Err(SpatialError::NotFeatureCollection)
        ));
    }

    #[test]
    fn envelope_of_square() {
        let layer = FeatureLayer::parse(SQUARE, None).unwrap();
        let mp = layer.polygons(&layer.features[0]).unwrap();
        let env = compute_envelope(&mp);
        assert_eq!(env.lower(), [0.0, 0.0]);
        assert_eq!(env.upper(), [1.0, 1.0]);
    }
}
