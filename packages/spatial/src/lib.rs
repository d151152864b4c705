#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index for neighborhood attribution.
//!
//! Builds an R-tree over neighborhood polygons once and assigns point
//! records (sensor readings, incidents) and polygon records (census
//! sectors) to neighborhoods. All geometry handled here is EPSG:4326; see
//! [`crs`] for the explicit re-projection step that must run first.

pub mod crs;
pub mod layer;

use city_monitor_neighborhood_models::Neighborhood;
use geo::{Intersects, MultiPolygon, Point, Relate};
use rstar::{AABB, RTree, RTreeObject};
use serde::{Deserialize, Serialize};

/// Errors raised while reading or re-projecting spatial layers.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// I/O error reading a layer file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The layer is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The layer parsed, but is not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// The layer's coordinate system has no supported conversion to
    /// EPSG:4326.
    #[error("Unsupported coordinate reference system EPSG:{code}")]
    UnsupportedCrs {
        /// The EPSG code that was requested.
        code: u32,
    },

    /// A `crs` member whose name carries no EPSG code.
    #[error("Unrecognized CRS name: {name}")]
    InvalidCrsName {
        /// The name as written in the layer.
        name: String,
    },
}

/// Spatial predicate for polygon-to-polygon assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolygonPredicate {
    /// The record shares any point with the neighborhood (boundaries
    /// included). A record may land in several neighborhoods.
    #[default]
    Intersects,
    /// The record lies entirely inside the neighborhood.
    Within,
}

/// Counters describing one spatial join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReport {
    /// Records offered to the join.
    pub input: usize,
    /// Output rows produced (includes duplicates).
    pub assigned: usize,
    /// Records that fell in no neighborhood and were dropped.
    pub unmatched: usize,
    /// Records without usable geometry, dropped.
    pub invalid_geometry: usize,
    /// Polygon records assigned to more than one neighborhood.
    pub duplicated: usize,
}

/// A record tagged with the neighborhood it was assigned to.
#[derive(Debug, Clone, PartialEq)]
pub struct Assigned<R> {
    /// The original record.
    pub record: R,
    /// Normalized neighborhood name.
    pub neighborhood: String,
}

/// Result of a spatial join.
#[derive(Debug, Clone)]
pub struct SpatialJoin<R> {
    /// Assigned rows.
    pub rows: Vec<Assigned<R>>,
    /// Join counters.
    pub report: JoinReport,
}

/// A neighborhood stored in the R-tree by its index in
/// [`NeighborhoodIndex::neighborhoods`].
struct BoundaryEntry {
    slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over neighborhood polygons.
///
/// Constructed once per process and shared by every join.
pub struct NeighborhoodIndex {
    neighborhoods: Vec<Neighborhood>,
    tree: RTree<BoundaryEntry>,
}

impl NeighborhoodIndex {
    /// Builds the index, excluding neighborhoods with degenerate
    /// boundaries.
    #[must_use]
    pub fn new(neighborhoods: Vec<Neighborhood>) -> Self {
        let mut kept = Vec::with_capacity(neighborhoods.len());
        for neighborhood in neighborhoods {
            if layer::is_degenerate(&neighborhood.boundary) {
                log::warn!(
                    "Skipping neighborhood {} with degenerate boundary",
                    neighborhood.name
                );
                continue;
            }
            kept.push(neighborhood);
        }

        let entries = kept
            .iter()
            .enumerate()
            .map(|(slot, n)| BoundaryEntry {
                slot,
                envelope: layer::compute_envelope(&n.boundary),
            })
            .collect();

        let tree = RTree::bulk_load(entries);
        log::info!("Loaded {} neighborhoods into spatial index", tree.size());

        Self {
            neighborhoods: kept,
            tree,
        }
    }

    /// Indexed neighborhoods.
    #[must_use]
    pub fn neighborhoods(&self) -> &[Neighborhood] {
        &self.neighborhoods
    }

    /// Number of indexed neighborhoods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighborhoods.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
    }

    /// Looks up a neighborhood by normalized name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Neighborhood> {
        self.neighborhoods.iter().find(|n| n.name == name)
    }

    /// Finds the neighborhood containing a point, boundary included.
    ///
    /// A point on an edge shared by two neighborhoods goes to the one whose
    /// name sorts first, so repeated runs agree.
    #[must_use]
    pub fn lookup_point(&self, lng: f64, lat: f64) -> Option<&str> {
        if !lng.is_finite() || !lat.is_finite() {
            return None;
        }

        let point = Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .map(|entry| &self.neighborhoods[entry.slot])
            .filter(|n| n.boundary.intersects(&point))
            .map(|n| n.name.as_str())
            .min()
    }

    /// Finds every neighborhood a polygon satisfies `predicate` against,
    /// sorted by name.
    #[must_use]
    pub fn lookup_polygon(
        &self,
        polygon: &MultiPolygon<f64>,
        predicate: PolygonPredicate,
    ) -> Vec<&str> {
        let query_env = layer::compute_envelope(polygon);

        let mut names: Vec<&str> = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .map(|entry| &self.neighborhoods[entry.slot])
            .filter(|n| match predicate {
                PolygonPredicate::Intersects => n.boundary.intersects(polygon),
                PolygonPredicate::Within => polygon.relate(&n.boundary).is_within(),
            })
            .map(|n| n.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Assigns point records to neighborhoods.
    ///
    /// `point_of` returns the record's `(longitude, latitude)`, or `None`
    /// when it has no location. Records with no location or outside every
    /// neighborhood are dropped and counted.
    pub fn assign_points<R>(
        &self,
        records: Vec<R>,
        point_of: impl Fn(&R) -> Option<(f64, f64)>,
    ) -> SpatialJoin<R> {
        let mut report = JoinReport {
            input: records.len(),
            ..JoinReport::default()
        };
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            let Some((lng, lat)) = point_of(&record) else {
                report.invalid_geometry += 1;
                continue;
            };
            if !lng.is_finite() || !lat.is_finite() {
                report.invalid_geometry += 1;
                continue;
            }
            match self.lookup_point(lng, lat) {
                Some(name) => {
                    let neighborhood = name.to_string();
                    rows.push(Assigned {
                        record,
                        neighborhood,
                    });
                }
                None => report.unmatched += 1,
            }
        }

        report.assigned = rows.len();
        log_report("point", &report);
        SpatialJoin { rows, report }
    }

    /// Assigns polygon records to neighborhoods.
    ///
    /// With [`PolygonPredicate::Intersects`], a record straddling a
    /// boundary is cloned into every neighborhood it touches; the number of
    /// such records is reported as `duplicated` so that double counting is
    /// visible to the aggregation step.
    pub fn assign_polygons<R: Clone>(
        &self,
        records: Vec<R>,
        polygon_of: impl Fn(&R) -> Option<&MultiPolygon<f64>>,
        predicate: PolygonPredicate,
    ) -> SpatialJoin<R> {
        let mut report = JoinReport {
            input: records.len(),
            ..JoinReport::default()
        };
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            let names: Vec<String> = match polygon_of(&record) {
                Some(polygon) if !layer::is_degenerate(polygon) => self
                    .lookup_polygon(polygon, predicate)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                _ => {
                    report.invalid_geometry += 1;
                    continue;
                }
            };

            match names.len() {
                0 => report.unmatched += 1,
                1 => {}
                _ => report.duplicated += 1,
            }

            let mut names = names.into_iter().peekable();
            while let Some(neighborhood) = names.next() {
                if names.peek().is_none() {
                    rows.push(Assigned {
                        record,
                        neighborhood,
                    });
                    break;
                }
                rows.push(Assigned {
                    record: record.clone(),
                    neighborhood,
                });
            }
        }

        report.assigned = rows.len();
        log_report("polygon", &report);
        SpatialJoin { rows, report }
    }
}

fn log_report(kind: &str, report: &JoinReport) {
    log::info!(
        "Spatial {kind} join: {} of {} records assigned",
        report.assigned,
        report.input
    );
    if report.unmatched > 0 {
        log::warn!(
            "Spatial {kind} join: {} records outside every neighborhood were dropped",
            report.unmatched
        );
    }
    if report.invalid_geometry > 0 {
        log::warn!(
            "Spatial {kind} join: {} records without usable geometry were dropped",
            report.invalid_geometry
        );
    }
    if report.duplicated > 0 {
        log::warn!(
            "Spatial {kind} join: {} records intersect several neighborhoods and were counted in each",
            report.duplicated
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(name: &str, x0: f64, y0: f64, size: f64) -> Neighborhood {
        let p = polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ];
        Neighborhood::new(name.to_string(), MultiPolygon(vec![p]))
    }

    fn two_squares() -> NeighborhoodIndex {
        NeighborhoodIndex::new(vec![
            square("B", 1.0, 0.0, 1.0),
            square("A", 0.0, 0.0, 1.0),
        ])
    }

    #[test]
    fn point_inside_is_assigned() {
        let index = two_squares();
        assert_eq!(index.lookup_point(0.5, 0.5), Some("A"));
        assert_eq!(index.lookup_point(1.5, 0.5), Some("B"));
        assert_eq!(index.lookup_point(5.0, 5.0), None);
    }

    #[test]
    fn shared_edge_goes_to_first_name() {
        let index = two_squares();
        assert_eq!(index.lookup_point(1.0, 0.5), Some("A"));
    }

    #[test]
    fn outer_boundary_counts_as_inside() {
        let index = two_squares();
        assert_eq!(index.lookup_point(0.0, 0.5), Some("A"));
    }

    #[test]
    fn assigned_points_lie_in_their_polygon() {
        let index = two_squares();
        let points = vec![
            (0.1, 0.1),
            (0.9, 0.9),
            (1.2, 0.3),
            (1.99, 0.01),
            (3.0, 3.0),
            (f64::NAN, 0.5),
        ];
        let join = index.assign_points(points, |p| Some(*p));

        assert_eq!(join.report.input, 6);
        assert_eq!(join.report.assigned, 4);
        assert_eq!(join.report.unmatched, 1);
        assert_eq!(join.report.invalid_geometry, 1);

        for row in &join.rows {
            let n = index.get(&row.neighborhood).unwrap();
            let point = Point::new(row.record.0, row.record.1);
            assert!(n.boundary.intersects(&point));
        }
    }

    #[test]
    fn degenerate_neighborhoods_are_skipped() {
        let flat = Neighborhood::new(
            "FLAT".to_string(),
            MultiPolygon(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 0.0, y: 0.0),
            ]]),
        );
        let index = NeighborhoodIndex::new(vec![flat, square("A", 0.0, 0.0, 1.0)]);
        assert_eq!(index.len(), 1);
        assert!(index.get("FLAT").is_none());
    }

    #[test]
    fn straddling_sector_is_duplicated() {
        let index = two_squares();
        let straddling = square("S1", 0.5, 0.25, 1.0).boundary;
        let inside = square("S2", 0.25, 0.25, 0.5).boundary;
        let outside = square("S3", 10.0, 10.0, 1.0).boundary;

        let join = index.assign_polygons(
            vec![
                ("S1", straddling),
                ("S2", inside),
                ("S3", outside),
            ],
            |(_, poly)| Some(poly),
            PolygonPredicate::Intersects,
        );

        assert_eq!(join.report.duplicated, 1);
        assert_eq!(join.report.unmatched, 1);
        assert_eq!(join.report.assigned, 3);

        let s1: Vec<&str> = join
            .rows
            .iter()
            .filter(|r| r.record.0 == "S1")
            .map(|r| r.neighborhood.as_str())
            .collect();
        assert_eq!(s1, vec!["A", "B"]);
    }

    #[test]
    fn within_predicate_never_duplicates() {
        let index = two_squares();
        let straddling = square("S1", 0.5, 0.25, 1.0).boundary;
        let inside = square("S2", 0.25, 0.25, 0.5).boundary;

        let join = index.assign_polygons(
            vec![("S1", straddling), ("S2", inside)],
            |(_, poly)| Some(poly),
            PolygonPredicate::Within,
        );

        assert_eq!(join.report.duplicated, 0);
        assert_eq!(join.rows.len(), 1);
        assert_eq!(join.rows[0].neighborhood, "A");
        let a = index.get("A").unwrap();
        assert!(join.rows[0].record.1.relate(&a.boundary).is_within());
    }
}
