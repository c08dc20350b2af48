//! Boundary clipping.
//!
//! Turns filtered specimen records into geographic points and keeps only
//! those strictly inside the region's dissolved outer boundary. Survivors can
//! then be reprojected into the working projection for containment math.

use geo::{Contains, MultiPolygon, Point, unary_union};
use specimen_map_specimen::coordinates::normalize_record;
use specimen_map_specimen_models::{CoordinateConventions, DiagnosticSink, SpecimenRecord};

use crate::{BoundaryError, Crs, LambertConformalConic, ProjectionError, RegionSet};

/// A normalized geographic point traced back to its source record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint<'a> {
    /// `(longitude, latitude)` in decimal degrees.
    pub position: Point<f64>,
    /// The record the point was built from.
    pub record: &'a SpecimenRecord,
}

/// A point in the working projection, traced back to its source record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint<'a> {
    /// `(easting, northing)` in projection units.
    pub position: Point<f64>,
    /// The record the point was built from.
    pub record: &'a SpecimenRecord,
}

/// Discards points falling outside the union of all region polygons.
#[derive(Debug, Clone)]
pub struct BoundaryClipper {
    boundary: MultiPolygon<f64>,
}

impl BoundaryClipper {
    /// Dissolves every region in `regions` into a single outer boundary.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::CrsMismatch`] unless every region is in
    /// geographic coordinates.
    pub fn new(regions: &RegionSet) -> Result<Self, BoundaryError> {
        if let Some(region) = regions.regions().iter().find(|r| r.crs != Crs::Geographic) {
            return Err(BoundaryError::CrsMismatch {
                id: region.id.clone(),
                expected: Crs::Geographic,
                found: region.crs,
            });
        }

        let boundary = unary_union(regions.regions().iter().map(|region| &region.geometry));

        log::debug!(
            "Dissolved {} regions into {} boundary polygon(s)",
            regions.len(),
            boundary.0.len()
        );

        Ok(Self { boundary })
    }

    /// Whether `point` lies strictly inside the boundary.
    #[must_use]
    pub fn contains(&self, point: &Point<f64>) -> bool {
        point.x().is_finite() && point.y().is_finite() && self.boundary.contains(point)
    }

    /// Normalizes each record's coordinates and keeps the points inside the
    /// boundary.
    ///
    /// Unreadable coordinates produce `NaN` points, which never survive.
    pub fn clip<'a>(
        &self,
        records: &[&'a SpecimenRecord],
        conventions: &CoordinateConventions,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<GeoPoint<'a>> {
        let inside: Vec<GeoPoint<'a>> = records
            .iter()
            .map(|&record| {
                let (lon, lat) = normalize_record(record, conventions, sink);
                GeoPoint {
                    position: Point::new(lon, lat),
                    record,
                }
            })
            .filter(|point| self.contains(&point.position))
            .collect();

        log::info!(
            "{} of {} points fall inside the region boundary",
            inside.len(),
            records.len()
        );

        inside
    }
}

/// Reprojects geographic points into the working projection.
///
/// # Errors
///
/// Returns the first [`ProjectionError`] raised by `projection`.
pub fn project_points<'a>(
    points: &[GeoPoint<'a>],
    projection: &LambertConformalConic,
) -> Result<Vec<ProjectedPoint<'a>>, ProjectionError> {
    points
        .iter()
        .map(|point| {
            Ok(ProjectedPoint {
                position: projection.project_point(point.position)?,
                record: point.record,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::rect_region;
    use specimen_map_specimen_models::{Diagnostic, DiagnosticKind, RawCoordinate};

    fn record(row: usize, lat: &str, long: &str) -> SpecimenRecord {
        SpecimenRecord {
            row,
            lat: RawCoordinate::Text(lat.to_string()),
            lat_dir: Some("N".to_string()),
            long: RawCoordinate::Text(long.to_string()),
            long_dir: Some("W".to_string()),
            family: "bovidae".to_string(),
            genus: "bison".to_string(),
            species: "bison".to_string(),
            year: Some(1900.0),
        }
    }

    fn two_counties() -> RegionSet {
        RegionSet::new(vec![
            rect_region("west", (-111.0, 46.0), (-110.0, 47.0)),
            rect_region("east", (-110.0, 46.0), (-109.0, 47.0)),
        ])
        .unwrap()
    }

    #[test]
    fn keeps_only_points_inside_dissolved_boundary() {
        let clipper = BoundaryClipper::new(&two_counties()).unwrap();
        let records = [
            record(1, "46.5", "110.5"),
            record(2, "46.5", "109.5"),
            record(3, "48.5", "110.5"),
            record(4, "garbage", "110.5"),
        ];
        let refs: Vec<&SpecimenRecord> = records.iter().collect();
        let mut sink: Vec<Diagnostic> = Vec::new();

        let inside = clipper.clip(&refs, &CoordinateConventions::montana(), &mut sink);
        let rows: Vec<usize> = inside.iter().map(|p| p.record.row).collect();
        assert_eq!(rows, vec![1, 2]);
        assert!((inside[0].position.x() + 110.5).abs() < 1e-12);
        assert!(sink.iter().any(|d| d.row == 4
            && matches!(d.kind, DiagnosticKind::UnparseableCoordinate { .. })));
    }

    #[test]
    fn shared_edge_is_interior_after_dissolve() {
        let clipper = BoundaryClipper::new(&two_counties()).unwrap();
        assert!(clipper.contains(&Point::new(-110.0, 46.5)));
        assert!(!clipper.contains(&Point::new(-111.0, 46.5)));
        assert!(!clipper.contains(&Point::new(f64::NAN, 46.5)));
    }

    #[test]
    fn dissolves_overlapping_and_disjoint_regions() {
        let set = RegionSet::new(vec![
            rect_region("a", (-112.0, 45.0), (-110.5, 46.0)),
            rect_region("b", (-111.0, 45.5), (-110.0, 46.5)),
            rect_region("c", (-108.0, 45.0), (-107.0, 46.0)),
        ])
        .unwrap();
        let clipper = BoundaryClipper::new(&set).unwrap();

        assert_eq!(clipper.boundary.0.len(), 2);
        assert!(clipper.contains(&Point::new(-110.75, 45.75)));
        assert!(clipper.contains(&Point::new(-107.5, 45.5)));
        assert!(!clipper.contains(&Point::new(-109.0, 45.5)));
    }

    #[test]
    fn rejects_projected_regions() {
        let mut region = rect_region("west", (-111.0, 46.0), (-110.0, 47.0));
        region.crs = Crs::Projected { epsg: 32100 };
        let set = RegionSet::new(vec![region]).unwrap();
        assert!(matches!(
            BoundaryClipper::new(&set).unwrap_err(),
            BoundaryError::CrsMismatch { .. }
        ));
    }

    #[test]
    fn projects_points_keeping_records() {
        let records = [record(1, "44.25", "109.5")];
        let points = vec![GeoPoint {
            position: Point::new(-109.5, 44.25),
            record: &records[0],
        }];
        let projection = LambertConformalConic::montana_state_plane().unwrap();
        let projected = project_points(&points, &projection).unwrap();
        assert_eq!(projected[0].record.row, 1);
        assert!((projected[0].position.x() - 600_000.0).abs() < 1e-3);
    }
}
