#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County boundaries and point-in-polygon aggregation.
//!
//! Holds the administrative polygons of the target region, the fixed
//! working projection, the dissolved-boundary clipper, and the R-tree
//! backed containment index used to count points per county.

pub mod aggregate;
pub mod boundaries;
pub mod clip;
pub mod index;
pub mod projection;

use std::collections::BTreeSet;
use std::sync::Arc;

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use aggregate::{aggregate, count_by_region};
pub use clip::{BoundaryClipper, GeoPoint, ProjectedPoint, project_points};
pub use index::{LinearScan, RegionIndex, RegionLookup};
pub use projection::{LambertConformalConic, ProjectionError, ProjectionParams};

/// Errors that can occur while loading or preparing boundaries.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// The boundary document is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The boundary document is valid `GeoJSON` but not a feature collection.
    #[error("Boundary GeoJSON must be a FeatureCollection")]
    NotAFeatureCollection,

    /// A feature lacks a property the loader needs.
    #[error("Boundary feature {index} has no '{property}' property")]
    MissingProperty {
        /// Position of the feature in the collection.
        index: usize,
        /// Name of the absent property.
        property: String,
    },

    /// Two regions share the same identifier.
    #[error("Duplicate region identifier: {id}")]
    DuplicateRegion {
        /// The repeated identifier.
        id: String,
    },

    /// No feature matched the subdivision filter.
    #[error("No boundary features have {field} = '{value}'")]
    NoRegions {
        /// Property that was filtered on.
        field: String,
        /// Value that was expected.
        value: String,
    },

    /// A region is in a coordinate system the operation cannot accept.
    #[error("Region '{id}' is in {found}, expected {expected}")]
    CrsMismatch {
        /// Identifier of the offending region.
        id: String,
        /// CRS the operation needs.
        expected: Crs,
        /// CRS the region carries.
        found: Crs,
    },

    /// The working projection could not be built or applied.
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Coordinate reference system of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Crs {
    /// Longitude/latitude in decimal degrees.
    Geographic,
    /// A planar projected system identified by EPSG code.
    Projected {
        /// EPSG code.
        epsg: u32,
    },
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Geographic => f.write_str("geographic coordinates"),
            Self::Projected { epsg } => write!(f, "EPSG:{epsg}"),
        }
    }
}

/// One administrative county boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPolygon {
    /// Jurisdiction identifier (census GEOID, e.g. `"30031"`).
    pub id: String,
    /// Human-readable name (e.g. `"Gallatin"`).
    pub name: String,
    /// Boundary geometry. Single polygons are stored as one-member
    /// multipolygons.
    pub geometry: MultiPolygon<f64>,
    /// Coordinate system of `geometry`.
    pub crs: Crs,
}

/// The read-only polygon set for one region, in load order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSet {
    regions: Vec<Arc<RegionPolygon>>,
}

impl RegionSet {
    /// Builds a set, rejecting duplicate identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::DuplicateRegion`] if two regions share an id.
    pub fn new(regions: Vec<RegionPolygon>) -> Result<Self, BoundaryError> {
        let mut seen = BTreeSet::new();
        for region in &regions {
            if !seen.insert(region.id.as_str()) {
                return Err(BoundaryError::DuplicateRegion {
                    id: region.id.clone(),
                });
            }
        }

        Ok(Self {
            regions: regions.into_iter().map(Arc::new).collect(),
        })
    }

    /// The regions, in load order.
    #[must_use]
    pub fn regions(&self) -> &[Arc<RegionPolygon>] {
        &self.regions
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the set has no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Finds a region by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<RegionPolygon>> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Returns a copy of this set in the working projection.
    ///
    /// Regions already in the projection's CRS are shared as-is.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::CrsMismatch`] if a region is in some other
    /// projected CRS, or [`BoundaryError::Projection`] if a vertex cannot be
    /// projected.
    pub fn projected(&self, projection: &LambertConformalConic) -> Result<Self, BoundaryError> {
        let target = Crs::Projected {
            epsg: projection.epsg(),
        };

        let regions = self
            .regions
            .iter()
            .map(|region| -> Result<_, BoundaryError> {
                match region.crs {
                    Crs::Geographic => Ok(Arc::new(RegionPolygon {
                        id: region.id.clone(),
                        name: region.name.clone(),
                        geometry: projection.project_multi_polygon(&region.geometry)?,
                        crs: target,
                    })),
                    found if found == target => Ok(Arc::clone(region)),
                    found => Err(BoundaryError::CrsMismatch {
                        id: region.id.clone(),
                        expected: target,
                        found,
                    }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { regions })
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`], or `None` for
/// non-areal geometry.
pub(crate) fn geometry_to_multipolygon(geom: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::rect_region;
    use super::*;

    #[test]
    fn rejects_duplicate_region_ids() {
        let err = RegionSet::new(vec![
            rect_region("30001", (-112.0, 45.0), (-111.0, 46.0)),
            rect_region("30001", (-111.0, 45.0), (-110.0, 46.0)),
        ])
        .unwrap_err();
        assert!(matches!(err, BoundaryError::DuplicateRegion { id } if id == "30001"));
    }

    #[test]
    fn projects_geographic_regions() {
        let set =
            RegionSet::new(vec![rect_region("30001", (-110.0, 44.25), (-109.5, 45.0))]).unwrap();
        let proj = LambertConformalConic::montana_state_plane().unwrap();
        let projected = set.projected(&proj).unwrap();

        let region = &projected.regions()[0];
        assert_eq!(region.crs, Crs::Projected { epsg: 32100 });
        let first = region.geometry.0[0].exterior().0[1];
        assert!((first.x - 600_000.0).abs() < 1e-3);
        assert!(first.y.abs() < 1e-3);
    }

    #[test]
    fn rejects_foreign_projected_regions() {
        let mut region = rect_region("30001", (0.0, 0.0), (1.0, 1.0));
        region.crs = Crs::Projected { epsg: 3857 };
        let set = RegionSet::new(vec![region]).unwrap();
        let err = set
            .projected(&LambertConformalConic::montana_state_plane().unwrap())
            .unwrap_err();
        assert!(matches!(err, BoundaryError::CrsMismatch { .. }));
    }
}
