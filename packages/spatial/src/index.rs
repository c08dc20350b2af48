//! Point-in-polygon lookup over a fixed polygon set.
//!
//! [`RegionLookup`] is the capability the aggregator depends on. The R-tree
//! backed [`RegionIndex`] is the production implementation; [`LinearScan`]
//! tests every polygon in turn and serves as the reference.

use std::sync::Arc;

use geo::{BoundingRect, Contains, MultiPolygon, Point};
use rstar::{AABB, RTree, RTreeObject};

use crate::{RegionPolygon, RegionSet};

/// Answers "which region strictly contains this point?" over a read-only
/// polygon set.
pub trait RegionLookup {
    /// The regions, in the order indexes refer to.
    fn regions(&self) -> &[Arc<RegionPolygon>];

    /// Index of the region strictly containing `point`.
    ///
    /// Points on a boundary belong to no region. When regions overlap, the
    /// lowest index wins.
    fn locate(&self, point: &Point<f64>) -> Option<usize>;
}

/// A region envelope stored in the R-tree.
struct BoundaryEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree index over region envelopes, refined by exact containment.
pub struct RegionIndex {
    regions: Vec<Arc<RegionPolygon>>,
    tree: RTree<BoundaryEntry>,
}

impl RegionIndex {
    /// Builds the index for every region in `set`.
    #[must_use]
    pub fn new(set: &RegionSet) -> Self {
        let regions = set.regions().to_vec();
        let entries = regions
            .iter()
            .enumerate()
            .filter_map(|(index, region)| {
                let Some(envelope) = compute_envelope(&region.geometry) else {
                    log::warn!("Region {} has empty geometry, skipping", region.id);
                    return None;
                };
                Some(BoundaryEntry { index, envelope })
            })
            .collect();

        let tree = RTree::bulk_load(entries);
        log::debug!("Indexed {} regions", tree.size());

        Self { regions, tree }
    }
}

impl RegionLookup for RegionIndex {
    fn regions(&self) -> &[Arc<RegionPolygon>] {
        &self.regions
    }

    fn locate(&self, point: &Point<f64>) -> Option<usize> {
        if !point.x().is_finite() || !point.y().is_finite() {
            return None;
        }

        let query_env = AABB::from_point([point.x(), point.y()]);
        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| self.regions[entry.index].geometry.contains(point))
            .map(|entry| entry.index)
            .min()
    }
}

/// Tests every region in order. Quadratic over many points, but needs no
/// preprocessing.
pub struct LinearScan {
    regions: Vec<Arc<RegionPolygon>>,
}

impl LinearScan {
    /// Wraps every region in `set`.
    #[must_use]
    pub fn new(set: &RegionSet) -> Self {
        Self {
            regions: set.regions().to_vec(),
        }
    }
}

impl RegionLookup for LinearScan {
    fn regions(&self) -> &[Arc<RegionPolygon>] {
        &self.regions
    }

    fn locate(&self, point: &Point<f64>) -> Option<usize> {
        if !point.x().is_finite() || !point.y().is_finite() {
            return None;
        }

        self.regions
            .iter()
            .position(|region| region.geometry.contains(point))
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::rect_region;

    fn grid() -> RegionSet {
        let mut regions = Vec::new();
        for col in 0..4 {
            for row in 0..3 {
                let x = -112.0 + f64::from(col);
                let y = 45.0 + f64::from(row);
                regions.push(rect_region(
                    &format!("r{col}{row}"),
                    (x, y),
                    (x + 1.0, y + 1.0),
                ));
            }
        }
        RegionSet::new(regions).unwrap()
    }

    #[test]
    fn locates_points_inside_regions() {
        let set = grid();
        let index = RegionIndex::new(&set);
        let found = index.locate(&Point::new(-110.5, 46.5)).unwrap();
        assert_eq!(index.regions()[found].id, "r11");
    }

    #[test]
    fn outside_points_belong_to_no_region() {
        let set = grid();
        let index = RegionIndex::new(&set);
        assert_eq!(index.locate(&Point::new(-100.0, 46.5)), None);
        assert_eq!(index.locate(&Point::new(f64::NAN, f64::NAN)), None);
    }

    #[test]
    fn boundary_points_belong_to_no_region() {
        let set = grid();
        let index = RegionIndex::new(&set);
        assert_eq!(index.locate(&Point::new(-111.0, 46.5)), None);
        assert_eq!(LinearScan::new(&set).locate(&Point::new(-111.0, 46.5)), None);
    }

    #[test]
    fn index_agrees_with_linear_scan() {
        let set = grid();
        let index = RegionIndex::new(&set);
        let scan = LinearScan::new(&set);
        for i in 0..40 {
            for j in 0..30 {
                let point = Point::new(
                    -112.3 + f64::from(i) * 0.113,
                    44.8 + f64::from(j) * 0.117,
                );
                assert_eq!(index.locate(&point), scan.locate(&point), "at {point:?}");
            }
        }
    }

    #[test]
    fn overlapping_regions_resolve_to_lowest_index() {
        let set = RegionSet::new(vec![
            rect_region("wide", (-112.0, 45.0), (-108.0, 47.0)),
            rect_region("narrow", (-111.0, 45.5), (-110.0, 46.5)),
        ])
        .unwrap();
        let point = Point::new(-110.5, 46.0);
        assert_eq!(RegionIndex::new(&set).locate(&point), Some(0));
        assert_eq!(LinearScan::new(&set).locate(&point), Some(0));
    }
}
