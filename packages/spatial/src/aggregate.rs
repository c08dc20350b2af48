//! Per-county point counting.

use std::collections::BTreeMap;

use geo::Point;

use crate::RegionLookup;

/// Counts the points strictly inside each region, in region order.
///
/// Every region gets an entry, zero included. A point is never counted for
/// more than one region.
pub fn count_by_region<'p, L>(
    points: impl IntoIterator<Item = &'p Point<f64>>,
    lookup: &L,
) -> Vec<u64>
where
    L: RegionLookup + ?Sized,
{
    let mut counts = vec![0_u64; lookup.regions().len()];
    let mut unassigned = 0_u64;

    for point in points {
        match lookup.locate(point) {
            Some(index) => counts[index] += 1,
            None => unassigned += 1,
        }
    }

    if unassigned > 0 {
        log::debug!("{unassigned} points fell in no region");
    }

    counts
}

/// Counts the points strictly inside each region, keyed by region id.
pub fn aggregate<'p, L>(
    points: impl IntoIterator<Item = &'p Point<f64>>,
    lookup: &L,
) -> BTreeMap<String, u64>
where
    L: RegionLookup + ?Sized,
{
    lookup
        .regions()
        .iter()
        .zip(count_by_region(points, lookup))
        .map(|(region, count)| (region.id.clone(), count))
        .collect()
}
