//! Cutoff/full comparison map building.
//!
//! One [`MapDatasetBuilder`] is prepared per region: the boundary is
//! dissolved and the projected containment index is built once, then any
//! number of taxon queries can be mapped against it. Each build filters,
//! clips, and projects the records once and derives both maps from that
//! shared point set.

use std::collections::BTreeMap;
use std::sync::Arc;

use geo::Point;
use serde::Serialize;
use specimen_map_choropleth_models::LegendEntry;
use specimen_map_spatial::{
    BoundaryClipper, BoundaryError, LambertConformalConic, RegionIndex, RegionPolygon, RegionSet,
    count_by_region, project_points,
};
use specimen_map_specimen::{Diagnostics, filter_records};
use specimen_map_specimen_models::{CoordinateConventions, Diagnostic, SpecimenRecord, TaxonQuery};

use crate::{ColorScheme, PipelineError, RegionDefinition};

/// One county with its point count and fill color.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedCounty {
    /// The county boundary, shared read-only with the region set.
    pub region: Arc<RegionPolygon>,
    /// Points strictly inside the county.
    pub point_count: u64,
    /// Fill color for `point_count`.
    pub color: String,
}

/// Every county of a region, in region order.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyMap {
    counties: Vec<AggregatedCounty>,
}

impl CountyMap {
    /// The counties, in region order.
    #[must_use]
    pub fn counties(&self) -> &[AggregatedCounty] {
        &self.counties
    }

    /// Finds a county by region identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&AggregatedCounty> {
        self.counties.iter().find(|c| c.region.id == id)
    }

    /// Sum of all county counts.
    #[must_use]
    pub fn total_points(&self) -> u64 {
        self.counties.iter().map(|c| c.point_count).sum()
    }

    /// Counts keyed by region identifier.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<String, u64> {
        self.counties
            .iter()
            .map(|c| (c.region.id.clone(), c.point_count))
            .collect()
    }
}

/// Stage counts of one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCounts {
    /// Records loaded.
    pub total_records: usize,
    /// Records matching the taxon query.
    pub matched_records: usize,
    /// Matched records whose point lies inside the region.
    pub points_in_region: usize,
    /// In-region points collected on or before the cutoff year.
    pub points_by_cutoff: usize,
}

/// The pair of maps produced for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonMaps {
    /// Last year counted by `cutoff_map`.
    pub cutoff_year: i32,
    /// The query both maps were built for.
    pub query: TaxonQuery,
    /// Counts of specimens collected on or before `cutoff_year`.
    pub cutoff_map: CountyMap,
    /// Counts of every matching specimen.
    pub full_map: CountyMap,
    /// Record and point counts per stage.
    pub stages: StageCounts,
    /// Legend of the color scheme used for both maps.
    pub legend: Vec<LegendEntry>,
    /// Color of counties no range covers.
    pub default_color: String,
}

/// Result of one build.
#[derive(Debug, Clone, PartialEq)]
pub enum MapOutcome {
    /// Both maps were built.
    Maps(ComparisonMaps),
    /// No record matched the taxon query.
    NoMatchingRecords,
    /// Records matched, but none lies inside the region.
    NoPointsInRegion {
        /// Number of matching records.
        matched: usize,
    },
}

/// Outcome plus the diagnostics recorded while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// What the build produced.
    pub outcome: MapOutcome,
    /// Row-level issues, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds comparison maps for one region.
pub struct MapDatasetBuilder {
    regions: RegionSet,
    clipper: BoundaryClipper,
    index: RegionIndex,
    conventions: CoordinateConventions,
    projection: LambertConformalConic,
}

impl MapDatasetBuilder {
    /// Prepares the boundary clipper and the projected county index.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::CrsMismatch`] if `regions` are not in
    /// geographic coordinates, or [`BoundaryError::Projection`] if a county
    /// cannot be projected.
    pub fn new(
        regions: RegionSet,
        conventions: CoordinateConventions,
        projection: LambertConformalConic,
    ) -> Result<Self, BoundaryError> {
        let clipper = BoundaryClipper::new(&regions)?;
        let index = RegionIndex::new(&regions.projected(&projection)?);

        log::info!(
            "Prepared {} counties in EPSG:{}",
            regions.len(),
            projection.epsg()
        );

        Ok(Self {
            regions,
            clipper,
            index,
            conventions,
            projection,
        })
    }

    /// Prepares a builder with a region definition's conventions and
    /// projection.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::Projection`] if the definition's projection
    /// parameters are rejected. See also [`MapDatasetBuilder::new`].
    pub fn from_definition(
        definition: &RegionDefinition,
        regions: RegionSet,
    ) -> Result<Self, BoundaryError> {
        Self::new(
            regions,
            definition.coordinates.clone(),
            definition.projection()?,
        )
    }

    /// The geographic county set.
    #[must_use]
    pub const fn regions(&self) -> &RegionSet {
        &self.regions
    }

    /// Builds the cutoff-year and full maps for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidCutoffYear`] if `cutoff_year` is not
    /// positive, or [`PipelineError::Projection`] if an in-region point
    /// cannot be projected.
    pub fn build(
        &self,
        records: &[SpecimenRecord],
        query: &TaxonQuery,
        cutoff_year: i32,
        scheme: &ColorScheme,
    ) -> Result<PipelineReport, PipelineError> {
        if cutoff_year <= 0 {
            return Err(PipelineError::InvalidCutoffYear { year: cutoff_year });
        }

        let mut diagnostics = Diagnostics::new();

        let matched = filter_records(records, query, None);
        log::info!(
            "{} of {} records match {query}",
            matched.len(),
            records.len()
        );
        if matched.is_empty() {
            return Ok(PipelineReport {
                outcome: MapOutcome::NoMatchingRecords,
                diagnostics: diagnostics.into_vec(),
            });
        }

        let inside = self
            .clipper
            .clip(&matched, &self.conventions, &mut diagnostics);
        if inside.is_empty() {
            return Ok(PipelineReport {
                outcome: MapOutcome::NoPointsInRegion {
                    matched: matched.len(),
                },
                diagnostics: diagnostics.into_vec(),
            });
        }

        let projected = project_points(&inside, &self.projection)?;
        let full_points: Vec<Point<f64>> = projected.iter().map(|p| p.position).collect();
        let cutoff_points: Vec<Point<f64>> = projected
            .iter()
            .filter(|p| p.record.collected_by(cutoff_year))
            .map(|p| p.position)
            .collect();

        log::info!(
            "{} of {} in-region points were collected by {cutoff_year}",
            cutoff_points.len(),
            full_points.len()
        );

        let maps = ComparisonMaps {
            cutoff_year,
            query: query.clone(),
            cutoff_map: self.county_map(&cutoff_points, scheme),
            full_map: self.county_map(&full_points, scheme),
            stages: StageCounts {
                total_records: records.len(),
                matched_records: matched.len(),
                points_in_region: full_points.len(),
                points_by_cutoff: cutoff_points.len(),
            },
            legend: scheme.legend(),
            default_color: scheme.default_color().to_string(),
        };

        Ok(PipelineReport {
            outcome: MapOutcome::Maps(maps),
            diagnostics: diagnostics.into_vec(),
        })
    }

    fn county_map(&self, points: &[Point<f64>], scheme: &ColorScheme) -> CountyMap {
        let counties = self
            .regions
            .regions()
            .iter()
            .zip(count_by_region(points, &self.index))
            .map(|(region, point_count)| AggregatedCounty {
                region: Arc::clone(region),
                point_count,
                color: scheme.classify(point_count).to_string(),
            })
            .collect();

        CountyMap { counties }
    }
}
