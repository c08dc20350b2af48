#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Specimen-count choropleth maps.
//!
//! Ties the pipeline together: region definitions from embedded TOML, the
//! count-to-color classifier, the builder that produces a cutoff-year map
//! and a full map for one taxon query, and `GeoJSON` export of the result.

pub mod builder;
pub mod classify;
pub mod export;
pub mod region;

pub use builder::{
    AggregatedCounty, ComparisonMaps, CountyMap, MapDatasetBuilder, MapOutcome, PipelineReport,
    StageCounts,
};
pub use classify::ColorScheme;
pub use export::{MapLegend, county_map_to_geojson};
pub use region::{
    RegionDefinition, all_regions, parse_color_ranges, parse_region_toml, region_by_id,
};

use specimen_map_choropleth_models::ColorRangeError;
use specimen_map_spatial::ProjectionError;
use specimen_map_specimen_models::Axis;
use thiserror::Error;

/// Errors that can occur while loading a region definition.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The definition is not valid TOML for a region.
    #[error("Region TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No embedded region has the requested identifier.
    #[error("Unknown region '{id}' (available: {})", available.join(", "))]
    UnknownRegion {
        /// Requested identifier.
        id: String,
        /// Identifiers of the embedded regions.
        available: Vec<String>,
    },

    /// A color range is invalid.
    #[error("Invalid color range: {0}")]
    InvalidColorRange(#[from] ColorRangeError),

    /// A default hemisphere is on the wrong axis.
    #[error("Default {axis} direction must be one of the {axis} hemispheres")]
    InvalidDefaultDirection {
        /// Axis whose default is wrong.
        axis: Axis,
    },

    /// Reading a definition file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while building maps.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The cutoff year is not a positive year.
    #[error("Cutoff year must be a positive year, got {year}")]
    InvalidCutoffYear {
        /// The rejected year.
        year: i32,
    },

    /// A clipped point could not be projected.
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}
