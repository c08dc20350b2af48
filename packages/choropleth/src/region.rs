//! Region registry, loaded from embedded TOML definitions.
//!
//! Each `.toml` file in `packages/choropleth/regions/` is baked into the
//! binary at compile time via [`include_str!`]. A definition names the
//! administrative subdivision to map, how to read its boundary file, the
//! coordinate conventions for its specimen tables, its working projection,
//! and its color ranges.

use serde::{Deserialize, Serialize};
use specimen_map_choropleth_models::ColorRange;
use specimen_map_spatial::{LambertConformalConic, ProjectionError, ProjectionParams};
use specimen_map_spatial::boundaries::BoundaryFields;
use specimen_map_specimen_models::{Axis, CoordinateConventions};

use crate::{ColorScheme, ConfigError};

/// TOML configs embedded at compile time.
const REGION_TOMLS: &[(&str, &str)] = &[("montana", include_str!("../regions/montana.toml"))];

/// Total number of configured regions (used in tests).
#[cfg(test)]
const EXPECTED_REGION_COUNT: usize = 1;

/// Everything needed to map specimens over one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDefinition {
    /// Registry identifier, e.g. `"montana"`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Value of the boundary file's subdivision field for this region.
    pub subdivision_code: String,
    /// Boundary file property names.
    #[serde(default)]
    pub boundary: BoundaryFields,
    /// Coordinate bounds and default hemispheres.
    pub coordinates: CoordinateConventions,
    /// Working projection.
    pub projection: ProjectionParams,
    /// Color for counts no range covers.
    pub default_color: String,
    /// Count-to-color ranges.
    #[serde(default)]
    pub color_ranges: Vec<ColorRange>,
}

impl RegionDefinition {
    /// The classifier for this region's color ranges.
    #[must_use]
    pub fn color_scheme(&self) -> ColorScheme {
        ColorScheme::new(self.color_ranges.clone(), self.default_color.clone())
    }

    /// The working projection.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Definition`] if the projection parameters
    /// are rejected.
    pub fn projection(&self) -> Result<LambertConformalConic, ProjectionError> {
        LambertConformalConic::new(&self.projection)
    }
}

/// Parses and validates a region definition.
///
/// # Errors
///
/// Returns [`ConfigError::Toml`] if the TOML is malformed or a color range
/// is invalid, or [`ConfigError::InvalidDefaultDirection`] if a default
/// hemisphere belongs to the other axis.
pub fn parse_region_toml(toml_str: &str) -> Result<RegionDefinition, ConfigError> {
    let definition: RegionDefinition = toml::de::from_str(toml_str)?;

    for axis in [Axis::Latitude, Axis::Longitude] {
        if definition.coordinates.default_direction(axis).axis() != axis {
            return Err(ConfigError::InvalidDefaultDirection { axis });
        }
    }

    Ok(definition)
}

/// Parses command-line color ranges such as `1-10=#e7e8e9` or `1001+=black`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidColorRange`] for the first malformed range.
pub fn parse_color_ranges<S: AsRef<str>>(ranges: &[S]) -> Result<Vec<ColorRange>, ConfigError> {
    ranges
        .iter()
        .map(|range| range.as_ref().parse().map_err(ConfigError::from))
        .collect()
}

/// Returns all configured region definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_regions() -> Vec<RegionDefinition> {
    REGION_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_region_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up an embedded region by identifier.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownRegion`] if no embedded region has `id`.
pub fn region_by_id(id: &str) -> Result<RegionDefinition, ConfigError> {
    let regions = all_regions();
    let available = regions.iter().map(|r| r.id.clone()).collect();

    regions
        .into_iter()
        .find(|r| r.id.eq_ignore_ascii_case(id))
        .ok_or_else(|| ConfigError::UnknownRegion {
            id: id.to_string(),
            available,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_all_regions() {
        assert_eq!(all_regions().len(), EXPECTED_REGION_COUNT);
    }

    #[test]
    fn region_ids_are_unique() {
        let regions = all_regions();
        let mut ids: Vec<&str> = regions.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), EXPECTED_REGION_COUNT);
    }

    #[test]
    fn montana_matches_builtin_conventions() {
        let montana = region_by_id("montana").unwrap();
        assert_eq!(montana.subdivision_code, "30");
        assert_eq!(montana.boundary, BoundaryFields::default());
        assert_eq!(montana.coordinates, CoordinateConventions::montana());
        assert_eq!(montana.projection, ProjectionParams::montana_state_plane());
        assert_eq!(montana.projection().unwrap().epsg(), 32100);
        let (x, y) = montana.projection().unwrap().forward(-109.5, 44.25).unwrap();
        assert!((x - 600_000.0).abs() < 1e-3 && y.abs() < 1e-3);
    }

    #[test]
    fn montana_color_scheme() {
        let scheme = region_by_id("Montana").unwrap().color_scheme();
        assert_eq!(scheme.ranges().len(), 5);
        assert_eq!(scheme.classify(0), "white");
        assert_eq!(scheme.classify(7), "#e7e8e9");
        assert_eq!(scheme.classify(100), "#bcbec0");
        assert_eq!(scheme.classify(500), "#939598");
        assert_eq!(scheme.classify(1_000_000), "#231f20");
    }

    #[test]
    fn unknown_region_lists_available_ids() {
        let err = region_by_id("idaho").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownRegion { id, available }
                if id == "idaho" && available == vec!["montana"]
        ));
    }

    #[test]
    fn rejects_default_direction_on_wrong_axis() {
        let toml = REGION_TOMLS[0]
            .1
            .replace("default_lat_direction = \"N\"", "default_lat_direction = \"E\"");
        let err = parse_region_toml(&toml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDefaultDirection {
                axis: Axis::Latitude
            }
        ));
    }

    #[test]
    fn parses_command_line_ranges() {
        let ranges = parse_color_ranges(&["0-0=white", "1+=black"]).unwrap();
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1].max_count(), None);

        let err = parse_color_ranges(&["0-0=white", "ten+=black"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidColorRange(_)));
    }

    #[test]
    fn rejects_inverted_color_range() {
        let toml = REGION_TOMLS[0].1.replace("min = 11\nmax = 100", "min = 110\nmax = 100");
        assert!(matches!(
            parse_region_toml(&toml).unwrap_err(),
            ConfigError::Toml(_)
        ));
    }
}
