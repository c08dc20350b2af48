//! `GeoJSON` and legend export of comparison maps.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, feature::Id};
use serde::Serialize;
use specimen_map_choropleth_models::LegendEntry;

use crate::builder::{ComparisonMaps, CountyMap, StageCounts};

/// Converts a county map to a feature collection, one feature per county.
///
/// Features carry `id`, `name`, `point_count`, and `color` properties and
/// the county geometry in the coordinates the region set was loaded in.
#[must_use]
pub fn county_map_to_geojson(map: &CountyMap) -> FeatureCollection {
    let features = map
        .counties()
        .iter()
        .map(|county| {
            let mut properties = JsonObject::new();
            properties.insert("id".to_string(), county.region.id.clone().into());
            properties.insert("name".to_string(), county.region.name.clone().into());
            properties.insert("point_count".to_string(), county.point_count.into());
            properties.insert("color".to_string(), county.color.clone().into());

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&county.region.geometry))),
                id: Some(Id::String(county.region.id.clone())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Legend and provenance written next to the exported maps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLegend {
    /// Region display name.
    pub region: String,
    /// Taxon query, formatted `family > genus > species`.
    pub query: String,
    /// Last year counted by the cutoff map.
    pub cutoff_year: i32,
    /// Record and point counts per stage.
    pub stages: StageCounts,
    /// Color of counties no range covers.
    pub default_color: String,
    /// Legend rows.
    pub entries: Vec<LegendEntry>,
}

impl MapLegend {
    /// Describes `maps` built for the region named `region`.
    #[must_use]
    pub fn new(region: &str, maps: &ComparisonMaps) -> Self {
        Self {
            region: region.to_string(),
            query: maps.query.to_string(),
            cutoff_year: maps.cutoff_year,
            stages: maps.stages,
            default_color: maps.default_color.clone(),
            entries: maps.legend.clone(),
        }
    }
}
