//! Loads county polygons from a `GeoJSON` feature collection.
//!
//! Census cartographic boundary files cover every county in the country;
//! the loader keeps only features whose subdivision-code property (e.g.
//! `STATEFP`) equals the target region's code.

use geojson::{Feature, GeoJson};
use serde::{Deserialize, Serialize};

use crate::{BoundaryError, Crs, RegionPolygon, RegionSet, geometry_to_multipolygon};

/// Property names used to read boundary features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryFields {
    /// Property holding the subdivision (state) code.
    pub subdivision_field: String,
    /// Property holding the county identifier.
    pub id_field: String,
    /// Property holding the county display name.
    pub name_field: String,
}

impl Default for BoundaryFields {
    /// Field names of the census cartographic boundary county files.
    fn default() -> Self {
        Self {
            subdivision_field: "STATEFP".to_string(),
            id_field: "GEOID".to_string(),
            name_field: "NAME".to_string(),
        }
    }
}

/// Reads a string or number property as text.
fn property_text(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses `geojson` and keeps the features belonging to `subdivision_code`.
///
/// Features without areal geometry are skipped with a warning.
///
/// # Errors
///
/// Returns [`BoundaryError::GeoJson`] if the document does not parse,
/// [`BoundaryError::NotAFeatureCollection`] if it is not a collection,
/// [`BoundaryError::MissingProperty`] if a matching feature has no
/// identifier, [`BoundaryError::DuplicateRegion`] on repeated identifiers,
/// and [`BoundaryError::NoRegions`] if nothing matched.
pub fn load_regions(
    geojson: &str,
    fields: &BoundaryFields,
    subdivision_code: &str,
) -> Result<RegionSet, BoundaryError> {
    let GeoJson::FeatureCollection(collection) = geojson.parse::<GeoJson>()? else {
        return Err(BoundaryError::NotAFeatureCollection);
    };

    let total = collection.features.len();
    let mut regions = Vec::new();

    for (index, feature) in collection.features.into_iter().enumerate() {
        if property_text(&feature, &fields.subdivision_field).as_deref() != Some(subdivision_code) {
            continue;
        }

        let id = property_text(&feature, &fields.id_field).ok_or_else(|| {
            BoundaryError::MissingProperty {
                index,
                property: fields.id_field.clone(),
            }
        })?;
        let name = property_text(&feature, &fields.name_field).unwrap_or_else(|| id.clone());

        let Some(geometry) = feature.geometry.and_then(geometry_to_multipolygon) else {
            log::warn!("Boundary {id} has no polygon geometry, skipping");
            continue;
        };

        regions.push(RegionPolygon {
            id,
            name,
            geometry,
            crs: Crs::Geographic,
        });
    }

    if regions.is_empty() {
        return Err(BoundaryError::NoRegions {
            field: fields.subdivision_field.clone(),
            value: subdivision_code.to_string(),
        });
    }

    log::info!(
        "Loaded {} of {total} boundary features with {} = {subdivision_code}",
        regions.len(),
        fields.subdivision_field
    );

    RegionSet::new(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTIES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"STATEFP": "30", "GEOID": "30031", "NAME": "Gallatin"},
                "geometry": {"type": "Polygon", "coordinates": [[[-111.5,45.0],[-110.8,45.0],[-110.8,46.0],[-111.5,46.0],[-111.5,45.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"STATEFP": "30", "GEOID": "30067", "NAME": "Park"},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[-110.8,45.0],[-110.0,45.0],[-110.0,46.0],[-110.8,46.0],[-110.8,45.0]]]]}
            },
            {
                "type": "Feature",
                "properties": {"STATEFP": "56", "GEOID": "56029", "NAME": "Park"},
                "geometry": {"type": "Polygon", "coordinates": [[[-110.0,44.0],[-109.0,44.0],[-109.0,45.0],[-110.0,45.0],[-110.0,44.0]]]}
            },
            {
                "type": "Feature",
                "properties": {"STATEFP": "30", "GEOID": "30999", "NAME": "Nowhere"},
                "geometry": {"type": "Point", "coordinates": [-110.0, 46.0]}
            }
        ]
    }"#;

    #[test]
    fn keeps_only_target_subdivision() {
        let set = load_regions(COUNTIES, &BoundaryFields::default(), "30").unwrap();
        let ids: Vec<&str> = set.regions().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["30031", "30067"]);
        assert_eq!(set.get("30031").unwrap().name, "Gallatin");
        assert!(set.regions().iter().all(|r| r.crs == Crs::Geographic));
    }

    #[test]
    fn reports_empty_selection() {
        let err = load_regions(COUNTIES, &BoundaryFields::default(), "16").unwrap_err();
        assert!(matches!(err, BoundaryError::NoRegions { value, .. } if value == "16"));
    }

    #[test]
    fn requires_identifier_property() {
        let fields = BoundaryFields {
            id_field: "COUNTYNS".to_string(),
            ..BoundaryFields::default()
        };
        let err = load_regions(COUNTIES, &fields, "30").unwrap_err();
        assert!(matches!(err, BoundaryError::MissingProperty { index: 0, .. }));
    }

    #[test]
    fn rejects_bare_geometry() {
        let err = load_regions(
            r#"{"type":"Point","coordinates":[0,0]}"#,
            &BoundaryFields::default(),
            "30",
        )
        .unwrap_err();
        assert!(matches!(err, BoundaryError::NotAFeatureCollection));
    }
}
