//! Dataset summary and cascading taxon listings.
//!
//! The listings mirror a family → genus → species picker: each level lists
//! the distinct values present under the selection made at the levels
//! above it. Wildcard selections cascade.

use std::collections::BTreeSet;

use serde::Serialize;
use specimen_map_specimen_models::{SpecimenRecord, TaxonField, TaxonRank};

/// Headline statistics for a loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    /// Number of rows read.
    pub total_records: usize,
    /// Earliest and latest valid collection year.
    pub year_range: Option<(f64, f64)>,
    /// Distinct non-empty family names.
    pub unique_families: usize,
    /// Distinct non-empty genus names.
    pub unique_genera: usize,
    /// Distinct non-empty species epithets.
    pub unique_species: usize,
}

impl DatasetSummary {
    /// Summarizes a batch of records.
    #[must_use]
    pub fn from_records(records: &[SpecimenRecord]) -> Self {
        let year_range = records
            .iter()
            .filter_map(|r| r.year)
            .fold(None, |range: Option<(f64, f64)>, year| {
                Some(range.map_or((year, year), |(lo, hi)| (lo.min(year), hi.max(year))))
            });

        let distinct = |rank| distinct_values(records.iter(), rank).len();

        Self {
            total_records: records.len(),
            year_range,
            unique_families: distinct(TaxonRank::Family),
            unique_genera: distinct(TaxonRank::Genus),
            unique_species: distinct(TaxonRank::Species),
        }
    }
}

fn distinct_values<'a>(
    records: impl Iterator<Item = &'a SpecimenRecord>,
    rank: TaxonRank,
) -> BTreeSet<&'a str> {
    records
        .map(|r| r.taxon(rank).trim())
        .filter(|v| !v.is_empty())
        .collect()
}

fn listing<'a>(records: impl Iterator<Item = &'a SpecimenRecord>, rank: TaxonRank) -> Vec<String> {
    distinct_values(records, rank)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Sorted distinct families.
#[must_use]
pub fn families(records: &[SpecimenRecord]) -> Vec<String> {
    listing(records.iter(), TaxonRank::Family)
}

/// Sorted distinct genera under a family selection.
#[must_use]
pub fn genera(records: &[SpecimenRecord], family: &TaxonField) -> Vec<String> {
    listing(
        records.iter().filter(|r| family.matches(&r.family)),
        TaxonRank::Genus,
    )
}

/// Sorted distinct species under a family and genus selection.
#[must_use]
pub fn species(records: &[SpecimenRecord], family: &TaxonField, genus: &TaxonField) -> Vec<String> {
    listing(
        records
            .iter()
            .filter(|r| family.matches(&r.family) && genus.matches(&r.genus)),
        TaxonRank::Species,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use specimen_map_specimen_models::RawCoordinate;

    fn record(family: &str, genus: &str, species: &str, year: Option<f64>) -> SpecimenRecord {
        SpecimenRecord {
            row: 0,
            lat: RawCoordinate::Missing,
            lat_dir: None,
            long: RawCoordinate::Missing,
            long_dir: None,
            family: family.to_string(),
            genus: genus.to_string(),
            species: species.to_string(),
            year,
        }
    }

    fn sample() -> Vec<SpecimenRecord> {
        vec![
            record("bovidae", "bison", "bison", Some(1875.0)),
            record("bovidae", "ovis", "canadensis", Some(1990.0)),
            record("cervidae", "cervus", "elaphus", None),
            record("cervidae", "odocoileus", "hemionus", Some(1932.0)),
            record("", "alces", "alces", Some(2004.0)),
        ]
    }

    #[test]
    fn summarizes_records() {
        let summary = DatasetSummary::from_records(&sample());
        assert_eq!(summary.total_records, 5);
        assert_eq!(summary.year_range, Some((1875.0, 2004.0)));
        assert_eq!(summary.unique_families, 2);
        assert_eq!(summary.unique_genera, 5);
        assert_eq!(summary.unique_species, 5);
    }

    #[test]
    fn summary_of_empty_table_has_no_year_range() {
        let summary = DatasetSummary::from_records(&[]);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.year_range, None);
    }

    #[test]
    fn lists_families_sorted() {
        assert_eq!(families(&sample()), vec!["bovidae", "cervidae"]);
    }

    #[test]
    fn genera_cascade_from_family() {
        let records = sample();
        assert_eq!(
            genera(&records, &TaxonField::exact("Cervidae")),
            vec!["cervus", "odocoileus"]
        );
        assert_eq!(
            genera(&records, &TaxonField::Any),
            vec!["bison", "cervus", "odocoileus", "ovis"]
        );
    }

    #[test]
    fn species_cascade_from_family_and_genus() {
        let records = sample();
        assert_eq!(
            species(&records, &TaxonField::exact("bovidae"), &TaxonField::Any),
            vec!["bison", "canadensis"]
        );
        assert_eq!(
            species(&records, &TaxonField::Any, &TaxonField::exact("cervus")),
            vec!["elaphus"]
        );
    }
}
