//! Taxon and year filtering.

use specimen_map_specimen_models::{SpecimenRecord, TaxonQuery};

/// Selects the records matching `query`, optionally dropping any collected
/// after `max_year`.
///
/// Records without a usable year are dropped whenever `max_year` is given.
/// An empty result is a normal outcome.
#[must_use]
pub fn filter_records<'a>(
    records: &'a [SpecimenRecord],
    query: &TaxonQuery,
    max_year: Option<i32>,
) -> Vec<&'a SpecimenRecord> {
    let matched: Vec<&SpecimenRecord> = records
        .iter()
        .filter(|r| query.matches(r))
        .filter(|r| max_year.is_none_or(|year| r.collected_by(year)))
        .collect();

    log::debug!(
        "{} of {} records match {query}{}",
        matched.len(),
        records.len(),
        max_year.map_or_else(String::new, |y| format!(" up to {y}"))
    );

    matched
}
