#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Specimen occurrence record types.
//!
//! These types describe one batch of specimen rows as read from a spreadsheet
//! export: raw coordinates in mixed notations, hemisphere letters, taxonomic
//! labels, and the collection year. They also define the taxon selector used
//! to pick rows and the structured diagnostics recorded while rows are
//! normalized.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Columns every specimen table must carry, in canonical order.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "lat", "lat_dir", "long", "long_dir", "family", "genus", "species", "year",
];

/// A coordinate cell exactly as it was read.
///
/// Spreadsheet cells may hold real numbers or text in either decimal or
/// degree/minute/second notation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCoordinate {
    /// A cell that was already numeric.
    Number(f64),
    /// A text cell, decimal or DMS.
    Text(String),
    /// An empty cell.
    Missing,
}

impl RawCoordinate {
    /// Builds a coordinate from a text cell. Blank cells become
    /// [`Self::Missing`].
    #[must_use]
    pub fn from_cell(cell: &str) -> Self {
        if cell.trim().is_empty() {
            Self::Missing
        } else {
            Self::Text(cell.to_string())
        }
    }
}

impl std::fmt::Display for RawCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Missing => f.write_str("<missing>"),
        }
    }
}

/// A hemisphere letter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum Hemisphere {
    /// Northern hemisphere (positive latitude).
    #[serde(rename = "N")]
    #[strum(serialize = "N")]
    North,
    /// Southern hemisphere (negative latitude).
    #[serde(rename = "S")]
    #[strum(serialize = "S")]
    South,
    /// Eastern hemisphere (positive longitude).
    #[serde(rename = "E")]
    #[strum(serialize = "E")]
    East,
    /// Western hemisphere (negative longitude).
    #[serde(rename = "W")]
    #[strum(serialize = "W")]
    West,
}

impl Hemisphere {
    /// Whether coordinates in this hemisphere carry a negative sign.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        matches!(self, Self::South | Self::West)
    }

    /// The axis this hemisphere letter belongs to.
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::North | Self::South => Axis::Latitude,
            Self::East | Self::West => Axis::Longitude,
        }
    }
}

/// A coordinate axis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Axis {
    /// North/south axis.
    Latitude,
    /// East/west axis.
    Longitude,
}

impl Axis {
    /// The `(positive, negative)` hemisphere letters accepted on this axis.
    #[must_use]
    pub const fn hemispheres(self) -> (Hemisphere, Hemisphere) {
        match self {
            Self::Latitude => (Hemisphere::North, Hemisphere::South),
            Self::Longitude => (Hemisphere::East, Hemisphere::West),
        }
    }
}

/// Region-specific conventions applied while normalizing coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateConventions {
    /// Smallest expected absolute latitude.
    pub lat_min: f64,
    /// Largest expected absolute latitude.
    pub lat_max: f64,
    /// Smallest expected absolute longitude.
    pub lon_min: f64,
    /// Largest expected absolute longitude.
    pub lon_max: f64,
    /// Hemisphere assumed when a latitude direction is missing or invalid.
    pub default_lat_direction: Hemisphere,
    /// Hemisphere assumed when a longitude direction is missing or invalid.
    pub default_long_direction: Hemisphere,
}

impl CoordinateConventions {
    /// Montana spans roughly 44°N to 49°N and 104°W to 116°W.
    #[must_use]
    pub const fn montana() -> Self {
        Self {
            lat_min: 44.0,
            lat_max: 49.0,
            lon_min: 104.0,
            lon_max: 116.0,
            default_lat_direction: Hemisphere::North,
            default_long_direction: Hemisphere::West,
        }
    }

    /// The default hemisphere for `axis`.
    #[must_use]
    pub const fn default_direction(&self, axis: Axis) -> Hemisphere {
        match axis {
            Axis::Latitude => self.default_lat_direction,
            Axis::Longitude => self.default_long_direction,
        }
    }

    /// Whether the absolute values of a coordinate pair fall inside the
    /// region's bounding range.
    #[must_use]
    pub fn within_bounds(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat.abs())
            && (self.lon_min..=self.lon_max).contains(&lon.abs())
    }
}

impl Default for CoordinateConventions {
    fn default() -> Self {
        Self::montana()
    }
}

/// One specimen row, immutable once read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecimenRecord {
    /// 1-based data row number in the source table (header excluded).
    pub row: usize,
    /// Raw latitude cell.
    pub lat: RawCoordinate,
    /// Raw latitude hemisphere letter.
    pub lat_dir: Option<String>,
    /// Raw longitude cell.
    pub long: RawCoordinate,
    /// Raw longitude hemisphere letter.
    pub long_dir: Option<String>,
    /// Family name, trimmed and lowercased.
    pub family: String,
    /// Genus name, trimmed and lowercased.
    pub genus: String,
    /// Species epithet, trimmed and lowercased.
    pub species: String,
    /// Collection year. `None` when empty or non-numeric.
    pub year: Option<f64>,
}

impl SpecimenRecord {
    /// Returns the stored value for a taxonomic rank.
    #[must_use]
    pub fn taxon(&self, rank: TaxonRank) -> &str {
        match rank {
            TaxonRank::Family => &self.family,
            TaxonRank::Genus => &self.genus,
            TaxonRank::Species => &self.species,
        }
    }

    /// Whether this record was collected on or before `year`. Records
    /// without a usable year never qualify.
    #[must_use]
    pub fn collected_by(&self, year: i32) -> bool {
        self.year.is_some_and(|y| y <= f64::from(year))
    }
}

/// Trims and lowercases a taxon label the way records store them.
#[must_use]
pub fn normalize_taxon(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Parses a year cell. Accepts integers and decimals (e.g. `"1998.0"`).
#[must_use]
pub fn parse_year(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|y| y.is_finite())
}

/// A taxonomic rank that can be queried.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaxonRank {
    /// Family.
    Family,
    /// Genus.
    Genus,
    /// Species.
    Species,
}

/// Query value for one taxonomic rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonField {
    /// Matches any non-empty value.
    Any,
    /// Matches the value case-insensitively. Stored normalized.
    Exact(String),
}

impl TaxonField {
    /// Label that selects every non-empty value.
    pub const WILDCARD: &'static str = "All";

    /// Builds an exact match for `value`.
    #[must_use]
    pub fn exact(value: &str) -> Self {
        Self::Exact(normalize_taxon(value))
    }

    /// Parses a user selection. `All` (any case) and `*` are wildcards.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed == "*" || trimmed.eq_ignore_ascii_case(Self::WILDCARD) {
            Self::Any
        } else {
            Self::exact(trimmed)
        }
    }

    /// Whether a record's field value satisfies this query value.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Self::Any => !value.is_empty(),
            Self::Exact(expected) => value.to_lowercase() == *expected,
        }
    }
}

impl std::fmt::Display for TaxonField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str(Self::WILDCARD),
            Self::Exact(value) => f.write_str(value),
        }
    }
}

/// A family/genus/species selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonQuery {
    /// Family selector.
    pub family: TaxonField,
    /// Genus selector.
    pub genus: TaxonField,
    /// Species selector.
    pub species: TaxonField,
}

impl TaxonQuery {
    /// Creates a query from three selectors.
    #[must_use]
    pub const fn new(family: TaxonField, genus: TaxonField, species: TaxonField) -> Self {
        Self {
            family,
            genus,
            species,
        }
    }

    /// A query matching every record with all three ranks filled in.
    #[must_use]
    pub const fn any() -> Self {
        Self::new(TaxonField::Any, TaxonField::Any, TaxonField::Any)
    }

    /// Whether all three ranks of `record` match.
    #[must_use]
    pub fn matches(&self, record: &SpecimenRecord) -> bool {
        self.family.matches(&record.family)
            && self.genus.matches(&record.genus)
            && self.species.matches(&record.species)
    }
}

impl std::fmt::Display for TaxonQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} > {} > {}", self.family, self.genus, self.species)
    }
}

// ── Diagnostics ──────────────────────────────────────────────────────────

/// A non-fatal, row-level issue found while normalizing records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Row the issue was found on.
    pub row: usize,
    /// What went wrong.
    pub kind: DiagnosticKind,
}

/// Kinds of row-level issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The coordinate could not be read in any notation.
    UnparseableCoordinate {
        /// Axis of the bad cell.
        axis: Axis,
        /// Cell contents.
        raw: String,
    },
    /// The hemisphere letter was not one of the two valid letters.
    InvalidDirection {
        /// Axis of the bad letter.
        axis: Axis,
        /// Letter as read, uppercased.
        raw: String,
        /// Hemisphere used instead.
        defaulted_to: Hemisphere,
    },
    /// The point lies outside the region's rough bounding range.
    OutsideRegionBounds {
        /// Signed latitude.
        lat: f64,
        /// Signed longitude.
        lon: f64,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            DiagnosticKind::UnparseableCoordinate { axis, raw } => {
                write!(f, "row {}: unparseable {axis} '{raw}'", self.row)
            }
            DiagnosticKind::InvalidDirection {
                axis,
                raw,
                defaulted_to,
            } => write!(
                f,
                "row {}: invalid {axis} direction '{raw}', defaulting to '{defaulted_to}'",
                self.row
            ),
            DiagnosticKind::OutsideRegionBounds { lat, lon } => write!(
                f,
                "row {}: coordinates ({lat}, {lon}) might be outside the region's bounds",
                self.row
            ),
        }
    }
}

/// Receives diagnostics as the pipeline produces them.
pub trait DiagnosticSink {
    /// Records one diagnostic.
    fn record(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}
