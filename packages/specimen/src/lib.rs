#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Specimen table loading, coordinate normalization, and taxon filtering.
//!
//! The loaders in [`loader`] enforce the required-column schema. Everything
//! else operates on already-loaded [`SpecimenRecord`]s without I/O:
//! [`coordinates`] turns raw cells into signed decimal degrees, [`filter`]
//! selects rows by taxon and year, and [`catalog`] summarizes a table.

pub mod catalog;
pub mod coordinates;
pub mod diagnostics;
pub mod filter;
pub mod loader;

pub use diagnostics::Diagnostics;
pub use filter::filter_records;
pub use specimen_map_specimen_models::SpecimenRecord;

use thiserror::Error;

/// Errors that can occur while loading a specimen table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// One or more required columns are absent.
    #[error("Specimen table is missing required columns: {}", missing.join(", "))]
    MissingColumns {
        /// Absent column names, in canonical order.
        missing: Vec<String>,
    },

    /// A JSON table was not an array of row objects.
    #[error("JSON specimen table must be an array of row objects")]
    NotARowArray,

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An Excel workbook has no worksheet to read.
    #[error("Excel workbook has no worksheets")]
    NoWorksheet,

    /// Excel parsing failed.
    #[error("Excel error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the table failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
