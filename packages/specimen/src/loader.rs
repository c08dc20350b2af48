//! Specimen table loaders.
//!
//! Reads a batch of specimen rows from CSV, from the first worksheet of an
//! Excel workbook, or from a JSON array of row objects. The required-column
//! check runs before any row is parsed, so a table with missing columns is
//! rejected as a whole. A table with no header (an empty file, an empty
//! sheet, or an empty JSON array) is missing every column.

use std::io::{Read, Seek};

use calamine::{Data, Range, Reader, Xlsx};

use specimen_map_specimen_models::{
    REQUIRED_COLUMNS, RawCoordinate, SpecimenRecord, normalize_taxon, parse_year,
};

use crate::LoadError;

/// Indexes of the required columns inside a header row, in
/// [`REQUIRED_COLUMNS`] order.
struct ColumnIndex([usize; REQUIRED_COLUMNS.len()]);

impl ColumnIndex {
    /// Locates every required column, or reports all absent ones.
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let mut indexes = [0; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();

        for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
            match headers.iter().position(|h| h == column) {
                Some(i) => indexes[slot] = i,
                None => missing.push((*column).to_string()),
            }
        }

        if missing.is_empty() {
            Ok(Self(indexes))
        } else {
            Err(LoadError::MissingColumns { missing })
        }
    }

    fn cell<'r>(&self, record: &'r csv::StringRecord, column: Column) -> &'r str {
        record.get(self.0[column as usize]).unwrap_or("")
    }

    fn sheet_cell<'r>(&self, row: &'r [Data], column: Column) -> &'r Data {
        row.get(self.0[column as usize]).unwrap_or(&Data::Empty)
    }
}

/// Required columns, in [`REQUIRED_COLUMNS`] order.
#[derive(Clone, Copy)]
enum Column {
    Lat,
    LatDir,
    Long,
    LongDir,
    Family,
    Genus,
    Species,
    Year,
}

fn direction_cell(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Loads specimen rows from CSV with a header row.
///
/// Header names are trimmed; extra columns are ignored.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumns`] if any required column is absent,
/// or [`LoadError::Csv`] if the input is not valid CSV.
pub fn load_csv<R: Read>(input: R) -> Result<Vec<SpecimenRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let row = result?;
        records.push(SpecimenRecord {
            row: i + 1,
            lat: RawCoordinate::from_cell(columns.cell(&row, Column::Lat)),
            lat_dir: direction_cell(columns.cell(&row, Column::LatDir)),
            long: RawCoordinate::from_cell(columns.cell(&row, Column::Long)),
            long_dir: direction_cell(columns.cell(&row, Column::LongDir)),
            family: normalize_taxon(columns.cell(&row, Column::Family)),
            genus: normalize_taxon(columns.cell(&row, Column::Genus)),
            species: normalize_taxon(columns.cell(&row, Column::Species)),
            year: parse_year(columns.cell(&row, Column::Year)),
        });
    }

    log::info!("Loaded {} specimen rows from CSV", records.len());
    Ok(records)
}

#[allow(clippy::cast_precision_loss)]
fn sheet_coordinate(cell: &Data) -> RawCoordinate {
    match cell {
        Data::Float(f) => RawCoordinate::Number(*f),
        Data::Int(i) => RawCoordinate::Number(*i as f64),
        Data::String(s) => RawCoordinate::from_cell(s),
        Data::Empty => RawCoordinate::Missing,
        other => RawCoordinate::Text(other.to_string()),
    }
}

fn sheet_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn sheet_year(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f).filter(|y| y.is_finite()),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_year(s),
        _ => None,
    }
}

/// Loads specimen rows from a worksheet whose first row holds the headers.
///
/// Numeric cells are kept as numbers, so numeric coordinates bypass text
/// parsing. Header names are trimmed; extra columns are ignored.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumns`] if any required column is absent.
pub fn load_sheet(range: &Range<Data>) -> Result<Vec<SpecimenRecord>, LoadError> {
    let mut rows = range.rows();

    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|h| sheet_text(h).trim().to_owned()).collect())
        .unwrap_or_default();
    let columns = ColumnIndex::resolve(&headers)?;

    let records: Vec<SpecimenRecord> = rows
        .enumerate()
        .map(|(i, row)| {
            let text = |column| sheet_text(columns.sheet_cell(row, column));
            SpecimenRecord {
                row: i + 1,
                lat: sheet_coordinate(columns.sheet_cell(row, Column::Lat)),
                lat_dir: direction_cell(&text(Column::LatDir)),
                long: sheet_coordinate(columns.sheet_cell(row, Column::Long)),
                long_dir: direction_cell(&text(Column::LongDir)),
                family: normalize_taxon(&text(Column::Family)),
                genus: normalize_taxon(&text(Column::Genus)),
                species: normalize_taxon(&text(Column::Species)),
                year: sheet_year(columns.sheet_cell(row, Column::Year)),
            }
        })
        .collect();

    log::info!("Loaded {} specimen rows from worksheet", records.len());
    Ok(records)
}

/// Loads specimen rows from the first worksheet of an `.xlsx` workbook.
///
/// # Errors
///
/// Returns [`LoadError::Xlsx`] if the workbook cannot be read,
/// [`LoadError::NoWorksheet`] if it has no sheets, or any error of
/// [`load_sheet`].
pub fn load_xlsx<R: Read + Seek>(input: R) -> Result<Vec<SpecimenRecord>, LoadError> {
    let mut workbook: Xlsx<R> = Xlsx::new(input)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    load_sheet(&range)
}

fn json_coordinate(value: &serde_json::Value) -> RawCoordinate {
    match value {
        serde_json::Value::Number(n) => n
            .as_f64()
            .map_or(RawCoordinate::Missing, RawCoordinate::Number),
        serde_json::Value::String(s) => RawCoordinate::from_cell(s),
        serde_json::Value::Null => RawCoordinate::Missing,
        other => RawCoordinate::Text(other.to_string()),
    }
}

fn json_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn json_year(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|y| y.is_finite()),
        serde_json::Value::String(s) => parse_year(s),
        _ => None,
    }
}

/// Loads specimen rows from a JSON array of objects keyed by column name.
///
/// Numeric JSON values are kept as numbers, so numeric coordinates bypass
/// text parsing. An empty array has no columns at all and is rejected like
/// an empty CSV file.
///
/// # Errors
///
/// Returns [`LoadError::NotARowArray`] if the document is not an array of
/// objects, [`LoadError::MissingColumns`] if the array is empty or any row
/// lacks a required column, or [`LoadError::Json`] if the input is not
/// valid JSON.
pub fn load_json(input: &str) -> Result<Vec<SpecimenRecord>, LoadError> {
    let document: serde_json::Value = serde_json::from_str(input)?;
    let rows = document.as_array().ok_or(LoadError::NotARowArray)?;
    if rows.is_empty() {
        return Err(LoadError::MissingColumns {
            missing: REQUIRED_COLUMNS.iter().map(ToString::to_string).collect(),
        });
    }

    let mut objects = Vec::with_capacity(rows.len());
    let mut missing: Vec<String> = Vec::new();
    for row in rows {
        let object = row.as_object().ok_or(LoadError::NotARowArray)?;
        for column in REQUIRED_COLUMNS {
            if !object.contains_key(*column) && !missing.iter().any(|m| m == column) {
                missing.push((*column).to_string());
            }
        }
        objects.push(object);
    }

    if !missing.is_empty() {
        missing.sort_by_key(|m| REQUIRED_COLUMNS.iter().position(|c| c == m));
        return Err(LoadError::MissingColumns { missing });
    }

    let null = serde_json::Value::Null;
    let records: Vec<SpecimenRecord> = objects
        .into_iter()
        .enumerate()
        .map(|(i, object)| {
            let get = |key: &str| object.get(key).unwrap_or(&null);
            SpecimenRecord {
                row: i + 1,
                lat: json_coordinate(get("lat")),
                lat_dir: json_text(get("lat_dir")).as_deref().and_then(direction_cell),
                long: json_coordinate(get("long")),
                long_dir: json_text(get("long_dir")).as_deref().and_then(direction_cell),
                family: json_text(get("family")).map(|s| normalize_taxon(&s)).unwrap_or_default(),
                genus: json_text(get("genus")).map(|s| normalize_taxon(&s)).unwrap_or_default(),
                species: json_text(get("species")).map(|s| normalize_taxon(&s)).unwrap_or_default(),
                year: json_year(get("year")),
            }
        })
        .collect();

    log::info!("Loaded {} specimen rows from JSON", records.len());
    Ok(records)
}
