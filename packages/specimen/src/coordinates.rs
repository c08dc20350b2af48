//! Coordinate normalization.
//!
//! Turns one raw coordinate cell plus its hemisphere letter into a signed
//! decimal-degree value. Cells may be numeric, decimal text, or
//! degree/minute/second text such as `44°41.576'` or `111 02 30"`.
//!
//! Nothing here fails: unreadable cells become `NaN` and bad hemisphere
//! letters fall back to the region default, each leaving a [`Diagnostic`]
//! behind.

use std::sync::LazyLock;

use regex::Regex;
use specimen_map_specimen_models::{
    Axis, CoordinateConventions, Diagnostic, DiagnosticKind, DiagnosticSink, Hemisphere,
    RawCoordinate, SpecimenRecord,
};

/// `<degrees><sep><minutes>[']<seconds>["]`, anchored at the start only.
static DMS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\d+)[°\s]+(\d+(?:\.\d+)?)['′]?\s*(\d*(?:\.\d+)?)["″]?"#)
        .unwrap_or_else(|_| unreachable!())
});

/// Replaces typographic minute/second marks with their ASCII forms.
fn normalize_marks(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2032}' => '\'',
            '\u{2033}' | '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect()
}

/// Parses degree/minute/second text into unsigned decimal degrees.
///
/// Seconds are optional and default to zero.
#[must_use]
pub fn parse_dms(text: &str) -> Option<f64> {
    let normalized = normalize_marks(text);
    let caps = DMS_PATTERN.captures(normalized.trim())?;

    let degrees: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = match caps.get(3).map(|m| m.as_str()) {
        Some(s) if !s.is_empty() => s.parse().ok()?,
        _ => 0.0,
    };

    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}

/// Reads the unsigned magnitude of a coordinate cell.
///
/// Numbers pass through unchanged. Text is tried as DMS first, then as a
/// plain decimal. Returns `None` when nothing parses.
#[must_use]
pub fn parse_coordinate(raw: &RawCoordinate) -> Option<f64> {
    match raw {
        RawCoordinate::Number(n) => Some(*n).filter(|n| !n.is_nan()),
        RawCoordinate::Text(text) => {
            parse_dms(text).or_else(|| text.trim().parse::<f64>().ok().filter(|n| !n.is_nan()))
        }
        RawCoordinate::Missing => None,
    }
}

/// Resolves a hemisphere letter for `axis`.
///
/// Missing letters silently take the region default. Letters that are not
/// one of the axis's two valid letters also take the default, recording a
/// [`DiagnosticKind::InvalidDirection`].
pub fn resolve_direction(
    raw: Option<&str>,
    axis: Axis,
    conventions: &CoordinateConventions,
    row: usize,
    sink: &mut dyn DiagnosticSink,
) -> Hemisphere {
    let default = conventions.default_direction(axis);

    let Some(letter) = raw.map(|s| s.trim().to_uppercase()).filter(|s| !s.is_empty()) else {
        return default;
    };

    let (positive, negative) = axis.hemispheres();
    match letter.parse::<Hemisphere>() {
        Ok(h) if h == positive || h == negative => h,
        _ => {
            sink.record(Diagnostic {
                row,
                kind: DiagnosticKind::InvalidDirection {
                    axis,
                    raw: letter,
                    defaulted_to: default,
                },
            });
            default
        }
    }
}

/// Normalizes one coordinate cell to signed decimal degrees.
///
/// Returns `NaN` (and records a diagnostic) when the cell is unreadable.
pub fn normalize(
    raw: &RawCoordinate,
    direction: Option<&str>,
    axis: Axis,
    conventions: &CoordinateConventions,
    row: usize,
    sink: &mut dyn DiagnosticSink,
) -> f64 {
    let hemisphere = resolve_direction(direction, axis, conventions, row, sink);

    let Some(magnitude) = parse_coordinate(raw) else {
        sink.record(Diagnostic {
            row,
            kind: DiagnosticKind::UnparseableCoordinate {
                axis,
                raw: raw.to_string(),
            },
        });
        return f64::NAN;
    };

    if hemisphere.is_negative() {
        -magnitude
    } else {
        magnitude
    }
}

/// Normalizes both axes of a record, returning `(longitude, latitude)`.
///
/// Readable points whose magnitudes fall outside the region's rough bounds
/// are flagged but still returned.
pub fn normalize_record(
    record: &SpecimenRecord,
    conventions: &CoordinateConventions,
    sink: &mut dyn DiagnosticSink,
) -> (f64, f64) {
    let lat = normalize(
        &record.lat,
        record.lat_dir.as_deref(),
        Axis::Latitude,
        conventions,
        record.row,
        sink,
    );
    let lon = normalize(
        &record.long,
        record.long_dir.as_deref(),
        Axis::Longitude,
        conventions,
        record.row,
        sink,
    );

    if !lat.is_nan() && !lon.is_nan() && !conventions.within_bounds(lat, lon) {
        sink.record(Diagnostic {
            row: record.row,
            kind: DiagnosticKind::OutsideRegionBounds { lat, lon },
        });
    }

    (lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn text(s: &str) -> RawCoordinate {
        RawCoordinate::Text(s.to_string())
    }

    fn lat(raw: &RawCoordinate, dir: Option<&str>, sink: &mut Vec<Diagnostic>) -> f64 {
        normalize(
            raw,
            dir,
            Axis::Latitude,
            &CoordinateConventions::montana(),
            1,
            sink,
        )
    }

    #[test]
    fn decimal_text_round_trips() {
        let mut sink = Vec::new();
        for s in ["46.8721", "0.5", "45", "111.000001", "48.99999999"] {
            let expected: f64 = s.parse().unwrap();
            assert!((lat(&text(s), Some("N"), &mut sink) - expected).abs() < f64::EPSILON);
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn numeric_cells_pass_through() {
        let mut sink = Vec::new();
        let value = lat(&RawCoordinate::Number(45.25), Some("N"), &mut sink);
        assert!((value - 45.25).abs() < TOLERANCE);
        assert!(sink.is_empty());
    }

    #[test]
    fn parses_degrees_and_decimal_minutes() {
        let mut sink = Vec::new();
        let north = lat(&text("44°41.576'"), Some("N"), &mut sink);
        let south = lat(&text("44°41.576'"), Some("S"), &mut sink);
        let expected = 44.0 + 41.576 / 60.0;
        assert!((north - expected).abs() < TOLERANCE);
        assert!((south + expected).abs() < TOLERANCE);
        assert!((north - 44.6929).abs() < 1e-4);
    }

    #[test]
    fn parses_full_dms_with_unicode_marks() {
        let expected = 111.0 + 2.0 / 60.0 + 30.0 / 3600.0;
        assert!((parse_dms("111°02′30″").unwrap() - expected).abs() < TOLERANCE);
        assert!((parse_dms("111°02\u{2019}30\u{201D}").unwrap() - expected).abs() < TOLERANCE);
        assert!((parse_dms("111 02 30").unwrap() - expected).abs() < TOLERANCE);
        assert!((parse_dms("111° 2' 30.0\"").unwrap() - expected).abs() < TOLERANCE);
    }

    #[test]
    fn seconds_default_to_zero() {
        assert!((parse_dms("45 30").unwrap() - 45.5).abs() < TOLERANCE);
    }

    #[test]
    fn plain_decimal_is_not_dms() {
        assert!(parse_dms("45.5").is_none());
        assert!(parse_dms("-110.25").is_none());
    }

    #[test]
    fn unparseable_text_yields_nan_and_diagnostic() {
        let mut sink = Vec::new();
        assert!(lat(&text("north-ish"), Some("N"), &mut sink).is_nan());
        assert!(lat(&RawCoordinate::Missing, Some("N"), &mut sink).is_nan());
        assert_eq!(sink.len(), 2);
        assert!(matches!(
            sink[0].kind,
            DiagnosticKind::UnparseableCoordinate {
                axis: Axis::Latitude,
                ..
            }
        ));
    }

    #[test]
    fn western_longitude_is_negative() {
        let mut sink = Vec::new();
        let lon = normalize(
            &text("110.5"),
            Some(" w "),
            Axis::Longitude,
            &CoordinateConventions::montana(),
            3,
            &mut sink,
        );
        assert!((lon + 110.5).abs() < TOLERANCE);
        assert!(sink.is_empty());
    }

    #[test]
    fn invalid_direction_defaults_with_diagnostic() {
        let mut sink = Vec::new();
        let conventions = CoordinateConventions::montana();
        let lon = normalize(
            &text("110.5"),
            Some("N"),
            Axis::Longitude,
            &conventions,
            9,
            &mut sink,
        );
        assert!((lon + 110.5).abs() < TOLERANCE);
        assert_eq!(
            sink,
            vec![Diagnostic {
                row: 9,
                kind: DiagnosticKind::InvalidDirection {
                    axis: Axis::Longitude,
                    raw: "N".to_string(),
                    defaulted_to: Hemisphere::West,
                },
            }]
        );
    }

    #[test]
    fn missing_direction_defaults_silently() {
        let mut sink = Vec::new();
        assert!((lat(&text("46"), None, &mut sink) - 46.0).abs() < TOLERANCE);
        assert!((lat(&text("46"), Some("  "), &mut sink) - 46.0).abs() < TOLERANCE);
        assert!(sink.is_empty());
    }

    #[test]
    fn flags_points_outside_region_bounds() {
        let record = SpecimenRecord {
            row: 4,
            lat: text("40.0"),
            lat_dir: Some("N".to_string()),
            long: text("110.0"),
            long_dir: Some("W".to_string()),
            family: "bovidae".to_string(),
            genus: "bison".to_string(),
            species: "bison".to_string(),
            year: Some(1901.0),
        };
        let mut sink = Vec::new();
        let (lon, lat) = normalize_record(&record, &CoordinateConventions::montana(), &mut sink);
        assert!((lon + 110.0).abs() < TOLERANCE);
        assert!((lat - 40.0).abs() < TOLERANCE);
        assert_eq!(sink.len(), 1);
        assert!(matches!(
            sink[0].kind,
            DiagnosticKind::OutsideRegionBounds { .. }
        ));
    }
}
