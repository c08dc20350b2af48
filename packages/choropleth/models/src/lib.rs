#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Choropleth color range and legend types.
//!
//! A [`ColorRange`] maps an inclusive span of per-county specimen counts to
//! a fill color. Ranges come from region TOML files (`min`, optional `max`,
//! `color`) or from command-line strings such as `11-100=#bcbec0` and
//! `1001+=#231f20`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building a color range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorRangeError {
    /// The string form has no `=COLOR` part.
    #[error("Color range '{input}' must look like MIN-MAX=COLOR or MIN+=COLOR")]
    Malformed {
        /// The rejected input.
        input: String,
    },

    /// A bound is not a non-negative integer.
    #[error("Invalid count bound '{bound}' in color range '{input}'")]
    InvalidBound {
        /// The rejected input.
        input: String,
        /// The offending bound.
        bound: String,
    },

    /// The upper bound is below the lower bound.
    #[error("Color range upper bound {max} is below lower bound {min}")]
    Inverted {
        /// Lower bound.
        min: u64,
        /// Upper bound.
        max: u64,
    },

    /// The color is empty.
    #[error("Color range {min}.. has an empty color")]
    EmptyColor {
        /// Lower bound.
        min: u64,
    },
}

/// Upper bound spellings meaning "no upper bound".
const UNBOUNDED: &[&str] = &["inf", "infinity", "∞"];

/// An inclusive count range and its fill color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawColorRange")]
pub struct ColorRange {
    #[serde(rename = "min")]
    min_count: u64,
    #[serde(rename = "max", skip_serializing_if = "Option::is_none")]
    max_count: Option<u64>,
    color: String,
}

impl ColorRange {
    /// Creates a range covering `min_count..=max_count`, or `min_count..`
    /// when `max_count` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ColorRangeError::Inverted`] if `max_count < min_count`, or
    /// [`ColorRangeError::EmptyColor`] if `color` is blank.
    pub fn new(
        min_count: u64,
        max_count: Option<u64>,
        color: impl Into<String>,
    ) -> Result<Self, ColorRangeError> {
        let color = color.into().trim().to_string();
        if color.is_empty() {
            return Err(ColorRangeError::EmptyColor { min: min_count });
        }
        if let Some(max) = max_count.filter(|&max| max < min_count) {
            return Err(ColorRangeError::Inverted {
                min: min_count,
                max,
            });
        }

        Ok(Self {
            min_count,
            max_count,
            color,
        })
    }

    /// Lower bound, inclusive.
    #[must_use]
    pub const fn min_count(&self) -> u64 {
        self.min_count
    }

    /// Upper bound, inclusive. `None` means unbounded.
    #[must_use]
    pub const fn max_count(&self) -> Option<u64> {
        self.max_count
    }

    /// Fill color.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Whether `count` falls inside this range.
    #[must_use]
    pub fn contains(&self, count: u64) -> bool {
        count >= self.min_count && self.max_count.is_none_or(|max| count <= max)
    }

    /// Legend label: `"min-max"`, or `"min+"` when unbounded.
    #[must_use]
    pub fn label(&self) -> String {
        match self.max_count {
            Some(max) => format!("{}-{max}", self.min_count),
            None => format!("{}+", self.min_count),
        }
    }
}

impl std::fmt::Display for ColorRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.label(), self.color)
    }
}

fn parse_bound(input: &str, bound: &str) -> Result<u64, ColorRangeError> {
    bound
        .trim()
        .parse()
        .map_err(|_| ColorRangeError::InvalidBound {
            input: input.to_string(),
            bound: bound.to_string(),
        })
}

impl FromStr for ColorRange {
    type Err = ColorRangeError;

    /// Parses `MIN-MAX=COLOR`, `MIN+=COLOR`, or `MIN-inf=COLOR`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (bounds, color) = input
            .split_once('=')
            .ok_or_else(|| ColorRangeError::Malformed {
                input: input.to_string(),
            })?;
        let bounds = bounds.trim();

        let (min, max) = if let Some(min) = bounds.strip_suffix('+') {
            (parse_bound(input, min)?, None)
        } else if let Some((min, max)) = bounds.split_once('-') {
            let max = if UNBOUNDED.contains(&max.trim()) {
                None
            } else {
                Some(parse_bound(input, max)?)
            };
            (parse_bound(input, min)?, max)
        } else {
            return Err(ColorRangeError::Malformed {
                input: input.to_string(),
            });
        };

        Self::new(min, max, color)
    }
}

/// Serialized upper bound: a count, or an "unbounded" spelling.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBound {
    Count(u64),
    Text(String),
}

#[derive(Deserialize)]
struct RawColorRange {
    #[serde(alias = "min_count")]
    min: u64,
    #[serde(default, alias = "max_count")]
    max: Option<RawBound>,
    color: String,
}

impl TryFrom<RawColorRange> for ColorRange {
    type Error = String;

    fn try_from(raw: RawColorRange) -> Result<Self, Self::Error> {
        let max = match raw.max {
            None => None,
            Some(RawBound::Count(max)) => Some(max),
            Some(RawBound::Text(text)) if UNBOUNDED.contains(&text.trim()) => None,
            Some(RawBound::Text(text)) => {
                return Err(format!("invalid upper bound '{text}'"));
            }
        };

        Self::new(raw.min, max, raw.color).map_err(|e| e.to_string())
    }
}

/// One row of a rendered map legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// `"min-max"` or `"min+"`.
    pub label: String,
    /// Fill color.
    pub color: String,
    /// Lower bound, inclusive.
    pub min: u64,
    /// Upper bound, inclusive. `None` means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u64>,
}

impl From<&ColorRange> for LegendEntry {
    fn from(range: &ColorRange) -> Self {
        Self {
            label: range.label(),
            color: range.color.clone(),
            min: range.min_count,
            max: range.max_count,
        }
    }
}
