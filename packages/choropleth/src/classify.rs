//! Count-to-color classification.

use specimen_map_choropleth_models::{ColorRange, LegendEntry};

/// An ordered set of color ranges with a fallback color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    ranges: Vec<ColorRange>,
    default_color: String,
}

impl ColorScheme {
    /// Builds a scheme, stable-sorting `ranges` by lower bound.
    ///
    /// Ranges sharing a lower bound keep their given order.
    #[must_use]
    pub fn new(mut ranges: Vec<ColorRange>, default_color: impl Into<String>) -> Self {
        ranges.sort_by_key(ColorRange::min_count);
        Self {
            ranges,
            default_color: default_color.into(),
        }
    }

    /// The ranges, sorted by lower bound.
    #[must_use]
    pub fn ranges(&self) -> &[ColorRange] {
        &self.ranges
    }

    /// Color used when no range matches.
    #[must_use]
    pub fn default_color(&self) -> &str {
        &self.default_color
    }

    /// Color for `count`.
    ///
    /// When ranges overlap, the last matching range in sorted order wins.
    #[must_use]
    pub fn classify(&self, count: u64) -> &str {
        self.ranges
            .iter()
            .rev()
            .find(|range| range.contains(count))
            .map_or(self.default_color.as_str(), ColorRange::color)
    }

    /// Legend rows in sorted order, without rows repeating an earlier
    /// label and color.
    #[must_use]
    pub fn legend(&self) -> Vec<LegendEntry> {
        let mut entries: Vec<LegendEntry> = Vec::with_capacity(self.ranges.len());
        for range in &self.ranges {
            let entry = LegendEntry::from(range);
            if !entries
                .iter()
                .any(|e| e.label == entry.label && e.color == entry.color)
            {
                entries.push(entry);
            }
        }
        entries
    }
}
