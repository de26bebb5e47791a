use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

// ---------------------------------------------------------------------------
// IndicatorRecord – one row of the source CSV
// ---------------------------------------------------------------------------

/// A single observation: one indicator, one year, one (possibly missing) value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRecord {
    pub indicator: String,
    /// Calendar year. Kept as an integer for filtering and ordering;
    /// converted to text only when displayed.
    pub year: i32,
    /// `None` when the source cell was empty or a missing marker.
    pub value: Option<f64>,
}

impl IndicatorRecord {
    pub fn new(indicator: impl Into<String>, year: i32, value: Option<f64>) -> Self {
        Self {
            indicator: indicator.into(),
            year,
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Series – the ordered points of one indicator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: Option<f64>,
}

/// All points of one indicator, sorted by year.
///
/// Duplicate years are kept in file order; consumers decide whether they
/// collapse them (last-wins) or aggregate them (sum).
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub indicator: String,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(indicator: impl Into<String>, mut points: Vec<SeriesPoint>) -> Self {
        // Stable sort keeps file order among equal years.
        points.sort_by_key(|p| p.year);
        Self {
            indicator: indicator.into(),
            points,
        }
    }

    /// Non-missing `(year, value)` pairs with one entry per year. When a
    /// year occurs more than once, the later record wins.
    pub fn latest_per_year(&self) -> Vec<(i32, f64)> {
        let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
        for p in &self.points {
            if let Some(v) = p.value {
                by_year.insert(p.year, v);
            }
        }
        by_year.into_iter().collect()
    }

    /// Non-missing `(year, value)` pairs, duplicates included.
    pub fn present(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.year, v)))
    }
}

// ---------------------------------------------------------------------------
// IndicatorTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed indices.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTable {
    /// All rows, in file order.
    pub records: Vec<IndicatorRecord>,
    /// Indicator names in order of first appearance.
    pub indicators: Vec<String>,
    /// Sorted set of years present.
    pub years: BTreeSet<i32>,
}

impl IndicatorTable {
    /// Build indices from the loaded records.
    pub fn from_records(records: Vec<IndicatorRecord>) -> Self {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut indicators = Vec::new();
        let mut years = BTreeSet::new();

        for rec in &records {
            if seen.insert(rec.indicator.as_str()) {
                indicators.push(rec.indicator.clone());
            }
            years.insert(rec.year);
        }

        IndicatorTable {
            records,
            indicators,
            years,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    /// Collect the series for one indicator. Unknown names give an empty series.
    pub fn series(&self, indicator: &str) -> Series {
        let points = self
            .records
            .iter()
            .filter(|r| r.indicator == indicator)
            .map(|r| SeriesPoint {
                year: r.year,
                value: r.value,
            })
            .collect();
        Series::new(indicator, points)
    }

    /// Sum of the non-missing values of `indicator` in `year`.
    pub fn sum_in_year(&self, indicator: &str, year: i32) -> f64 {
        self.records
            .iter()
            .filter(|r| r.indicator == indicator && r.year == year)
            .filter_map(|r| r.value)
            .sum()
    }
}
