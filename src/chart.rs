//! Declarative chart descriptions.
//!
//! Turns a series plus a chart type into a [`ChartSpec`]. Nothing here
//! draws; `ui::plot` and the JSON report consume the result.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{ChartType, IndicatorMeta};
use crate::color;
use crate::data::model::Series;

/// Tukey fence multiplier for box plot whiskers.
const WHISKER_IQR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub chart_type: ChartType,
    /// `#rrggbb`
    pub color: String,
    pub data: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    /// `[year, value]` pairs for line, bar, area and scatter charts.
    Points { points: Vec<[f64; 2]> },
    /// One entry per year for pie and funnel charts.
    Slices { slices: Vec<Slice> },
    /// Equal-width value bins.
    Bins { bins: Vec<Bin> },
    /// Five-number summary; `None` when there are no values.
    Distribution { summary: Option<BoxSummary> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub year: i32,
    pub label: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::Points { points } => points.is_empty(),
            ChartData::Slices { slices } => slices.is_empty(),
            ChartData::Bins { bins } => bins.is_empty(),
            ChartData::Distribution { summary } => summary.is_none(),
        }
    }
}

/// Build the chart description for one indicator.
///
/// Pie and funnel charts sum each year's values into a single slice. This
/// drops per-record resolution on purpose: a slice is a year.
pub fn render(series: &Series, chart_type: ChartType, meta: &IndicatorMeta) -> ChartSpec {
    let data = match chart_type {
        ChartType::Line | ChartType::Bar | ChartType::Area | ChartType::Scatter => {
            ChartData::Points {
                points: series
                    .latest_per_year()
                    .into_iter()
                    .map(|(year, v)| [f64::from(year), v])
                    .collect(),
            }
        }
        ChartType::Pie | ChartType::Funnel => {
            let totals = aggregate_by_year(series);
            let colors = color::palette_hex(totals.len());
            ChartData::Slices {
                slices: totals
                    .into_iter()
                    .zip(colors)
                    .map(|((year, value), color)| Slice {
                        year,
                        label: year.to_string(),
                        value,
                        color,
                    })
                    .collect(),
            }
        }
        ChartType::Histogram => {
            let values: Vec<f64> = series.present().map(|(_, v)| v).collect();
            ChartData::Bins {
                bins: histogram(&values),
            }
        }
        ChartType::Box => {
            let values: Vec<f64> = series.present().map(|(_, v)| v).collect();
            ChartData::Distribution {
                summary: box_summary(&values),
            }
        }
    };

    let x_label = match chart_type {
        ChartType::Histogram => meta.unit.clone(),
        ChartType::Box => String::new(),
        _ => "Year".to_string(),
    };
    let y_label = match chart_type {
        ChartType::Histogram => "Count".to_string(),
        ChartType::Pie | ChartType::Funnel => String::new(),
        _ => meta.unit.clone(),
    };

    ChartSpec {
        title: meta.display_title.clone(),
        x_label,
        y_label,
        chart_type,
        color: meta.color.clone(),
        data,
    }
}

/// Sum the non-missing values of each year, in year order.
pub fn aggregate_by_year(series: &Series) -> Vec<(i32, f64)> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for (year, v) in series.present() {
        *totals.entry(year).or_default() += v;
    }
    totals.into_iter().collect()
}

/// Equal-width bins; bin count follows Sturges' rule.
pub fn histogram(values: &[f64]) -> Vec<Bin> {
    if values.is_empty() {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let n_bins = (values.len() as f64).log2().ceil() as usize + 1;
    let width = (max - min) / n_bins as f64;

    // Constant series, or a span too wide to represent in f64.
    if max - min <= f64::EPSILON * max.abs().max(1.0) || !width.is_finite() {
        return vec![Bin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }
    let mut bins: Vec<Bin> = (0..n_bins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();
    // The last bin is closed so `max` lands inside it.
    if let Some(last) = bins.last_mut() {
        last.end = max;
    }

    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

/// Quartiles with linear interpolation and 1.5 IQR whiskers.
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = percentile(&sorted, 25.0);
    let median = percentile(&sorted, 50.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR * iqr;
    let high_fence = q3 + WHISKER_IQR * iqr;

    let inside = || sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
    let lower_whisker = inside().next().unwrap_or(q1);
    let upper_whisker = inside().last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(low_fence..=high_fence).contains(v))
        .collect();

    Some(BoxSummary {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

/// Percentile of already-sorted values, linear interpolation between ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
