//! Summary metrics for one indicator series.

use serde::Serialize;
use thiserror::Error;

use crate::data::model::Series;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    #[error("no values for '{indicator}' in the current selection")]
    EmptySeries { indicator: String },
}

/// Descriptive metrics over the non-missing points of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    /// Distinct years with a value.
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Value at the most recent year.
    pub latest: f64,
    pub latest_year: i32,
    /// `latest` minus the value at the previous year with data; 0 with a
    /// single point.
    pub delta: f64,
    /// `delta` as a percentage of the previous value; 0 when that value is 0.
    pub delta_pct: f64,
}

/// Summarize a series. Duplicate years collapse last-wins and missing
/// values are skipped before any metric is computed.
pub fn summarize(series: &Series) -> Result<SummaryStats, SummaryError> {
    let points = series.latest_per_year();

    let Some(&(latest_year, latest)) = points.last() else {
        return Err(SummaryError::EmptySeries {
            indicator: series.indicator.clone(),
        });
    };

    let values = points.iter().map(|&(_, v)| v);
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.clone().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.sum::<f64>() / points.len() as f64;

    let (delta, delta_pct) = match points.len() {
        0 | 1 => (0.0, 0.0),
        n => {
            let prior = points[n - 2].1;
            let delta = latest - prior;
            (delta, percent_change(prior, delta))
        }
    };

    Ok(SummaryStats {
        count: points.len(),
        min,
        max,
        // Rounding can put the mean a hair outside [min, max].
        mean: mean.clamp(min, max),
        latest,
        latest_year,
        delta,
        delta_pct,
    })
}

fn percent_change(prior: f64, delta: f64) -> f64 {
    if prior == 0.0 {
        0.0
    } else {
        delta / prior * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilterSelection};
    use crate::data::model::{IndicatorRecord, IndicatorTable, SeriesPoint};

    fn series(points: &[(i32, Option<f64>)]) -> Series {
        Series::new(
            "x",
            points
                .iter()
                .map(|&(year, value)| SeriesPoint { year, value })
                .collect(),
        )
    }

    #[test]
    fn empty_series_is_explicit_error() {
        let err = summarize(&series(&[])).unwrap_err();
        assert_eq!(err, SummaryError::EmptySeries { indicator: "x".into() });

        // Only missing values is also empty.
        assert!(summarize(&series(&[(2000, None), (2001, None)])).is_err());
    }

    #[test]
    fn basic_metrics() {
        let s = summarize(&series(&[(2001, Some(4.0)), (2000, Some(2.0)), (2002, Some(3.0))]))
            .unwrap();
        assert_eq!(s.count, 3);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.latest, 3.0);
        assert_eq!(s.latest_year, 2002);
        assert_eq!(s.delta, -1.0);
        assert_eq!(s.delta_pct, -25.0);
    }

    #[test]
    fn single_point_has_zero_delta() {
        let s = summarize(&series(&[(2019, Some(0.8))])).unwrap();
        assert_eq!(s.latest, 0.8);
        assert_eq!(s.delta, 0.0);
        assert_eq!(s.delta_pct, 0.0);
    }

    #[test]
    fn zero_prior_does_not_divide() {
        let s = summarize(&series(&[(2000, Some(0.0)), (2001, Some(5.0))])).unwrap();
        assert_eq!(s.delta, 5.0);
        assert_eq!(s.delta_pct, 0.0);
        assert!(s.delta_pct.is_finite());
    }

    #[test]
    fn missing_latest_falls_back_to_last_present_year() {
        let s = summarize(&series(&[(2000, Some(1.0)), (2001, Some(2.0)), (2002, None)]))
            .unwrap();
        assert_eq!(s.latest_year, 2001);
        assert_eq!(s.delta, 1.0);
    }

    #[test]
    fn ordering_invariants_hold() {
        let cases: &[&[(i32, Option<f64>)]] = &[
            &[(2000, Some(0.1)), (2001, Some(0.2)), (2002, Some(0.3))],
            &[(2000, Some(-5.0)), (2001, Some(1e9)), (2002, None), (2003, Some(7.0))],
            &[(2010, Some(0.3)); 3],
        ];
        for case in cases {
            let s = summarize(&series(case)).unwrap();
            assert!(s.min <= s.mean && s.mean <= s.max, "{s:?}");
            assert!(s.min <= s.latest && s.latest <= s.max, "{s:?}");
        }
    }

    #[test]
    fn filtered_view_versus_full_series() {
        let table = IndicatorTable::from_records(vec![
            IndicatorRecord::new("R&D", 2018, Some(0.5)),
            IndicatorRecord::new("R&D", 2019, Some(0.8)),
        ]);

        let mut selection = FilterSelection::all(&table);
        selection.years = [2019].into_iter().collect();
        let filtered = apply(&table, &selection);
        assert_eq!(filtered.len(), 1);

        let view = summarize(&filtered.series("R&D")).unwrap();
        assert_eq!(view.latest, 0.8);
        assert_eq!(view.delta, 0.0);

        let full = summarize(&table.series("R&D")).unwrap();
        assert!((full.delta - 0.3).abs() < 1e-12);
    }
}
