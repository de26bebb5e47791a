use std::convert::Infallible;
use std::time::Duration;

use clap::Parser;

use crate::catalog::ChartType;
use crate::data::loader::{self, DataSource, LoadOptions, MissingValuePolicy};

/// Science & technology indicator dashboard.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// CSV file path or http(s) URL with `Indicator.Name`, `Year`, `Value` columns
    #[arg(short, long, default_value = loader::DEFAULT_SOURCE)]
    pub source: String,

    /// Seconds to wait for a remote source before giving up
    #[arg(long, default_value_t = loader::DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Treatment of missing values, applied to every indicator
    #[arg(long, value_enum, default_value_t = MissingValuePolicy::Keep)]
    pub missing: MissingValuePolicy,

    /// Chart every indicator with this type instead of its catalog default
    /// (line, bar, area, scatter, pie, histogram, box, funnel)
    #[arg(long, value_parser = chart_type_arg)]
    pub chart: Option<ChartType>,

    /// Print the dashboard as JSON instead of opening a window
    #[arg(long)]
    pub report: bool,

    /// First year included in the report (inclusive)
    #[arg(long, requires = "report")]
    pub from_year: Option<i32>,

    /// Last year included in the report (inclusive)
    #[arg(long, requires = "report")]
    pub to_year: Option<i32>,

    /// Restrict the report to these indicators (repeatable)
    #[arg(long = "indicator", requires = "report")]
    pub indicators: Vec<String>,
}

/// Unknown chart tags fall back to a line chart instead of failing.
fn chart_type_arg(tag: &str) -> Result<ChartType, Infallible> {
    let chart_type = ChartType::parse_or_default(tag);
    if !chart_type.as_str().eq_ignore_ascii_case(tag.trim()) {
        log::warn!("Unknown chart type '{tag}', using {chart_type}");
    }
    Ok(chart_type)
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardConfig {
    pub source: DataSource,
    pub load: LoadOptions,
    pub chart_override: Option<ChartType>,
    pub report: Option<ReportScope>,
}

/// Selection used by a headless run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportScope {
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
    /// Empty means every indicator.
    pub indicators: Vec<String>,
}

impl From<Args> for DashboardConfig {
    fn from(args: Args) -> Self {
        let report = args.report.then(|| ReportScope {
            from_year: args.from_year,
            to_year: args.to_year,
            indicators: args.indicators,
        });
        Self {
            source: DataSource::parse(&args.source),
            load: LoadOptions {
                missing: args.missing,
                timeout: Duration::from_secs(args.timeout_secs),
            },
            chart_override: args.chart,
            report,
        }
    }
}
