//! One pass of the dashboard pipeline:
//! filter → catalog lookup → summarize → chart, plus the KPI cards.

use log::debug;
use serde::Serialize;

use crate::catalog::{ChartType, IndicatorCatalog, IndicatorMeta};
use crate::chart::{self, ChartSpec};
use crate::data::filter::{self, FilterSelection, SelectionStatus};
use crate::data::model::IndicatorTable;
use crate::stats::{self, SummaryStats};

/// User choices that affect presentation but not which rows pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Replace every indicator's catalog chart type.
    pub chart_override: Option<ChartType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub label: String,
    /// `None` when the indicator has no row in the KPI year.
    pub value: Option<f64>,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorPanel {
    pub indicator: String,
    pub meta: IndicatorMeta,
    pub summary: Option<SummaryStats>,
    /// Informational text shown instead of the summary line.
    pub notice: Option<String>,
    pub chart: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub status: SelectionStatus,
    pub message: Option<String>,
    /// Latest year of the full table; KPIs ignore the year filter.
    pub kpi_year: Option<i32>,
    pub kpis: Vec<KpiCard>,
    pub panels: Vec<IndicatorPanel>,
    /// Rows passing the selection.
    pub rows: usize,
}

pub fn build(
    table: &IndicatorTable,
    selection: &FilterSelection,
    catalog: &IndicatorCatalog,
    options: &ViewOptions,
) -> DashboardView {
    let status = selection.status();
    let filtered = filter::apply(table, selection);
    let (kpi_year, kpis) = kpi_cards(table, catalog);

    let panels: Vec<IndicatorPanel> = filtered
        .indicators
        .iter()
        .map(|name| {
            if !catalog.contains(name) {
                debug!("No catalog entry for '{name}', using defaults");
            }
            let meta = catalog.lookup(name);
            let series = filtered.series(name);
            let chart_type = options.chart_override.unwrap_or(meta.chart_type);
            let chart = chart::render(&series, chart_type, &meta);
            let (summary, notice) = match stats::summarize(&series) {
                Ok(s) => (Some(s), None),
                Err(e) => (None, Some(e.to_string())),
            };
            IndicatorPanel {
                indicator: name.clone(),
                meta,
                summary,
                notice,
                chart,
            }
        })
        .collect();

    let message = match status.message() {
        Some(m) => Some(m.to_string()),
        None if filtered.is_empty() => Some("No rows match the current selection.".to_string()),
        None => None,
    };

    debug!(
        "Dashboard pass: {} of {} rows, {} panels",
        filtered.len(),
        table.len(),
        panels.len()
    );

    DashboardView {
        status,
        message,
        kpi_year,
        kpis,
        panels,
        rows: filtered.len(),
    }
}

/// Headline values at the latest year of the unfiltered table.
fn kpi_cards(table: &IndicatorTable, catalog: &IndicatorCatalog) -> (Option<i32>, Vec<KpiCard>) {
    let Some(year) = table.latest_year() else {
        return (None, Vec::new());
    };
    let cards = catalog
        .kpis()
        .iter()
        .map(|kpi| {
            let present = table
                .records
                .iter()
                .any(|r| r.indicator == kpi.indicator && r.year == year && r.value.is_some());
            let value = present.then(|| table.sum_in_year(kpi.indicator, year));
            KpiCard {
                label: kpi.label.to_string(),
                value,
                display: value.map_or_else(|| "n/a".to_string(), |v| kpi.format.format(v)),
            }
        })
        .collect();
    (Some(year), cards)
}
