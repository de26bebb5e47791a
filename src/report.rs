//! Headless run: one pipeline pass printed as JSON.

use std::io::Write;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::cache::TableCache;
use crate::catalog::IndicatorCatalog;
use crate::config::{DashboardConfig, ReportScope};
use crate::dashboard::{self, DashboardView, ViewOptions};
use crate::data::filter::FilterSelection;
use crate::data::model::IndicatorTable;

pub fn run(config: &DashboardConfig, scope: &ReportScope) -> Result<()> {
    let mut cache = TableCache::new(config.source.clone(), config.load);
    let table = cache
        .get_or_load()
        .with_context(|| format!("loading indicators from {}", config.source))?;

    let catalog = IndicatorCatalog::default();
    let selection = scope_selection(table, scope);
    let options = ViewOptions {
        chart_override: config.chart_override,
    };
    let view = dashboard::build(table, &selection, &catalog, &options);
    if let Some(message) = &view.message {
        warn!("{message}");
    }

    let json = to_json(&view)?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{json}").context("writing report")?;
    info!("Report: {} panels, {} rows", view.panels.len(), view.rows);
    Ok(())
}

pub fn to_json(view: &DashboardView) -> Result<String> {
    serde_json::to_string_pretty(view).context("serializing dashboard view")
}

/// Translate report flags into a sidebar-style selection.
pub fn scope_selection(table: &IndicatorTable, scope: &ReportScope) -> FilterSelection {
    let mut selection = FilterSelection::year_range(table, scope.from_year, scope.to_year);

    if !scope.indicators.is_empty() {
        selection.indicators = scope
            .indicators
            .iter()
            .filter(|name| {
                let known = table.indicators.contains(*name);
                if !known {
                    warn!("Ignoring indicator '{name}': not in the table");
                }
                known
            })
            .cloned()
            .collect();
    }
    selection
}
