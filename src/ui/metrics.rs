use eframe::egui::{Color32, RichText, Ui};

use crate::dashboard::{DashboardView, IndicatorPanel, KpiCard};
use crate::stats::SummaryStats;

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

/// Row of headline metric cards for the latest year.
pub fn kpi_row(ui: &mut Ui, view: &DashboardView) {
    let Some(year) = view.kpi_year else {
        return;
    };
    if view.kpis.is_empty() {
        return;
    }

    ui.strong(format!("Key Science & Tech KPIs - {year}"));
    ui.columns(view.kpis.len(), |cols: &mut [Ui]| {
        for (col, kpi) in cols.iter_mut().zip(&view.kpis) {
            kpi_card(col, kpi);
        }
    });
}

fn kpi_card(ui: &mut Ui, kpi: &KpiCard) {
    ui.group(|ui: &mut Ui| {
        ui.label(RichText::new(&kpi.label).small().weak());
        ui.label(RichText::new(&kpi.display).size(24.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Per-indicator summary
// ---------------------------------------------------------------------------

pub fn summary_line(ui: &mut Ui, panel: &IndicatorPanel) {
    match (&panel.summary, &panel.notice) {
        (Some(summary), _) => {
            let delta_color = if summary.delta > 0.0 {
                Color32::from_rgb(0x2c, 0xa0, 0x2c)
            } else if summary.delta < 0.0 {
                Color32::from_rgb(0xd6, 0x27, 0x28)
            } else {
                Color32::GRAY
            };
            ui.horizontal_wrapped(|ui: &mut Ui| {
                ui.label(format!(
                    "Latest ({}): {}",
                    summary.latest_year,
                    format_value(summary.latest)
                ));
                ui.label(RichText::new(delta_text(summary)).color(delta_color));
                ui.label(RichText::new(range_text(summary)).weak());
            });
        }
        (None, Some(notice)) => {
            ui.label(RichText::new(notice).italics());
        }
        (None, None) => {}
    }
}

pub fn delta_text(summary: &SummaryStats) -> String {
    format!(
        "Δ {}{} ({:+.1}%)",
        if summary.delta >= 0.0 { "+" } else { "-" },
        format_value(summary.delta.abs()),
        summary.delta_pct
    )
}

pub fn range_text(summary: &SummaryStats) -> String {
    format!(
        "min {} · max {} · mean {}",
        format_value(summary.min),
        format_value(summary.max),
        format_value(summary.mean)
    )
}

/// Two decimals for small values, thousands separators for large ones.
pub fn format_value(v: f64) -> String {
    if v.abs() < 1000.0 {
        return format!("{v:.2}");
    }
    let rounded = format!("{:.0}", v.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if v < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
