use std::f64::consts::TAU;

use eframe::egui::{RichText, ScrollArea, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, Points, Polygon,
};

use crate::catalog::ChartType;
use crate::chart::{ChartData, ChartSpec, Slice};
use crate::color::to_color32;
use crate::state::AppState;
use crate::ui::metrics;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render KPI cards and one chart per selected indicator.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV file to view indicators  (File → Open CSV…)");
        });
        return;
    };

    ui.heading("Science & Technology Indicators in Sri Lanka");
    metrics::kpi_row(ui, view);
    ui.separator();

    if let Some(message) = &view.message {
        ui.label(RichText::new(message).italics());
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for panel in &view.panels {
                ui.heading(&panel.meta.display_title);
                if !panel.meta.description.is_empty() {
                    ui.label(RichText::new(&panel.meta.description).weak());
                }
                metrics::summary_line(ui, panel);
                chart_plot(ui, &panel.indicator, &panel.chart);
                ui.add_space(12.0);
            }
        });
}

// ---------------------------------------------------------------------------
// Chart drawing
// ---------------------------------------------------------------------------

/// Draw one [`ChartSpec`] with egui_plot.
pub fn chart_plot(ui: &mut Ui, id: &str, spec: &ChartSpec) {
    if spec.data.is_empty() {
        ui.label(RichText::new("No values to chart.").italics());
        return;
    }

    let color = to_color32(&spec.color);
    let name = spec.title.clone();

    let mut plot = Plot::new(format!("chart_{id}"))
        .height(CHART_HEIGHT)
        .x_axis_label(spec.x_label.clone())
        .y_axis_label(spec.y_label.clone())
        .allow_scroll(false);

    if spec.chart_type.aggregates_by_year() {
        plot = plot.legend(Legend::default());
    }
    if spec.chart_type == ChartType::Pie {
        plot = plot
            .data_aspect(1.0)
            .show_axes(false)
            .show_grid(false)
            .allow_drag(false)
            .allow_zoom(false);
    }

    plot.show(ui, |plot_ui| match (&spec.data, spec.chart_type) {
        (ChartData::Points { points }, ChartType::Bar) => {
            let bars = points
                .iter()
                .map(|&[x, y]| Bar::new(x, y).width(0.6))
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(color).name(&name));
        }
        (ChartData::Points { points }, ChartType::Scatter) => {
            plot_ui.points(Points::new(points.clone()).radius(4.0).color(color).name(&name));
        }
        (ChartData::Points { points }, chart_type) => {
            let mut line = Line::new(points.clone()).color(color).width(2.0).name(&name);
            if chart_type == ChartType::Area {
                line = line.fill(0.0);
            }
            plot_ui.line(line);
            plot_ui.points(Points::new(points.clone()).radius(3.0).color(color));
        }
        (ChartData::Slices { slices }, ChartType::Funnel) => {
            let n = slices.len();
            let bars = slices
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    Bar::new((n - i) as f64, s.value)
                        .base_offset(-s.value / 2.0)
                        .width(0.8)
                        .fill(to_color32(&s.color))
                        .name(&s.label)
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name(&name));
        }
        (ChartData::Slices { slices }, _) => {
            for (slice, points) in pie_wedges(slices) {
                let c = to_color32(&slice.color);
                plot_ui.polygon(
                    Polygon::new(points)
                        .fill_color(c.gamma_multiply(0.8))
                        .stroke(Stroke::new(1.0, c))
                        .name(&slice.label),
                );
            }
        }
        (ChartData::Bins { bins }, _) => {
            let bars = bins
                .iter()
                .map(|b| Bar::new((b.start + b.end) / 2.0, b.count as f64).width(b.end - b.start))
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(color).name(&name));
        }
        (ChartData::Distribution { summary: Some(s) }, _) => {
            let spread = BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker);
            let elem = BoxElem::new(0.0, spread)
                .name(&name)
                .fill(color.gamma_multiply(0.4))
                .stroke(Stroke::new(1.5, color));
            plot_ui.box_plot(BoxPlot::new(vec![elem]));
            if !s.outliers.is_empty() {
                let outliers: Vec<[f64; 2]> = s.outliers.iter().map(|&v| [0.0, v]).collect();
                plot_ui.points(Points::new(outliers).radius(3.0).color(color));
            }
        }
        (ChartData::Distribution { summary: None }, _) => {}
    });
}

/// Unit-circle wedge outlines for the positive slices of a pie.
fn pie_wedges(slices: &[Slice]) -> Vec<(&Slice, Vec<[f64; 2]>)> {
    let total: f64 = slices.iter().map(|s| s.value).filter(|v| *v > 0.0).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut start = TAU / 4.0;
    slices
        .iter()
        .filter(|s| s.value > 0.0)
        .map(|s| {
            let sweep = s.value / total * TAU;
            let steps = ((sweep / TAU) * 64.0).ceil().max(2.0) as usize;
            let mut points = vec![[0.0, 0.0]];
            points.extend((0..=steps).map(|k| {
                // Clockwise from 12 o'clock, like plotly.
                let angle = start - sweep * k as f64 / steps as f64;
                [angle.cos(), angle.sin()]
            }));
            start -= sweep;
            (s, points)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slice(year: i32, value: f64) -> Slice {
        Slice {
            year,
            label: year.to_string(),
            value,
            color: "#000000".into(),
        }
    }

    #[test]
    fn wedges_cover_the_circle() {
        let slices = [slice(2018, 10.0), slice(2019, 20.0), slice(2020, 30.0)];
        let wedges = pie_wedges(&slices);
        assert_eq!(wedges.len(), 3);

        // Each wedge starts at the centre and ends where the next begins.
        for pair in wedges.windows(2) {
            let end = pair[0].1.last().unwrap();
            let next_start = pair[1].1[1];
            assert!((end[0] - next_start[0]).abs() < 1e-9);
            assert!((end[1] - next_start[1]).abs() < 1e-9);
        }
        let first = wedges[0].1[1];
        let last = wedges[2].1.last().unwrap();
        assert!((first[0] - last[0]).abs() < 1e-9 && (first[1] - last[1]).abs() < 1e-9);
    }

    #[test]
    fn non_positive_slices_are_skipped() {
        let slices = [slice(2018, 0.0), slice(2019, -4.0), slice(2020, 5.0)];
        assert_eq!(pie_wedges(&slices).len(), 1);
        assert!(pie_wedges(&[slice(2018, 0.0)]).is_empty());
    }
}
