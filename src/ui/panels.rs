use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::catalog::ChartType;
use crate::data::loader::DataSource;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(table) = state.cache.table() else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let years: Vec<i32> = table.years.iter().copied().collect();
    let indicators = table.indicators.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Chart type override ----
            ui.strong("Chart type");
            let current = state.options.chart_override;
            let selected_text = current.map_or("Catalog default", ChartType::as_str);
            egui::ComboBox::from_id_salt("chart_type")
                .selected_text(selected_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(current.is_none(), "Catalog default")
                        .clicked()
                    {
                        state.set_chart_override(None);
                    }
                    for chart_type in ChartType::ALL {
                        if ui
                            .selectable_label(current == Some(chart_type), chart_type.as_str())
                            .clicked()
                        {
                            state.set_chart_override(Some(chart_type));
                        }
                    }
                });
            ui.separator();

            // ---- Years ----
            let header = format!("Year(s)  ({}/{})", state.selection.years.len(), years.len());
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("years")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_years();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_years();
                        }
                    });

                    for &year in &years {
                        let mut checked = state.selection.years.contains(&year);
                        if ui.checkbox(&mut checked, year.to_string()).changed() {
                            state.toggle_year(year);
                        }
                    }
                });

            // ---- Indicators ----
            let header = format!(
                "Indicators  ({}/{})",
                state.selection.indicators.len(),
                indicators.len()
            );
            egui::CollapsingHeader::new(RichText::new(header).strong())
                .id_salt("indicators")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_indicators();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_indicators();
                        }
                    });

                    for name in &indicators {
                        let meta = state.catalog.lookup(name);
                        let text = RichText::new(&meta.display_title)
                            .color(crate::color::to_color32(&meta.color));
                        let mut checked = state.selection.indicators.contains(name);
                        if ui.checkbox(&mut checked, text).on_hover_text(name).changed() {
                            state.toggle_indicator(name);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui.button("Clear cache").clicked() {
                state.clear_cache();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("Source: {}", state.cache.source()));

        if let (Some(table), Some(view)) = (state.cache.table(), &state.view) {
            ui.separator();
            ui.label(format!("{} rows loaded, {} selected", table.len(), view.rows));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open indicator data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_source(DataSource::Path(path));
    }
}
