mod app;
mod cache;
mod catalog;
mod chart;
mod color;
mod config;
mod dashboard;
mod data;
mod report;
mod state;
mod stats;
mod ui;

use anyhow::anyhow;
use app::IndicatorDashApp;
use clap::Parser;
use config::{Args, DashboardConfig};
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::from(Args::parse());
    log::debug!("Starting with {config:?}");

    if let Some(scope) = &config.report {
        return report::run(&config, scope);
    }

    let mut state = AppState::new(&config);
    state.load_initial();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Science & Technology Indicators – Sri Lanka",
        options,
        Box::new(move |_cc| Ok(Box::new(IndicatorDashApp::new(state)))),
    )
    .map_err(|e| anyhow!("running the dashboard window: {e}"))
}
