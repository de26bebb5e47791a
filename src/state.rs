use crate::cache::TableCache;
use crate::catalog::{ChartType, IndicatorCatalog};
use crate::config::DashboardConfig;
use crate::dashboard::{self, DashboardView, ViewOptions};
use crate::data::filter::FilterSelection;
use crate::data::loader::DataSource;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table and its source.
    pub cache: TableCache,

    pub catalog: IndicatorCatalog,

    /// Sidebar year / indicator selections.
    pub selection: FilterSelection,

    pub options: ViewOptions,

    /// Result of the last pipeline pass (None until a table is loaded).
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            cache: TableCache::new(config.source.clone(), config.load),
            catalog: IndicatorCatalog::default(),
            selection: FilterSelection::none(),
            options: ViewOptions {
                chart_override: config.chart_override,
            },
            view: None,
            status_message: None,
        }
    }

    /// First load of the configured source, selecting everything.
    pub fn load_initial(&mut self) {
        match self.cache.get_or_load() {
            Ok(table) => {
                self.selection = FilterSelection::all(table);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load data: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
        self.rebuild();
    }

    /// Drop the cached table and load it again from scratch.
    pub fn clear_cache(&mut self) {
        self.cache.invalidate();
        self.view = None;
        self.load_initial();
    }

    /// Reload the current source, keeping the selection where it still applies.
    pub fn reload(&mut self) {
        // A full selection stays full so newly added years/indicators show up.
        let was_all = self
            .cache
            .table()
            .map_or(true, |t| self.selection == FilterSelection::all(t));
        match self.cache.reload() {
            Ok(table) => {
                if was_all {
                    self.selection = FilterSelection::all(table);
                } else {
                    self.selection.retain_known(table);
                }
                self.status_message = None;
                log::info!("Reloaded {} (load #{})", self.cache.source(), self.cache.loads());
            }
            Err(_) => {
                // The previous table (if any) stays on screen.
                self.status_message = self.cache.last_error().map(|e| format!("Error: {e}"));
            }
        }
        self.rebuild();
    }

    /// Switch to a new source. Selections reset to "all" on success.
    pub fn open_source(&mut self, source: DataSource) {
        let previous = self.cache.source().clone();
        self.cache.set_source(source);
        match self.cache.reload() {
            Ok(table) => {
                let rows = table.len();
                self.selection = FilterSelection::all(table);
                self.status_message = None;
                log::info!("Opened {} ({rows} rows)", self.cache.source());
            }
            Err(e) => {
                self.status_message = Some(format!("Error: {e}"));
                self.cache.set_source(previous);
            }
        }
        self.rebuild();
    }

    /// Rerun the pipeline over the cached table.
    pub fn rebuild(&mut self) {
        self.view = self
            .cache
            .table()
            .map(|t| dashboard::build(t, &self.selection, &self.catalog, &self.options));
    }

    pub fn toggle_year(&mut self, year: i32) {
        self.selection.toggle_year(year);
        self.rebuild();
    }

    pub fn toggle_indicator(&mut self, indicator: &str) {
        self.selection.toggle_indicator(indicator);
        self.rebuild();
    }

    pub fn select_all_years(&mut self) {
        if let Some(table) = self.cache.table() {
            self.selection.select_all_years(table);
            self.rebuild();
        }
    }

    pub fn select_no_years(&mut self) {
        self.selection.select_no_years();
        self.rebuild();
    }

    pub fn select_all_indicators(&mut self) {
        if let Some(table) = self.cache.table() {
            self.selection.select_all_indicators(table);
            self.rebuild();
        }
    }

    pub fn select_no_indicators(&mut self) {
        self.selection.select_no_indicators();
        self.rebuild();
    }

    pub fn set_chart_override(&mut self, chart_type: Option<ChartType>) {
        self.options.chart_override = chart_type;
        self.rebuild();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn state_with(contents: &str, tag: &str) -> (AppState, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "indicator-dash-state-{tag}-{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        let config = DashboardConfig {
            source: DataSource::Path(path.clone()),
            ..DashboardConfig::default()
        };
        let mut state = AppState::new(&config);
        state.load_initial();
        (state, path)
    }

    #[test]
    fn initial_load_selects_everything() {
        let (state, path) = state_with("Indicator.Name,Year,Value\na,2000,1\nb,2001,2\n", "init");
        std::fs::remove_file(path).ok();

        let view = state.view.as_ref().unwrap();
        assert_eq!(view.rows, 2);
        assert_eq!(view.panels.len(), 2);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn toggles_rerun_the_pipeline() {
        let (mut state, path) =
            state_with("Indicator.Name,Year,Value\na,2000,1\nb,2001,2\n", "toggle");
        std::fs::remove_file(path).ok();

        state.toggle_indicator("a");
        assert_eq!(state.view.as_ref().unwrap().panels.len(), 1);

        state.select_no_years();
        let view = state.view.as_ref().unwrap();
        assert!(view.panels.is_empty());
        assert!(view.message.is_some());

        state.select_all_years();
        state.select_all_indicators();
        assert_eq!(state.view.as_ref().unwrap().rows, 2);

        state.set_chart_override(Some(ChartType::Box));
        assert!(state
            .view
            .as_ref()
            .unwrap()
            .panels
            .iter()
            .all(|p| p.chart.chart_type == ChartType::Box));
    }

    #[test]
    fn reload_keeps_selection_and_clear_cache_resets_it() {
        let (mut state, path) =
            state_with("Indicator.Name,Year,Value\na,2000,1\nb,2001,2\n", "reload");

        state.toggle_indicator("b");
        std::fs::write(&path, "Indicator.Name,Year,Value\na,2000,1\nb,2001,2\na,2002,3\n")
            .unwrap();
        state.reload();
        assert_eq!(state.view.as_ref().unwrap().rows, 1);
        assert_eq!(state.cache.loads(), 2);

        std::fs::write(&path, "broken").unwrap();
        state.reload();
        assert!(state.status_message.is_some());
        assert_eq!(state.view.as_ref().unwrap().rows, 1);

        std::fs::write(&path, "Indicator.Name,Year,Value\na,2000,1\nb,2001,2\n").unwrap();
        state.clear_cache();
        std::fs::remove_file(&path).ok();
        assert!(state.status_message.is_none());
        assert_eq!(state.view.as_ref().unwrap().rows, 2);
    }

    #[test]
    fn failed_open_keeps_previous_data() {
        let (mut state, path) = state_with("Indicator.Name,Year,Value\na,2000,1\n", "open");
        state.open_source(DataSource::Path(PathBuf::from("/nonexistent/other.csv")));
        std::fs::remove_file(&path).ok();

        assert!(state.status_message.is_some());
        assert_eq!(state.view.as_ref().unwrap().rows, 1);
        assert_eq!(state.cache.source(), &DataSource::Path(path));
    }

    #[test]
    fn missing_source_reports_without_view() {
        let config = DashboardConfig {
            source: DataSource::Path(PathBuf::from("/nonexistent/indicators.csv")),
            ..DashboardConfig::default()
        };
        let mut state = AppState::new(&config);
        state.load_initial();
        assert!(state.view.is_none());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
    }
}
