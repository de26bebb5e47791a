use log::{info, warn};

use crate::data::loader::{self, DataSource, LoadError, LoadOptions};
use crate::data::model::IndicatorTable;

// ---------------------------------------------------------------------------
// Session table cache
// ---------------------------------------------------------------------------

/// Owns the loaded table for the session.
///
/// Populated on the first [`TableCache::get_or_load`], replaced by
/// [`TableCache::reload`] and dropped by [`TableCache::invalidate`]. A failed
/// reload leaves the previous table in place.
#[derive(Debug)]
pub struct TableCache {
    source: DataSource,
    options: LoadOptions,
    table: Option<IndicatorTable>,
    last_error: Option<String>,
    loads: usize,
}

impl TableCache {
    pub fn new(source: DataSource, options: LoadOptions) -> Self {
        Self {
            source,
            options,
            table: None,
            last_error: None,
            loads: 0,
        }
    }

    /// Return the cached table, loading it if nothing is cached yet.
    pub fn get_or_load(&mut self) -> Result<&IndicatorTable, LoadError> {
        let table = match self.table.take() {
            Some(table) => table,
            None => self.fetch()?,
        };
        Ok(self.table.insert(table))
    }

    /// Load again from the source. On failure the previous table is kept.
    pub fn reload(&mut self) -> Result<&IndicatorTable, LoadError> {
        let table = self.fetch()?;
        Ok(self.table.insert(table))
    }

    pub fn invalidate(&mut self) {
        if self.table.take().is_some() {
            info!("Dropped cached table for {}", self.source);
        }
    }

    /// Point the cache at a different source. The cached table is kept until
    /// the next successful load.
    pub fn set_source(&mut self, source: DataSource) {
        self.source = source;
    }

    pub fn table(&self) -> Option<&IndicatorTable> {
        self.table.as_ref()
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Message of the most recent failed load, cleared by a successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Number of successful loads so far.
    pub fn loads(&self) -> usize {
        self.loads
    }

    fn fetch(&mut self) -> Result<IndicatorTable, LoadError> {
        match loader::load(&self.source, &self.options) {
            Ok(table) => {
                self.loads += 1;
                self.last_error = None;
                Ok(table)
            }
            Err(e) => {
                warn!("Failed to load {}: {e}", self.source);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    struct TempCsv(PathBuf);

    impl TempCsv {
        fn new(tag: &str, contents: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "indicator-dash-cache-{tag}-{}.csv",
                std::process::id()
            ));
            std::fs::write(&path, contents).unwrap();
            TempCsv(path)
        }

        fn write(&self, contents: &str) {
            std::fs::write(&self.0, contents).unwrap();
        }

        fn source(&self) -> DataSource {
            DataSource::Path(self.0.clone())
        }
    }

    impl Drop for TempCsv {
        fn drop(&mut self) {
            std::fs::remove_file(&self.0).ok();
        }
    }

    #[test]
    fn loads_once_until_invalidated() {
        let csv = TempCsv::new("once", "Indicator.Name,Year,Value\nx,2000,1\n");
        let mut cache = TableCache::new(csv.source(), LoadOptions::default());

        assert_eq!(cache.get_or_load().unwrap().len(), 1);
        csv.write("Indicator.Name,Year,Value\nx,2000,1\nx,2001,2\n");
        assert_eq!(cache.get_or_load().unwrap().len(), 1);
        assert_eq!(cache.loads(), 1);

        cache.invalidate();
        assert!(cache.table().is_none());
        assert_eq!(cache.get_or_load().unwrap().len(), 2);
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn failed_reload_keeps_last_good_table() {
        let csv = TempCsv::new("keep", "Indicator.Name,Year,Value\nx,2000,1\n");
        let mut cache = TableCache::new(csv.source(), LoadOptions::default());
        cache.get_or_load().unwrap();

        csv.write("Name,When\nx,2000\n");
        assert!(matches!(cache.reload(), Err(LoadError::MissingColumn(_))));
        assert!(cache.last_error().is_some());
        assert_eq!(cache.table().map(|t| t.len()), Some(1));

        csv.write("Indicator.Name,Year,Value\nx,2000,1\nx,2001,2\n");
        assert_eq!(cache.reload().unwrap().len(), 2);
        assert!(cache.last_error().is_none());
    }

    #[test]
    fn failed_url_reload_keeps_previous_table() {
        let csv = TempCsv::new("url", "Indicator.Name,Year,Value\nx,2000,1\nx,2001,2\n");
        let options = LoadOptions {
            timeout: Duration::from_secs(3),
            ..LoadOptions::default()
        };
        let mut cache = TableCache::new(csv.source(), options);
        cache.get_or_load().unwrap();

        cache.set_source(DataSource::parse("http://127.0.0.1:1/indicators.csv"));
        assert!(matches!(cache.reload(), Err(LoadError::Http { .. })));
        assert!(cache.last_error().is_some());
        assert_eq!(cache.table().map(|t| t.len()), Some(2));
        assert_eq!(cache.loads(), 1);
    }

    #[test]
    fn unreachable_source_is_reported() {
        let mut cache = TableCache::new(
            DataSource::Path(PathBuf::from("/nonexistent/indicators.csv")),
            LoadOptions::default(),
        );
        assert!(cache.get_or_load().is_err());
        assert!(cache.table().is_none());
        assert_eq!(cache.loads(), 0);
    }
}
