use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use log::{debug, info};
use serde::Serialize;
use thiserror::Error;

use super::model::{IndicatorRecord, IndicatorTable};

/// Local file name of the bundled indicator extract.
pub const DEFAULT_SOURCE: &str = "science_and_tech_sl.csv";

/// Upper bound on a remote fetch before giving up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const INDICATOR_COLUMN: &str = "Indicator.Name";
pub const YEAR_COLUMN: &str = "Year";
pub const VALUE_COLUMN: &str = "Value";

/// Cell contents treated as "no value".
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", ".."];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("fetching {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV missing '{0}' column")]
    MissingColumn(&'static str),
    #[error("CSV line {line}: {message}")]
    Row { line: u64, message: String },
    #[error("source contains no data rows")]
    Empty,
}

// ---------------------------------------------------------------------------
// Source and options
// ---------------------------------------------------------------------------

/// Where the indicator table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` prefixes select a remote fetch; anything
    /// else is a local path.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::Path(PathBuf::from(trimmed))
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Path(PathBuf::from(DEFAULT_SOURCE))
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(p) => write!(f, "{}", p.display()),
            DataSource::Url(u) => write!(f, "{u}"),
        }
    }
}

/// How missing `Value` cells are treated. One policy applies to the whole
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingValuePolicy {
    /// Leave gaps as missing.
    #[default]
    Keep,
    /// Fill interior gaps by linear interpolation over the indicator's years.
    Interpolate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub missing: MissingValuePolicy,
    pub timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            missing: MissingValuePolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the indicator table from a local file or a URL.
///
/// Expected layout: a header row containing `Indicator.Name`, `Year` and
/// `Value`; any other columns are ignored.
pub fn load(source: &DataSource, options: &LoadOptions) -> Result<IndicatorTable, LoadError> {
    let mut table = match source {
        DataSource::Path(path) => {
            let file = File::open(path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            parse_csv(file)?
        }
        DataSource::Url(url) => {
            let body = fetch_remote(url, options.timeout)?;
            parse_csv(body.as_bytes())?
        }
    };

    if options.missing == MissingValuePolicy::Interpolate {
        let filled = interpolate_missing(&mut table.records);
        debug!("Interpolated {filled} missing values");
    }

    info!(
        "Loaded {} rows ({} indicators, {} years) from {source}",
        table.len(),
        table.indicators.len(),
        table.years.len()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse indicator rows from any CSV reader.
pub fn parse_csv<R: Read>(reader: R) -> Result<IndicatorTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };
    let name_idx = column(INDICATOR_COLUMN)?;
    let year_idx = column(YEAR_COLUMN)?;
    let value_idx = column(VALUE_COLUMN)?;

    let mut records = Vec::new();

    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let row_error = |message: String| LoadError::Row { line, message };

        let name = row.get(name_idx).unwrap_or("");
        if name.is_empty() {
            return Err(row_error(format!("empty '{INDICATOR_COLUMN}'")));
        }
        let year_text = row.get(year_idx).unwrap_or("");
        let year = parse_year(year_text)
            .ok_or_else(|| row_error(format!("'{year_text}' is not a year")))?;
        let value_text = row.get(value_idx).unwrap_or("");
        let value = parse_value(value_text)
            .ok_or_else(|| row_error(format!("'{value_text}' is not a number")))?;

        records.push(IndicatorRecord::new(name, year, value));
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(IndicatorTable::from_records(records))
}

/// Integer years, also accepting integral floats such as `2019.0`.
fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let f = s.parse::<f64>().ok()?;
    if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

/// Outer `None` means unparsable; inner `None` means an explicit gap.
fn parse_value(s: &str) -> Option<Option<f64>> {
    if MISSING_MARKERS.contains(&s) {
        return Some(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(Some(v)),
        Ok(_) => Some(None),
        Err(_) => None,
    }
}

// ---------------------------------------------------------------------------
// Remote fetch
// ---------------------------------------------------------------------------

fn fetch_remote(url: &str, timeout: Duration) -> Result<String, LoadError> {
    let http = |source: reqwest::Error| LoadError::Http {
        url: url.to_string(),
        source,
    };

    info!("Fetching {url} (timeout {}s)", timeout.as_secs());
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(http)?;

    client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.text())
        .map_err(http)
}

// ---------------------------------------------------------------------------
// Missing value interpolation
// ---------------------------------------------------------------------------

/// Fill interior gaps of every indicator by linear interpolation in year
/// between the nearest known neighbours. Leading and trailing gaps stay
/// missing. Only original values serve as anchors. Returns the number of
/// values filled.
pub fn interpolate_missing(records: &mut [IndicatorRecord]) -> usize {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, rec) in records.iter().enumerate() {
        groups.entry(rec.indicator.clone()).or_default().push(i);
    }

    let mut fills: Vec<(usize, f64)> = Vec::new();

    for mut idx in groups.into_values() {
        idx.sort_by_key(|&i| records[i].year);

        for (pos, &i) in idx.iter().enumerate() {
            if records[i].value.is_some() {
                continue;
            }
            let before = idx[..pos]
                .iter()
                .rev()
                .find_map(|&j| records[j].value.map(|v| (records[j].year, v)));
            let after = idx[pos + 1..]
                .iter()
                .find_map(|&j| records[j].value.map(|v| (records[j].year, v)));

            if let (Some((y0, v0)), Some((y1, v1))) = (before, after) {
                let filled = if y1 == y0 {
                    v0
                } else {
                    let t = f64::from(records[i].year - y0) / f64::from(y1 - y0);
                    v0 + (v1 - v0) * t
                };
                fills.push((i, filled));
            }
        }
    }

    for &(i, v) in &fills {
        records[i].value = Some(v);
    }
    fills.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Country Name,Indicator.Name,Year,Value,Indicator Code
Sri Lanka,Research and development expenditure (% of GDP),2018,0.11,GB.XPD.RSDV.GD.ZS
Sri Lanka,Research and development expenditure (% of GDP),2019,,GB.XPD.RSDV.GD.ZS
Sri Lanka,Research and development expenditure (% of GDP),2020,0.15,GB.XPD.RSDV.GD.ZS
Sri Lanka,\"Patent applications, nonresidents\",2020.0,421,IP.PAT.NRES
";

    #[test]
    fn parses_required_columns_and_ignores_extras() {
        let table = parse_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.indicators.len(), 2);
        assert_eq!(table.indicators[1], "Patent applications, nonresidents");
        assert_eq!(table.records[1].value, None);
        assert_eq!(table.records[3].year, 2020);
        assert_eq!(table.records[3].value, Some(421.0));
    }

    #[test]
    fn missing_column_is_reported() {
        let err = parse_csv("Indicator.Name,Year\nx,2000\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("Value")));
    }

    #[test]
    fn bad_year_reports_line() {
        let err = parse_csv("Indicator.Name,Year,Value\nx,2000,1\nx,twenty,2\n".as_bytes())
            .unwrap_err();
        match err {
            LoadError::Row { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("twenty"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_value_is_an_error_but_markers_are_missing() {
        assert!(parse_csv("Indicator.Name,Year,Value\nx,2000,abc\n".as_bytes()).is_err());
        let table =
            parse_csv("Indicator.Name,Year,Value\nx,2000,NA\nx,2001,..\nx,2002, 3 \n".as_bytes())
                .unwrap();
        let values: Vec<_> = table.records.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![None, None, Some(3.0)]);
    }

    #[test]
    fn header_only_is_empty() {
        let err = parse_csv("Indicator.Name,Year,Value\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Empty));
    }

    #[test]
    fn year_parsing() {
        assert_eq!(parse_year("2019"), Some(2019));
        assert_eq!(parse_year("2019.0"), Some(2019));
        assert_eq!(parse_year("2019.5"), None);
        assert_eq!(parse_year(""), None);
    }

    #[test]
    fn interpolation_fills_interior_gaps_only() {
        let mut records = vec![
            IndicatorRecord::new("a", 2000, None),
            IndicatorRecord::new("a", 2001, Some(1.0)),
            IndicatorRecord::new("b", 2001, Some(100.0)),
            IndicatorRecord::new("a", 2004, Some(4.0)),
            IndicatorRecord::new("a", 2002, None),
            IndicatorRecord::new("a", 2005, None),
        ];
        let filled = interpolate_missing(&mut records);
        assert_eq!(filled, 1);
        assert_eq!(records[0].value, None);
        assert_eq!(records[4].value, Some(2.0));
        assert_eq!(records[5].value, None);
        assert_eq!(records[2].value, Some(100.0));
    }

    #[test]
    fn data_source_parse() {
        assert_eq!(
            DataSource::parse("https://example.org/data.csv"),
            DataSource::Url("https://example.org/data.csv".into())
        );
        assert_eq!(
            DataSource::parse(" data/local.csv "),
            DataSource::Path(PathBuf::from("data/local.csv"))
        );
    }

    #[test]
    fn load_from_file_with_interpolation() {
        let path = std::env::temp_dir().join(format!(
            "indicator-dash-loader-{}.csv",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "Indicator.Name,Year,Value\nx,2000,1\nx,2001,\nx,2002,3\n",
        )
        .unwrap();

        let options = LoadOptions {
            missing: MissingValuePolicy::Interpolate,
            ..LoadOptions::default()
        };
        let table = load(&DataSource::Path(path.clone()), &options).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.records[1].value, Some(2.0));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let source = DataSource::Path(PathBuf::from("/nonexistent/indicators.csv"));
        let err = load(&source, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn unreachable_url_fails_fast_with_http_error() {
        let source = DataSource::parse("http://127.0.0.1:1/indicators.csv");
        assert!(matches!(source, DataSource::Url(_)));
        let options = LoadOptions {
            timeout: Duration::from_secs(3),
            ..LoadOptions::default()
        };

        let started = std::time::Instant::now();
        let err = load(&source, &options).unwrap_err();
        assert!(started.elapsed() < options.timeout);
        match err {
            LoadError::Http { url, .. } => assert_eq!(url, "http://127.0.0.1:1/indicators.csv"),
            other => panic!("expected Http error, got {other:?}"),
        }
    }
}
