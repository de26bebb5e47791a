use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Color used for indicators without a catalog entry.
pub const DEFAULT_COLOR: &str = "#636efa";

/// Y-axis label used for indicators without a catalog entry.
pub const DEFAULT_UNIT: &str = "Value";

// ---------------------------------------------------------------------------
// Chart types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
    Area,
    Scatter,
    Pie,
    Histogram,
    Box,
    Funnel,
}

impl ChartType {
    pub const ALL: [ChartType; 8] = [
        ChartType::Line,
        ChartType::Bar,
        ChartType::Area,
        ChartType::Scatter,
        ChartType::Pie,
        ChartType::Histogram,
        ChartType::Box,
        ChartType::Funnel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Bar => "bar",
            ChartType::Area => "area",
            ChartType::Scatter => "scatter",
            ChartType::Pie => "pie",
            ChartType::Histogram => "histogram",
            ChartType::Box => "box",
            ChartType::Funnel => "funnel",
        }
    }

    /// Case-insensitive parse; unknown tags fall back to [`ChartType::Line`].
    pub fn parse_or_default(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }

    /// Pie and funnel charts show one entry per year rather than x/y points.
    pub fn aggregates_by_year(self) -> bool {
        matches!(self, ChartType::Pie | ChartType::Funnel)
    }
}

impl FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        ChartType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| format!("unknown chart type '{tag}'"))
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Indicator metadata
// ---------------------------------------------------------------------------

/// How an indicator is labelled and charted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorMeta {
    pub display_title: String,
    pub unit: String,
    pub description: String,
    pub chart_type: ChartType,
    /// `#rrggbb`
    pub color: String,
}

impl IndicatorMeta {
    /// Metadata for an indicator the catalog does not know.
    pub fn fallback(name: &str) -> Self {
        Self {
            display_title: name.to_string(),
            unit: DEFAULT_UNIT.to_string(),
            description: String::new(),
            chart_type: ChartType::Line,
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// How a KPI card formats its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiFormat {
    Percent,
    Integer,
}

impl KpiFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            KpiFormat::Percent => format!("{value:.2}%"),
            KpiFormat::Integer => format!("{}", value.trunc() as i64),
        }
    }
}

/// A headline metric shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiDef {
    pub label: &'static str,
    pub indicator: &'static str,
    pub format: KpiFormat,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Static indicator name → presentation metadata table.
///
/// Built once at startup and only read afterwards. Unknown names are not an
/// error; they get [`IndicatorMeta::fallback`].
#[derive(Debug, Clone)]
pub struct IndicatorCatalog {
    entries: HashMap<String, IndicatorMeta>,
    kpis: Vec<KpiDef>,
}

pub const RD_EXPENDITURE: &str = "Research and development expenditure (% of GDP)";
pub const JOURNAL_ARTICLES: &str = "Scientific and technical journal articles";
pub const NONRESIDENT_PATENTS: &str = "Patent applications, nonresidents";
pub const RESEARCHERS: &str = "Researchers in R&D (per million people)";
pub const TECHNICIANS: &str = "Technicians in R&D (per million people)";
pub const HIGH_TECH_EXPORTS: &str = "High-technology exports (% of manufactured exports)";
pub const IP_PAYMENTS: &str =
    "Charges for the use of intellectual property, payments (BoP, current US$)";
pub const IP_RECEIPTS: &str =
    "Charges for the use of intellectual property, receipts (BoP, current US$)";

/// (name, title, unit, description, chart type, color)
const BUILTIN: &[(&str, &str, &str, &str, ChartType, &str)] = &[
    (
        RD_EXPENDITURE,
        "R&D Expenditure Over Time",
        "R&D (% of GDP)",
        "Gross domestic expenditure on research and development as a share of GDP.",
        ChartType::Line,
        "#1f77b4",
    ),
    (
        JOURNAL_ARTICLES,
        "Scientific Journal Articles Over Time",
        "Number of Articles",
        "Scientific and engineering articles published in indexed journals.",
        ChartType::Bar,
        "#ff7f0e",
    ),
    (
        NONRESIDENT_PATENTS,
        "Nonresident Patent Applications Over Time",
        "Patent Applications",
        "Patent applications filed by applicants from abroad.",
        ChartType::Bar,
        "#2ca02c",
    ),
    (
        RESEARCHERS,
        "R&D Researchers Per Million People",
        "Researchers / Million People",
        "Professionals engaged in creating new knowledge, products or methods.",
        ChartType::Area,
        "#d62728",
    ),
    (
        TECHNICIANS,
        "R&D Technicians Per Million People",
        "Technicians / Million People",
        "Technical staff supporting research under the supervision of researchers.",
        ChartType::Area,
        "#9467bd",
    ),
    (
        HIGH_TECH_EXPORTS,
        "High-Tech Exports (% of Manufactured Exports)",
        "High-Tech Exports (%)",
        "Exports of products with high R&D intensity, such as aerospace and computers.",
        ChartType::Line,
        "#8c564b",
    ),
    (
        IP_PAYMENTS,
        "IP Usage Payments",
        "Payments (USD)",
        "Payments to non-residents for the authorized use of intellectual property.",
        ChartType::Scatter,
        "#e377c2",
    ),
    (
        IP_RECEIPTS,
        "IP Usage Receipts",
        "Receipts (USD)",
        "Receipts from non-residents for the authorized use of intellectual property.",
        ChartType::Scatter,
        "#17becf",
    ),
];

impl Default for IndicatorCatalog {
    fn default() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|&(name, title, unit, description, chart_type, color)| {
                (
                    name.to_string(),
                    IndicatorMeta {
                        display_title: title.to_string(),
                        unit: unit.to_string(),
                        description: description.to_string(),
                        chart_type,
                        color: color.to_string(),
                    },
                )
            })
            .collect();

        let kpis = vec![
            KpiDef {
                label: "R&D Expenditure (% of GDP)",
                indicator: RD_EXPENDITURE,
                format: KpiFormat::Percent,
            },
            KpiDef {
                label: "Sci. Journal Articles",
                indicator: JOURNAL_ARTICLES,
                format: KpiFormat::Integer,
            },
            KpiDef {
                label: "Nonresident Patents",
                indicator: NONRESIDENT_PATENTS,
                format: KpiFormat::Integer,
            },
        ];

        Self { entries, kpis }
    }
}

impl IndicatorCatalog {
    pub fn lookup(&self, name: &str) -> IndicatorMeta {
        self.entries
            .get(name)
            .cloned()
            .unwrap_or_else(|| IndicatorMeta::fallback(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn kpis(&self) -> &[KpiDef] {
        &self.kpis
    }
}
