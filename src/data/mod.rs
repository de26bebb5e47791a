/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  local .csv / https://…/.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse rows → IndicatorTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ IndicatorTable  │  Vec<IndicatorRecord>, indicator + year index
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year / indicator selection → projected table
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
