use std::collections::BTreeSet;

use serde::Serialize;

use super::model::IndicatorTable;

// ---------------------------------------------------------------------------
// Filter selection: which years and indicators are ticked in the sidebar
// ---------------------------------------------------------------------------

/// Current sidebar selection.
///
/// "All" is represented by the full set. An empty set means the user
/// deselected everything and no rows pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    pub years: BTreeSet<i32>,
    pub indicators: BTreeSet<String>,
}

/// What the presentation layer should show for a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStatus {
    Active,
    NoYears,
    NoIndicators,
}

impl SelectionStatus {
    /// Informational message for an empty selection.
    pub fn message(self) -> Option<&'static str> {
        match self {
            SelectionStatus::Active => None,
            SelectionStatus::NoYears => Some("No years selected. Pick at least one year in the sidebar."),
            SelectionStatus::NoIndicators => {
                Some("No indicators selected. Pick at least one indicator in the sidebar.")
            }
        }
    }
}

impl FilterSelection {
    /// Everything selected.
    pub fn all(table: &IndicatorTable) -> Self {
        Self {
            years: table.years.clone(),
            indicators: table.indicators.iter().cloned().collect(),
        }
    }

    /// Nothing selected.
    pub fn none() -> Self {
        Self::default()
    }

    /// All indicators, years restricted to `from..=to`. A missing bound is
    /// open; bounds outside the data or `from > to` select no years.
    pub fn year_range(table: &IndicatorTable, from: Option<i32>, to: Option<i32>) -> Self {
        let years = table
            .years
            .iter()
            .copied()
            .filter(|&y| from.map_or(true, |lo| y >= lo) && to.map_or(true, |hi| y <= hi))
            .collect();
        Self {
            years,
            indicators: table.indicators.iter().cloned().collect(),
        }
    }

    pub fn status(&self) -> SelectionStatus {
        if self.years.is_empty() {
            SelectionStatus::NoYears
        } else if self.indicators.is_empty() {
            SelectionStatus::NoIndicators
        } else {
            SelectionStatus::Active
        }
    }

    pub fn toggle_year(&mut self, year: i32) {
        if !self.years.remove(&year) {
            self.years.insert(year);
        }
    }

    pub fn toggle_indicator(&mut self, indicator: &str) {
        if !self.indicators.remove(indicator) {
            self.indicators.insert(indicator.to_string());
        }
    }

    pub fn select_all_years(&mut self, table: &IndicatorTable) {
        self.years = table.years.clone();
    }

    pub fn select_no_years(&mut self) {
        self.years.clear();
    }

    pub fn select_all_indicators(&mut self, table: &IndicatorTable) {
        self.indicators = table.indicators.iter().cloned().collect();
    }

    pub fn select_no_indicators(&mut self) {
        self.indicators.clear();
    }

    /// Drop selected values that no longer exist in `table` (after a reload).
    pub fn retain_known(&mut self, table: &IndicatorTable) {
        self.years.retain(|y| table.years.contains(y));
        self.indicators
            .retain(|name| table.indicators.iter().any(|n| n == name));
    }

    pub fn passes(&self, year: i32, indicator: &str) -> bool {
        self.years.contains(&year) && self.indicators.contains(indicator)
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Return indices of records that pass the selection.
///
/// A record passes when its year is selected and its indicator is
/// selected. An empty set on either axis lets nothing through.
pub fn filtered_indices(table: &IndicatorTable, selection: &FilterSelection) -> Vec<usize> {
    if selection.status() != SelectionStatus::Active {
        return Vec::new();
    }
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.passes(rec.year, &rec.indicator))
        .map(|(i, _)| i)
        .collect()
}

/// Project the rows passing `selection` into a new table. The source table
/// is left untouched.
pub fn apply(table: &IndicatorTable, selection: &FilterSelection) -> IndicatorTable {
    let records = filtered_indices(table, selection)
        .into_iter()
        .map(|i| table.records[i].clone())
        .collect();
    IndicatorTable::from_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::IndicatorRecord;

    fn table() -> IndicatorTable {
        IndicatorTable::from_records(vec![
            IndicatorRecord::new("R&D", 2018, Some(0.5)),
            IndicatorRecord::new("R&D", 2019, Some(0.8)),
            IndicatorRecord::new("Patents", 2018, Some(10.0)),
            IndicatorRecord::new("Patents", 2020, None),
        ])
    }

    #[test]
    fn full_selection_is_identity() {
        let t = table();
        let filtered = apply(&t, &FilterSelection::all(&t));
        assert_eq!(filtered, t);
    }

    #[test]
    fn empty_indicator_set_yields_no_rows() {
        let t = table();
        let mut sel = FilterSelection::all(&t);
        sel.select_no_indicators();
        assert!(apply(&t, &sel).is_empty());
        assert_eq!(sel.status(), SelectionStatus::NoIndicators);
        assert!(sel.status().message().is_some());
    }

    #[test]
    fn empty_year_set_is_distinct_status() {
        let t = table();
        let mut sel = FilterSelection::all(&t);
        sel.select_no_years();
        assert_eq!(sel.status(), SelectionStatus::NoYears);
        assert!(filtered_indices(&t, &sel).is_empty());
    }

    #[test]
    fn filters_on_both_axes() {
        let t = table();
        let mut sel = FilterSelection::all(&t);
        sel.toggle_year(2018);
        sel.toggle_indicator("Patents");
        assert_eq!(filtered_indices(&t, &sel), vec![1]);

        sel.toggle_year(2018);
        assert_eq!(filtered_indices(&t, &sel), vec![0, 1]);
    }

    #[test]
    fn year_range_is_inclusive_and_numeric() {
        let t = table();
        let sel = FilterSelection::year_range(&t, Some(2019), Some(2020));
        assert_eq!(sel.years.iter().copied().collect::<Vec<_>>(), vec![2019, 2020]);
        assert_eq!(apply(&t, &sel).len(), 2);

        let open = FilterSelection::year_range(&t, None, None);
        assert_eq!(open, FilterSelection::all(&t));
    }

    #[test]
    fn reversed_or_out_of_data_range_selects_no_years() {
        let t = table();
        let reversed = FilterSelection::year_range(&t, Some(2020), Some(2019));
        assert!(reversed.years.is_empty());
        assert_eq!(reversed.status(), SelectionStatus::NoYears);

        let last = *t.years.last().unwrap();
        let first = *t.years.first().unwrap();
        assert!(FilterSelection::year_range(&t, Some(last + 10), None).years.is_empty());
        assert!(FilterSelection::year_range(&t, None, Some(first - 10)).years.is_empty());
    }

    #[test]
    fn retain_known_drops_stale_values() {
        let t = table();
        let mut sel = FilterSelection::all(&t);
        sel.years.insert(1990);
        sel.indicators.insert("Gone".into());
        sel.retain_known(&t);
        assert_eq!(sel, FilterSelection::all(&t));
    }

    #[test]
    fn apply_does_not_touch_source() {
        let t = table();
        let before = t.clone();
        let mut sel = FilterSelection::all(&t);
        sel.toggle_year(2019);
        let _ = apply(&t, &sel);
        assert_eq!(t, before);
    }
}
