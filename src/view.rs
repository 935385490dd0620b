use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::filter::{Criterion, FilterSet};
use crate::table::{Table, Value};

/// The record under the cursor.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a Table,
    row: usize,
    /// 1-based position within the filtered rows.
    pub position: usize,
    pub total: usize,
}

impl<'a> Record<'a> {
    /// Index of the record in the loaded table.
    pub fn row_index(&self) -> usize {
        self.row
    }

    pub fn fields(&self) -> Vec<(&'a str, &'a Value)> {
        self.table.row(self.row)
    }

    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table.value(self.row, column)
    }
}

/// Loaded table, staged filters and the cursor into the filtered rows.
///
/// Without a loaded table every operation except [`DatasetView::load`] is a no-op.
#[derive(Debug, Default)]
pub struct DatasetView {
    table: Option<Arc<Table>>,
    filters: FilterSet,
    rows: Arc<Vec<usize>>, // Mapping of filtered position to table row index
    cursor: usize,
}

impl DatasetView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, table: Table) {
        debug!(
            "Loading table \"{}\" with {} rows x {} columns",
            table.name(),
            table.nrows(),
            table.ncolumns()
        );
        self.table = Some(Arc::new(table));
        self.filters.clear();
        self.reset_rows();
    }

    pub fn set_criterion(&mut self, column: &str, criterion: Option<Criterion>) {
        trace!("Set criterion {column}: {criterion:?}");
        self.filters.set(column, criterion);
    }

    pub fn apply_filters(&mut self) {
        let Some(table) = self.table.as_ref() else {
            return;
        };

        // Criteria on columns the table does not have are not applicable
        let active: Vec<(&[Value], &Criterion)> = self
            .filters
            .iter()
            .filter_map(|(name, criterion)| table.column(name).map(|c| (c.data(), criterion)))
            .collect();

        let rows: Vec<usize> = (0..table.nrows())
            .filter(|&ridx| active.iter().all(|(data, c)| c.matches(&data[ridx])))
            .collect();

        debug!(
            "Applied {} of {} criteria, {} of {} rows match",
            active.len(),
            self.filters.len(),
            rows.len(),
            table.nrows()
        );
        self.rows = Arc::new(rows);
        self.cursor = 0;
    }

    pub fn clear_filters(&mut self) {
        if self.table.is_none() {
            return;
        }
        self.filters.clear();
        self.reset_rows();
    }

    pub fn next(&mut self) {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
        }
        trace!("Cursor {}/{}", self.cursor, self.rows.len());
    }

    pub fn previous(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        trace!("Cursor {}/{}", self.cursor, self.rows.len());
    }

    pub fn first(&mut self) {
        self.cursor = 0;
    }

    pub fn last(&mut self) {
        self.cursor = self.rows.len().saturating_sub(1);
    }

    pub fn current_record(&self) -> Option<Record<'_>> {
        let table = self.table.as_deref()?;
        let &row = self.rows.get(self.cursor)?;
        Some(Record {
            table,
            row,
            position: self.cursor + 1,
            total: self.rows.len(),
        })
    }

    /// Distinct non-null values of `column` in the loaded table, as sorted strings.
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let Some(column) = self.table.as_ref().and_then(|t| t.column(column)) else {
            return Vec::new();
        };
        column
            .data()
            .iter()
            .filter_map(Value::as_string)
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_deref()
    }

    pub fn columns(&self) -> Vec<&str> {
        self.table
            .as_ref()
            .map(|t| t.column_names())
            .unwrap_or_default()
    }

    pub fn criterion(&self, column: &str) -> Option<&Criterion> {
        self.filters.get(column)
    }

    pub fn criteria(&self) -> &FilterSet {
        &self.filters
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn filtered_len(&self) -> usize {
        self.rows.len()
    }

    /// Table row indices of the filtered rows, in table order.
    pub fn filtered_rows(&self) -> &[usize] {
        &self.rows
    }

    fn reset_rows(&mut self) {
        let nrows = self.table.as_ref().map(|t| t.nrows()).unwrap_or(0);
        self.rows = Arc::new((0..nrows).collect());
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rera_table() -> Table {
        Table::from_rows(
            "rera",
            &["reraNo", "state"],
            vec![
                vec!["A100".into(), "MH".into()],
                vec!["A200".into(), "KA".into()],
                vec!["B300".into(), "MH".into()],
            ],
        )
        .unwrap()
    }

    fn ids(view: &DatasetView) -> Vec<String> {
        let table = view.table().unwrap();
        view.filtered_rows()
            .iter()
            .map(|&r| table.value(r, "reraNo").unwrap().to_string())
            .collect()
    }

    fn current_id(view: &DatasetView) -> String {
        view.current_record()
            .and_then(|r| r.get("reraNo"))
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn empty_view_ignores_operations() {
        let mut view = DatasetView::new();
        view.set_criterion("state", Some(Criterion::Equals("MH".to_string())));
        view.apply_filters();
        view.next();
        view.previous();
        view.last();
        view.clear_filters();

        assert!(!view.is_loaded());
        assert!(view.current_record().is_none());
        assert!(view.distinct_values("state").is_empty());
        assert!(view.columns().is_empty());
        assert_eq!(view.cursor(), 0);
    }

    #[test]
    fn load_shows_full_table() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        assert_eq!(ids(&view), vec!["A100", "A200", "B300"]);

        let record = view.current_record().unwrap();
        assert_eq!(record.position, 1);
        assert_eq!(record.total, 3);
        assert_eq!(record.row_index(), 0);
    }

    #[test]
    fn equals_filter_and_paging() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        view.set_criterion("state", Some(Criterion::Equals("MH".to_string())));
        view.apply_filters();
        assert_eq!(ids(&view), vec!["A100", "B300"]);

        let record = view.current_record().unwrap();
        assert_eq!((record.position, record.total), (1, 2));
        assert_eq!(current_id(&view), "A100");

        view.next();
        let record = view.current_record().unwrap();
        assert_eq!((record.position, record.total), (2, 2));
        assert_eq!(current_id(&view), "B300");

        view.next();
        assert_eq!(view.cursor(), 1);
        assert_eq!(current_id(&view), "B300");
    }

    #[test]
    fn criteria_are_staged_until_applied() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        view.set_criterion("state", Some(Criterion::Equals("KA".to_string())));
        assert_eq!(view.filtered_len(), 3);
        view.apply_filters();
        assert_eq!(ids(&view), vec!["A200"]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        view.set_criterion("state", Some(Criterion::Equals("MH".to_string())));
        view.set_criterion("reraNo", Some(Criterion::Substring("b".to_string())));
        view.apply_filters();
        assert_eq!(ids(&view), vec!["B300"]);
    }

    #[test]
    fn unknown_column_criterion_is_skipped() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        view.set_criterion("nonexistentCol", Some(Criterion::Equals("x".to_string())));
        view.apply_filters();
        assert_eq!(view.filtered_len(), 3);
        assert!(view.criterion("nonexistentCol").is_some());
    }

    #[test]
    fn no_match_yields_empty_view() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        view.set_criterion("state", Some(Criterion::Equals("GJ".to_string())));
        view.apply_filters();
        assert_eq!(view.filtered_len(), 0);
        assert!(view.current_record().is_none());
        view.next();
        view.previous();
        view.last();
        assert!(view.current_record().is_none());
    }

    #[test]
    fn apply_resets_cursor() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        view.next();
        view.next();
        view.apply_filters();
        assert_eq!(view.cursor(), 0);
        view.next();
        view.apply_filters();
        assert_eq!(view.cursor(), 0);
        assert_eq!(ids(&view), vec!["A100", "A200", "B300"]);
    }

    #[test]
    fn clear_restores_full_table() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        view.set_criterion("state", Some(Criterion::Equals("KA".to_string())));
        view.apply_filters();
        view.clear_filters();
        assert!(view.criteria().is_empty());
        assert_eq!(view.cursor(), 0);
        assert_eq!(ids(&view), vec!["A100", "A200", "B300"]);
    }

    #[test]
    fn load_resets_filters() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        view.set_criterion("state", Some(Criterion::Equals("KA".to_string())));
        view.apply_filters();
        view.load(rera_table());
        assert!(view.criterion("state").is_none());
        assert_eq!(view.filtered_len(), 3);
    }

    #[test]
    fn navigation_saturates() {
        let mut view = DatasetView::new();
        view.load(rera_table());
        view.previous();
        assert_eq!(view.cursor(), 0);
        view.last();
        assert_eq!(view.cursor(), 2);
        view.next();
        assert_eq!(view.cursor(), 2);
        view.first();
        assert_eq!(view.cursor(), 0);
    }

    #[test]
    fn distinct_values_sorted_without_nulls() {
        let table = Table::from_rows(
            "t",
            &["state"],
            vec![
                vec!["MH".into()],
                vec![Value::Null],
                vec!["KA".into()],
                vec!["MH".into()],
            ],
        )
        .unwrap();
        let mut view = DatasetView::new();
        view.load(table);
        assert_eq!(view.distinct_values("state"), vec!["KA", "MH"]);
        assert!(view.distinct_values("district").is_empty());
    }
}
