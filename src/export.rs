use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::domain::TVError;
use crate::table::{Column as TableColumn, ColumnKind, Value};
use crate::view::{DatasetView, Record};

/// Writes the header and every filtered row of `view` as CSV.
pub fn write_csv<W: Write>(view: &DatasetView, writer: W) -> Result<usize, TVError> {
    let table = view.table().ok_or(TVError::NothingLoaded)?;
    let rows = view.filtered_rows();

    let columns: Vec<Column> = table
        .columns()
        .iter()
        .map(|c| to_polars_column(c, rows))
        .collect();
    let mut df = DataFrame::new(columns)?;

    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut df)?;
    Ok(rows.len())
}

/// Exports the filtered rows of `view` to a new CSV file at `path`.
pub fn export_csv(view: &DatasetView, path: &Path) -> Result<usize, TVError> {
    let file = File::create(path)?;
    let written = write_csv(view, BufWriter::new(file))?;
    info!("Exported {} records to {}", written, path.display());
    Ok(written)
}

/// Quotes a field if it contains whitespace or separators, doubling embedded quotes.
fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.chars().any(|c| c == '"');
    let needs_wrapping = needs_escaping || c.chars().any(|c| c.is_whitespace() || c == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping {
        out = format!("\"{out}\"");
    }
    out
}

/// The values of a record as a single CSV line, e.g. for the clipboard.
pub fn record_to_csv_line(record: &Record<'_>) -> String {
    record
        .fields()
        .iter()
        .map(|(_, v)| wrap_cell_content(&v.to_string()))
        .collect::<Vec<String>>()
        .join(",")
}

// Columns holding cells that do not fit their kind are written as text.
fn to_polars_column(column: &TableColumn, rows: &[usize]) -> Column {
    let name: PlSmallStr = column.name().into();
    let data = column.data();
    let kind = if rows.iter().all(|&r| column.kind().fits(&data[r])) {
        column.kind()
    } else {
        ColumnKind::Text
    };
    match kind {
        ColumnKind::Integer => {
            let values: Vec<Option<i64>> = rows
                .iter()
                .map(|&r| match &data[r] {
                    Value::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Column::new(name, values)
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = rows
                .iter()
                .map(|&r| match &data[r] {
                    Value::Float(x) => Some(*x),
                    Value::Integer(i) => Some(*i as f64),
                    _ => None,
                })
                .collect();
            Column::new(name, values)
        }
        ColumnKind::Text => {
            let values: Vec<Option<String>> = rows.iter().map(|&r| data[r].as_string()).collect();
            Column::new(name, values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Criterion;
    use crate::table::Table;

    fn view() -> DatasetView {
        let table = Table::from_rows(
            "rera",
            &["reraNo", "state", "units"],
            vec![
                vec!["A100".into(), "MH".into(), Value::Integer(10)],
                vec!["A200".into(), "KA".into(), Value::Null],
                vec!["B300".into(), "MH".into(), Value::Integer(7)],
            ],
        )
        .unwrap();
        let mut view = DatasetView::new();
        view.load(table);
        view
    }

    #[test]
    fn writes_filtered_rows_only() {
        let mut view = view();
        view.set_criterion("state", Some(Criterion::Equals("MH".to_string())));
        view.apply_filters();

        let mut buf = Vec::new();
        let written = write_csv(&view, &mut buf).unwrap();
        assert_eq!(written, 2);

        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["reraNo,state,units", "A100,MH,10", "B300,MH,7"]);
    }

    #[test]
    fn mixed_values_survive_export() {
        let table = Table::from_rows(
            "mixed",
            &["units", "pincode"],
            vec![
                vec![Value::Integer(1), Value::Integer(411001)],
                vec![Value::Float(2.5), "NA-pending".into()],
            ],
        )
        .unwrap();
        let mut view = DatasetView::new();
        view.load(table);

        let mut buf = Vec::new();
        write_csv(&view, &mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(",411001"));
        assert_eq!(lines[2], "2.5,NA-pending");
    }

    #[test]
    fn cells_outside_the_declared_kind_are_not_dropped() {
        let column = TableColumn::new(
            "units",
            ColumnKind::Integer,
            vec![Value::Integer(1), Value::Float(2.5)],
        );
        let table = Table::new("declared", vec![column]).unwrap();
        let mut view = DatasetView::new();
        view.load(table);

        let mut buf = Vec::new();
        write_csv(&view, &mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines, vec!["units", "1", "2.5"]);
    }

    #[test]
    fn nulls_become_empty_fields() {
        let view = view();
        let mut buf = Vec::new();
        write_csv(&view, &mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        assert!(csv.lines().any(|l| l == "A200,KA,"));
    }

    #[test]
    fn export_requires_a_table() {
        let view = DatasetView::new();
        let result = write_csv(&view, Vec::new());
        assert!(matches!(result, Err(TVError::NothingLoaded)));
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered.csv");
        let written = export_csv(&view(), &path).unwrap();
        assert_eq!(written, 3);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("reraNo,state,units"));
    }

    #[test]
    fn record_line_quotes_when_needed() {
        let table = Table::from_rows(
            "t",
            &["a", "b", "c", "d"],
            vec![vec![
                "plain".into(),
                "two words".into(),
                "say \"hi\"".into(),
                Value::Null,
            ]],
        )
        .unwrap();
        let mut view = DatasetView::new();
        view.load(table);
        let record = view.current_record().unwrap();
        assert_eq!(
            record_to_csv_line(&record),
            "plain,\"two words\",\"say \"\"hi\"\"\","
        );
    }
}
