use std::collections::HashSet;
use std::fmt;

use crate::domain::TVError;

/// A single cell of a loaded table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String form used for all comparisons. Nulls have none.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::Null => None,
            v => Some(v.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing ".0" on whole numbers
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Null => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
}

impl ColumnKind {
    /// Whether `value` can be stored in a column of this kind without loss.
    pub fn fits(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) | (ColumnKind::Text, _) => true,
            (ColumnKind::Integer, Value::Integer(_)) => true,
            (ColumnKind::Float, Value::Integer(_) | Value::Float(_)) => true,
            _ => false,
        }
    }
}

// Narrowest kind holding every value; all-null columns are text.
fn infer_kind(values: &[Value]) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for value in values {
        kind = match (kind, value) {
            (_, Value::Null) => kind,
            (_, Value::Text(_)) => return ColumnKind::Text,
            (None | Some(ColumnKind::Integer), Value::Integer(_)) => Some(ColumnKind::Integer),
            (_, Value::Integer(_) | Value::Float(_)) => Some(ColumnKind::Float),
        };
    }
    kind.unwrap_or(ColumnKind::Text)
}

#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    data: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, data: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            kind,
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }

    pub fn as_string(&self) -> String {
        format!(
            "\"{}\", {:?}, # rows {}",
            self.name,
            self.kind,
            self.data.len()
        )
    }
}

/// Column-wise, immutable dataset. All columns have the same number of rows.
#[derive(Debug, Clone, Default)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    nrows: usize,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, TVError> {
        let nrows = columns.first().map(|c| c.data.len()).unwrap_or(0);

        let mut seen = HashSet::new();
        for column in columns.iter() {
            if !seen.insert(column.name.as_str()) {
                return Err(TVError::InvalidTable(format!(
                    "Duplicate column \"{}\"",
                    column.name
                )));
            }
            if column.data.len() != nrows {
                return Err(TVError::InvalidTable(format!(
                    "Column \"{}\" has {} rows, expected {}",
                    column.name,
                    column.data.len(),
                    nrows
                )));
            }
        }

        Ok(Table {
            name: name.into(),
            columns,
            nrows,
        })
    }

    /// Builds a table from row-major data. Every row must hold one value per column.
    /// Integer columns with any float become `Float`, any text makes a column `Text`.
    pub fn from_rows(
        name: impl Into<String>,
        column_names: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, TVError> {
        let mut data: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); column_names.len()];
        for (ridx, row) in rows.into_iter().enumerate() {
            if row.len() != column_names.len() {
                return Err(TVError::InvalidTable(format!(
                    "Row {} has {} values, expected {}",
                    ridx,
                    row.len(),
                    column_names.len()
                )));
            }
            for (cidx, value) in row.into_iter().enumerate() {
                data[cidx].push(value);
            }
        }

        let columns = column_names
            .iter()
            .zip(data)
            .map(|(name, values)| {
                let kind = infer_kind(&values);
                Column::new(*name, kind, values)
            })
            .collect();

        Table::new(name, columns)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncolumns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nrows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.data.get(row))
    }

    /// `(column name, value)` pairs of one row in column order.
    pub fn row(&self, row: usize) -> Vec<(&str, &Value)> {
        if row >= self.nrows {
            return Vec::new();
        }
        self.columns
            .iter()
            .map(|c| (c.name.as_str(), &c.data[row]))
            .collect()
    }
}
