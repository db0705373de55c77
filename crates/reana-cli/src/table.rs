//! Typed, column-oriented result table.
//!
//! Cells are typed and null-aware: a null renders as `-` in tables, as
//! `null` in JSON, and never compares equal to any string.

use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

/// One typed table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Text value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Absent value.
    Null,
}

impl Cell {
    /// Render the cell for table output; null becomes `-`.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Null => "-".to_owned(),
        }
    }

    /// Exact string equality against a filter literal; null matches nothing.
    #[must_use]
    pub fn matches(&self, literal: &str) -> bool {
        match self {
            Self::Null => false,
            other => other.render() == literal,
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Column-oriented table with a typed header.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given column names.
    #[must_use]
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|&h| h.to_owned()).collect(),
            columns: vec![Vec::new(); headers.len()],
        }
    }

    /// Column names, in order.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Append one row.
    ///
    /// # Errors
    ///
    /// Returns a format error when the arity does not match the header.
    pub fn append_row(&mut self, row: Vec<Cell>) -> Result<(), CliError> {
        if row.len() != self.headers.len() {
            return Err(CliError::Format(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.headers.len()
            )));
        }
        for (column, cell) in self.columns.iter_mut().zip(row) {
            column.push(cell);
        }
        Ok(())
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of one column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.column_index(name).map(|index| self.columns[index].as_slice())
    }

    /// Project onto the named columns, in the given order.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing the available columns when a
    /// requested column does not exist.
    pub fn select(&self, names: &[String]) -> Result<Self, CliError> {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            match self.column_index(name) {
                Some(index) => indices.push(index),
                None => {
                    return Err(CliError::Validation(format!(
                        "Format option '{name}' is not valid. Available columns are: {}",
                        self.headers.join(", ")
                    )));
                }
            }
        }
        Ok(Self {
            headers: names.to_vec(),
            columns: indices.iter().map(|&index| self.columns[index].clone()).collect(),
        })
    }

    /// Keep only the rows whose cell in `column` satisfies the predicate.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the column does not exist.
    pub fn filter_rows(
        &mut self,
        column: &str,
        predicate: impl Fn(&Cell) -> bool,
    ) -> Result<(), CliError> {
        let index = self.column_index(column).ok_or_else(|| {
            CliError::Validation(format!(
                "Format option '{column}' is not valid. Available columns are: {}",
                self.headers.join(", ")
            ))
        })?;
        let keep: Vec<bool> = self.columns[index].iter().map(&predicate).collect();
        for cells in &mut self.columns {
            let mut mask = keep.iter();
            cells.retain(|_| *mask.next().unwrap_or(&false));
        }
        Ok(())
    }

    /// Sort rows by the key extracted from the named column.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the column does not exist; callers
    /// that want a non-fatal warning check the header first.
    pub fn sort_by_key<K: Ord>(
        &mut self,
        column: &str,
        descending: bool,
        key: impl Fn(&Cell) -> K,
    ) -> Result<(), CliError> {
        let index = self.column_index(column).ok_or_else(|| {
            CliError::Validation(format!("column '{column}' does not exist"))
        })?;
        let mut order: Vec<usize> = (0..self.row_count()).collect();
        order.sort_by_key(|&row| key(&self.columns[index][row]));
        if descending {
            order.reverse();
        }
        for cells in &mut self.columns {
            *cells = order.iter().map(|&row| cells[row].clone()).collect();
        }
        Ok(())
    }

    /// Render to a 2D string matrix; null cells become `-`.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        (0..self.row_count())
            .map(|row| self.columns.iter().map(|cells| cells[row].render()).collect())
            .collect()
    }

    /// Project to JSON rows; null cells become JSON `null`.
    #[must_use]
    pub fn to_json_rows(&self) -> Vec<Value> {
        (0..self.row_count())
            .map(|row| {
                let mut object = serde_json::Map::new();
                for (header, cells) in self.headers.iter().zip(&self.columns) {
                    let value = serde_json::to_value(&cells[row]).unwrap_or(Value::Null);
                    object.insert(header.clone(), value);
                }
                Value::Object(object)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(&["name", "run_number", "status"]);
        table
            .append_row(vec!["one".into(), "1".into(), "running".into()])
            .expect("row");
        table
            .append_row(vec!["two".into(), "2".into(), Cell::Null])
            .expect("row");
        table
    }

    #[test]
    fn append_row_checks_arity() {
        let mut table = Table::new(&["a", "b"]);
        let err = table.append_row(vec!["only".into()]);
        assert!(err.is_err());
    }

    #[test]
    fn null_renders_as_dash_and_serializes_as_null() {
        let table = sample();
        let rows = table.to_rows();
        assert_eq!(rows[1][2], "-");
        let json = table.to_json_rows();
        assert_eq!(json[1]["status"], Value::Null);
    }

    #[test]
    fn null_never_matches_a_filter_literal() {
        assert!(!Cell::Null.matches("-"));
        assert!(!Cell::Null.matches(""));
        assert!(Cell::Str("running".into()).matches("running"));
        assert!(Cell::Int(3).matches("3"));
    }

    #[test]
    fn select_reorders_columns() {
        let table = sample();
        let selected = table
            .select(&["status".into(), "name".into()])
            .expect("select");
        assert_eq!(selected.headers(), ["status", "name"]);
        assert_eq!(selected.to_rows()[0], vec!["running", "one"]);
    }

    #[test]
    fn select_unknown_column_lists_available() {
        let table = sample();
        let err = table.select(&["bogus".into()]).expect_err("must fail");
        let text = err.to_string();
        assert!(text.contains("bogus"));
        assert!(text.contains("name, run_number, status"));
    }

    #[test]
    fn filter_rows_keeps_matching_rows() {
        let mut table = sample();
        table
            .filter_rows("status", |cell| cell.matches("running"))
            .expect("filter");
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.to_rows()[0][0], "one");
    }

    #[test]
    fn sort_reorders_every_column() {
        let mut table = Table::new(&["name", "n"]);
        table.append_row(vec!["b".into(), Cell::Int(2)]).expect("row");
        table.append_row(vec!["a".into(), Cell::Int(1)]).expect("row");
        table
            .sort_by_key("n", false, |cell| match cell {
                Cell::Int(i) => *i,
                _ => i64::MIN,
            })
            .expect("sort");
        assert_eq!(table.to_rows()[0], vec!["a", "1"]);
        assert_eq!(table.to_rows()[1], vec!["b", "2"]);
    }

    #[test]
    fn sort_descending_reverses_order() {
        let mut table = Table::new(&["n"]);
        for value in [1_i64, 3, 2] {
            table.append_row(vec![Cell::Int(value)]).expect("row");
        }
        table
            .sort_by_key("n", true, |cell| match cell {
                Cell::Int(i) => *i,
                _ => i64::MIN,
            })
            .expect("sort");
        assert_eq!(
            table.to_rows().iter().map(|r| r[0].clone()).collect::<Vec<_>>(),
            ["3", "2", "1"]
        );
    }
}
