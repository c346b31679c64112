use serde_json::Value;

use crate::{Error, Result};

/// An ordered time-series table as delivered by the health API: a set of
/// column labels plus data rows of string cells, newest row first.
///
/// Cells are kept as raw strings because the upstream routinely leaves the
/// newest rows unpopulated for some columns. A cell only counts as a value
/// when it parses as a base-10 integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SeriesTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Build a table from the API's JSON records, keeping `columns` order.
    /// Null or absent fields become empty (invalid) cells.
    pub fn from_records(records: &[Value], columns: &[&str]) -> Self {
        let mut table = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for record in records {
            let row = columns
                .iter()
                .map(|column| match record.get(column) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    _ => String::new(),
                })
                .collect();
            table.push_row(row);
        }
        table
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == field)
    }

    fn cell(&self, row: &[String], index: usize) -> Option<i64> {
        row.get(index).and_then(|cell| parse_int(cell))
    }

    /// The most recent settled value for `field`: the first data row, in
    /// existing order, whose cell holds a valid integer. `None` when the
    /// column is unknown or no row has a valid value.
    pub fn most_recent_valid(&self, field: &str) -> Option<i64> {
        let index = self.column_index(field)?;
        self.rows.iter().find_map(|row| self.cell(row, index))
    }

    /// Sum the `window` most recent valid integer values of `field`.
    ///
    /// Rows with invalid cells are skipped and do not count against the
    /// window. Running out of rows before the window fills is an
    /// `InsufficientData` error.
    pub fn window_sum(&self, field: &str, window: usize) -> Result<i64> {
        let index = self
            .column_index(field)
            .ok_or_else(|| Error::UnknownField(field.to_string()))?;

        let mut sum = 0i64;
        let mut found = 0usize;
        for row in &self.rows {
            if found == window {
                break;
            }
            if let Some(value) = self.cell(row, index) {
                sum += value;
                found += 1;
            }
        }

        if found < window {
            return Err(Error::InsufficientData {
                field: field.to_string(),
                needed: window,
                found,
            });
        }
        Ok(sum)
    }
}

fn parse_int(cell: &str) -> Option<i64> {
    cell.trim().parse().ok()
}
