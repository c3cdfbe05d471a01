//! Read-only rendering of the head of a table.

use polars::prelude::*;

use crate::error::Result;

/// Stringified head of a table, capped at a fixed number of rows (the
/// visible height of the host's preview pane).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
    pub truncated: bool,
}

/// Render up to `max_rows` rows. Null cells become empty strings.
pub fn preview(df: &DataFrame, max_rows: usize) -> Result<Preview> {
    let total_rows = df.height();
    let shown = total_rows.min(max_rows);
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let mut rows = Vec::with_capacity(shown);
    for row_idx in 0..shown {
        let mut row = Vec::with_capacity(columns.len());
        for column in df.get_columns() {
            row.push(cell_text(&column.get(row_idx)?));
        }
        rows.push(row);
    }
    Ok(Preview {
        columns,
        rows,
        total_rows,
        truncated: total_rows > max_rows,
    })
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        v => v.str_value().to_string(),
    }
}
