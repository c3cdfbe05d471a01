//! Per-session table store: one current table per uploaded file name.

use std::collections::HashMap;

use log::debug;
use polars::prelude::*;

use crate::error::{Error, Result};

/// Holds the most recently cleaned table for each uploaded file name.
///
/// Registration inserts on first sight only; cleaning operations replace the
/// stored entry. After any cleaning operation the stored table is the single
/// source of truth for preview, chart, and export.
#[derive(Debug, Default)]
pub struct SessionTableStore {
    tables: HashMap<String, DataFrame>,
}

impl SessionTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `table` under `name` unless an entry already exists.
    ///
    /// Hosts with a re-render execution model call this on every pass;
    /// keeping the existing entry means a pass never regresses cleaning
    /// progress already applied to it.
    pub fn register(&mut self, name: &str, table: DataFrame) {
        if !self.tables.contains_key(name) {
            debug!("registering '{}' ({} rows)", name, table.height());
            self.tables.insert(name.to_string(), table);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Registered file names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Current table for `name`. The borrow must not be held across a later
    /// cleaning operation; fetch again afterwards.
    pub fn get(&self, name: &str) -> Result<&DataFrame> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Drop rows that duplicate an earlier row across all columns, keeping
    /// the first occurrence. Surviving row order is preserved.
    pub fn remove_duplicates(&mut self, name: &str) -> Result<()> {
        let df = self.get(name)?;
        let before = df.height();
        let deduped = df
            .clone()
            .lazy()
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;
        debug!(
            "'{}': removed {} duplicate rows",
            name,
            before - deduped.height()
        );
        self.tables.insert(name.to_string(), deduped);
        Ok(())
    }

    /// Replace nulls in every numeric column with that column's mean over its
    /// non-null values. Non-numeric columns are untouched, nulls included.
    ///
    /// A numeric column with no non-null values keeps its nulls: the mean of
    /// nothing is null, and a null fill is a no-op.
    pub fn fill_missing_numeric(&mut self, name: &str) -> Result<()> {
        let df = self.get(name)?;
        let fills: Vec<Expr> = df
            .get_columns()
            .iter()
            .filter(|c| c.dtype().is_numeric())
            .map(|c| col(c.name().clone()).fill_null(col(c.name().clone()).mean()))
            .collect();
        if fills.is_empty() {
            debug!("'{}': no numeric columns, nothing to fill", name);
            return Ok(());
        }
        let filled = df.clone().lazy().with_columns(fills).collect()?;
        self.tables.insert(name.to_string(), filled);
        Ok(())
    }
}
