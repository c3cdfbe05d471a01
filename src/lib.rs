//! Session-scoped tabular data cleaning and CSV/XLSX conversion.
//!
//! A host UI hands uploaded file bytes to a [`Session`]; the session parses
//! them, registers each table in its [`SessionTableStore`] on first sight,
//! applies cleaning commands against the stored tables, and produces
//! previews, bar charts, and download payloads from the cleaned state.
//!
//! The command surface is decoupled from any rendering loop. Hosts that
//! re-execute their whole script per user interaction can replay uploads and
//! commands freely: registration is idempotent and cleaning operations
//! converge.

pub mod chart;
pub mod config;
pub mod convert;
pub mod error;
pub mod preview;
pub mod store;
pub mod upload;
mod xlsx;

pub use chart::{
    bar_chart_data, numeric_columns, render_bar_chart, validate_selection, ChartData, ChartSeries,
    SelectionCheck,
};
pub use config::{ChartConfig, DisplayConfig, SessionConfig};
pub use convert::{convert, Download};
pub use error::{Error, Result};
pub use preview::Preview;
pub use store::SessionTableStore;
pub use upload::{FileFormat, UploadedFile};

use log::warn;
use polars::prelude::DataFrame;

/// One interaction against the session, decoupled from any render loop.
#[derive(Debug, Clone)]
pub enum Command {
    RegisterFile(UploadedFile),
    RemoveDuplicates(String),
    FillMissing(String),
    Convert(String, FileFormat),
}

/// What a dispatched command produced.
#[derive(Debug)]
pub enum CommandOutcome {
    /// File registered, or already present (registration never overwrites).
    Registered { name: String },
    /// A cleaning operation ran against the named table.
    Cleaned { name: String },
    /// A download payload, ready to offer to the user.
    Converted(Download),
}

/// Chart output: either a rendered document or an advisory nudge about the
/// column selection.
#[derive(Debug)]
pub enum ChartOutput {
    Svg(String),
    Warning(&'static str),
}

/// Result of processing one file of an upload batch.
#[derive(Debug)]
pub struct UploadReport {
    pub name: String,
    pub size_bytes: u64,
    /// Detected format, or why the file was skipped.
    pub result: Result<FileFormat>,
}

impl UploadReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// One user session: configuration plus the table store. Single-threaded
/// and synchronous; every operation completes before the next command is
/// processed.
#[derive(Default)]
pub struct Session {
    config: SessionConfig,
    store: SessionTableStore,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            store: SessionTableStore::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionTableStore {
        &self.store
    }

    /// Process an upload batch sequentially, in upload order. A file that
    /// fails format detection or parsing is reported and skipped; it never
    /// aborts the rest of the batch.
    pub fn upload(&mut self, files: &[UploadedFile]) -> Vec<UploadReport> {
        files
            .iter()
            .map(|file| {
                let result = self.register_file(file);
                if let Err(e) = &result {
                    warn!("skipping '{}': {}", file.name, e);
                }
                UploadReport {
                    name: file.name.clone(),
                    size_bytes: file.size_bytes(),
                    result,
                }
            })
            .collect()
    }

    fn register_file(&mut self, file: &UploadedFile) -> Result<FileFormat> {
        let format = file.format()?;
        if !self.store.contains(&file.name) {
            let table = file.parse()?;
            self.store.register(&file.name, table);
        }
        Ok(format)
    }

    /// Dispatch one command against the store.
    pub fn dispatch(&mut self, command: Command) -> Result<CommandOutcome> {
        match command {
            Command::RegisterFile(file) => {
                self.register_file(&file)?;
                Ok(CommandOutcome::Registered { name: file.name })
            }
            Command::RemoveDuplicates(name) => {
                self.store.remove_duplicates(&name)?;
                Ok(CommandOutcome::Cleaned { name })
            }
            Command::FillMissing(name) => {
                self.store.fill_missing_numeric(&name)?;
                Ok(CommandOutcome::Cleaned { name })
            }
            Command::Convert(name, target) => {
                let table = self.store.get(&name)?;
                let download = convert::convert(table, target, &name)?;
                Ok(CommandOutcome::Converted(download))
            }
        }
    }

    /// Current (cleaned) table for `name`.
    pub fn table(&self, name: &str) -> Result<&DataFrame> {
        self.store.get(name)
    }

    /// Preview of the current cleaned state, row cap from config.
    pub fn preview(&self, name: &str) -> Result<Preview> {
        preview::preview(self.store.get(name)?, self.config.display.preview_rows)
    }

    /// Numeric columns selectable for charting. Reads the cleaned table, so
    /// the selectable set always reflects cleaning already applied.
    pub fn numeric_columns(&self, name: &str) -> Result<Vec<String>> {
        Ok(chart::numeric_columns(self.store.get(name)?))
    }

    pub fn chart_data(&self, name: &str, columns: &[String]) -> Result<ChartData> {
        chart::bar_chart_data(self.store.get(name)?, columns, self.config.chart.row_limit)
    }

    /// Validate the selection and render. A selection warning short-circuits
    /// before any data is touched.
    pub fn render_chart(&self, name: &str, columns: &[String]) -> Result<ChartOutput> {
        match chart::validate_selection(columns) {
            SelectionCheck::Warning(msg) => Ok(ChartOutput::Warning(msg)),
            SelectionCheck::Ready => {
                let data = self.chart_data(name, columns)?;
                let svg = chart::render_bar_chart(
                    &data,
                    self.config.chart.width,
                    self.config.chart.height,
                )?;
                Ok(ChartOutput::Svg(svg))
            }
        }
    }
}
