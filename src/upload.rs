//! Uploaded files and byte-level parsing into tables.
//!
//! Uploads arrive as raw byte buffers from the host; the extension on the
//! file name decides the parser. Only `.csv` and `.xlsx` are recognized, any
//! other extension is rejected for that file alone.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use log::debug;
use polars::prelude::*;

use crate::error::{Error, Result};

/// Recognized upload (and conversion target) formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
}

impl FileFormat {
    pub const ALL: [Self; 2] = [Self::Csv, Self::Excel];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
        }
    }

    /// Parse a conversion-target label as presented to the user.
    pub fn from_label(label: &str) -> Result<Self> {
        match label.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            other => Err(Error::UnsupportedFormat(format!(
                "conversion target '{}'",
                other
            ))),
        }
    }

    /// Strict, case-insensitive match of a file name's extension against the
    /// recognized set.
    pub fn from_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("xlsx") => Ok(Self::Excel),
            Some(other) => Err(Error::UnsupportedFormat(format!(
                ".{} (expected .csv or .xlsx)",
                other
            ))),
            None => Err(Error::UnsupportedFormat(format!(
                "'{}' has no file extension",
                name
            ))),
        }
    }
}

/// One uploaded file: name (the session-unique key), and raw byte content.
/// Immutable once constructed.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn format(&self) -> Result<FileFormat> {
        FileFormat::from_name(&self.name)
    }

    /// Parse the raw bytes according to the file extension.
    pub fn parse(&self) -> Result<DataFrame> {
        let format = self.format()?;
        debug!(
            "parsing '{}' as {} ({} bytes)",
            self.name,
            format.as_str(),
            self.bytes.len()
        );
        match format {
            FileFormat::Csv => read_csv_bytes(&self.bytes),
            FileFormat::Excel => read_excel_bytes(&self.bytes),
        }
    }
}

/// Eager CSV read from an in-memory buffer, header row and type inference on.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    let df = CsvReader::new(Cursor::new(bytes.to_vec()))
        .with_options(CsvReadOptions::default())
        .finish()?;
    Ok(df)
}

/// Inferred column type for Excel data. Prefers Int64 for whole-number
/// floats; a single string cell makes the whole column text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExcelColType {
    Int64,
    Float64,
    Boolean,
    Utf8,
}

/// Eager read of the first worksheet of an XLSX workbook from an in-memory
/// buffer. The first row is the header; empty header cells get positional
/// `column_N` names.
pub fn read_excel_bytes(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| Error::Excel(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Excel("workbook has no worksheets".to_string()))?
        .map_err(|e| Error::Excel(e.to_string()))?;
    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    if rows.is_empty() {
        return Ok(DataFrame::new(vec![])?);
    }
    let headers: Vec<String> = rows[0]
        .iter()
        .map(|c| calamine::DataType::as_string(c).unwrap_or_else(|| c.to_string()))
        .collect();
    let mut columns = Vec::with_capacity(headers.len());
    for (col_idx, header) in headers.iter().enumerate() {
        let cells: Vec<Option<&Data>> = rows[1..].iter().map(|row| row.get(col_idx)).collect();
        let name = if header.is_empty() {
            format!("column_{}", col_idx + 1)
        } else {
            header.clone()
        };
        let series = excel_column_to_series(name.as_str(), &cells, excel_infer_column_type(&cells));
        columns.push(series.into());
    }
    Ok(DataFrame::new(columns)?)
}

fn excel_infer_column_type(cells: &[Option<&Data>]) -> ExcelColType {
    use calamine::DataType as CalamineTrait;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    for cell in cells.iter().flatten() {
        if CalamineTrait::is_string(*cell) || CalamineTrait::is_datetime_iso(*cell) {
            return ExcelColType::Utf8;
        }
        // Excel serial datetimes surface as their numeric value
        if CalamineTrait::is_float(*cell) || CalamineTrait::is_datetime(*cell) {
            has_float = true;
        }
        if CalamineTrait::is_int(*cell) {
            has_int = true;
        }
        if CalamineTrait::is_bool(*cell) {
            has_bool = true;
        }
    }
    if has_float {
        let all_whole = cells.iter().flatten().all(|cell| {
            cell.as_f64()
                .is_none_or(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
        });
        if all_whole {
            ExcelColType::Int64
        } else {
            ExcelColType::Float64
        }
    } else if has_int {
        ExcelColType::Int64
    } else if has_bool {
        ExcelColType::Boolean
    } else {
        ExcelColType::Utf8
    }
}

/// Build a Polars Series from a column of calamine cells using the inferred
/// type. Cells that do not coerce (and missing cells) become nulls.
fn excel_column_to_series(name: &str, cells: &[Option<&Data>], col_type: ExcelColType) -> Series {
    use calamine::DataType as CalamineTrait;
    match col_type {
        ExcelColType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_i64()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Float64 => {
            let v: Vec<Option<f64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_f64()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Boolean => {
            let v: Vec<Option<bool>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.get_bool()))
                .collect();
            Series::new(name.into(), v)
        }
        ExcelColType::Utf8 => {
            let v: Vec<Option<String>> = cells
                .iter()
                .map(|c| {
                    c.and_then(|cell| {
                        if CalamineTrait::is_empty(cell) {
                            None
                        } else {
                            cell.as_string()
                        }
                    })
                })
                .collect();
            Series::new(name.into(), v)
        }
    }
}
