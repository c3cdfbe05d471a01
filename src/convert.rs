//! Table serialization into one-shot download payloads.

use std::path::Path;

use log::debug;
use polars::prelude::*;

use crate::error::Result;
use crate::upload::FileFormat;
use crate::xlsx;

const CSV_MIME: &str = "text/csv";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A download payload: serialized bytes plus the name and content type the
/// host should attach to the transfer.
#[derive(Debug, Clone)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// Serialize `table` to `target`, deriving the download name from the
/// uploaded file's name with its extension replaced.
///
/// Pure with respect to the store: the table is written as-is, header row of
/// column names, no index column added.
pub fn convert(table: &DataFrame, target: FileFormat, original_name: &str) -> Result<Download> {
    let filename = replace_extension(original_name, target.extension());
    debug!(
        "converting '{}' to {} as '{}'",
        original_name,
        target.as_str(),
        filename
    );
    let (bytes, content_type) = match target {
        FileFormat::Csv => (write_csv_bytes(table)?, CSV_MIME),
        FileFormat::Excel => (xlsx::write_workbook(table)?, XLSX_MIME),
    };
    Ok(Download {
        bytes,
        filename,
        content_type,
    })
}

fn write_csv_bytes(table: &DataFrame) -> Result<Vec<u8>> {
    let mut df = table.clone();
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf).include_header(true).finish(&mut df)?;
    Ok(buf)
}

fn replace_extension(name: &str, ext: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    format!("{}.{}", stem, ext)
}
