#![allow(dead_code)]

use datasweep::{convert, FileFormat, UploadedFile};
use polars::prelude::*;

/// CSV fixture with one exact duplicate row and missing values in a numeric
/// and a text column.
pub fn messy_csv_bytes() -> Vec<u8> {
    b"name,age,score\nalice,30,80\nbob,,90\nalice,30,80\ncarol,40,\n".to_vec()
}

pub fn messy_upload(name: &str) -> UploadedFile {
    UploadedFile::new(name, messy_csv_bytes())
}

pub fn sample_df() -> DataFrame {
    df!(
        "id" => &[1_i64, 2, 3],
        "label" => &["a", "b", "c"],
        "value" => &[1.5_f64, 2.5, 3.5]
    )
    .unwrap()
}

/// Build an XLSX upload by serializing a frame through the crate's own
/// Excel writer.
pub fn xlsx_upload(name: &str, df: &DataFrame) -> UploadedFile {
    let download = convert(df, FileFormat::Excel, name).unwrap();
    UploadedFile::new(name, download.bytes)
}
