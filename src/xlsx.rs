//! Minimal single-sheet XLSX writer.
//!
//! An XLSX workbook is a zip archive of XML parts. This writer emits the
//! smallest set a reader needs: content types, package relationships, a
//! workbook with one sheet, and the sheet data itself. Strings are written as
//! inline strings (no shared-string table), numbers and booleans as native
//! cell types, and null cells are omitted from their row.

use std::io::{Cursor, Write};

use log::debug;
use polars::prelude::*;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer as XmlWriter;
use ::zip::write::SimpleFileOptions;
use ::zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// A concrete cell payload; `None` at the call sites means an omitted cell.
enum CellValue {
    Int(i64),
    Number(f64),
    Bool(bool),
    Text(String),
}

/// Serialize the table to a single-sheet workbook, header row first.
pub fn write_workbook(df: &DataFrame) -> Result<Vec<u8>> {
    debug!(
        "writing workbook: {} columns, {} rows",
        df.width(),
        df.height()
    );
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (path, body) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
    ] {
        zip.start_file(path, options)?;
        zip.write_all(body.as_bytes())?;
    }
    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    let sheet = sheet_xml(df)?;
    zip.write_all(&sheet)?;
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn sheet_xml(df: &DataFrame) -> Result<Vec<u8>> {
    let mut writer = XmlWriter::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute((
        "xmlns",
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
    ));
    writer.write_event(Event::Start(worksheet))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    let header: Vec<Option<CellValue>> = df
        .get_column_names()
        .iter()
        .map(|n| Some(CellValue::Text(n.to_string())))
        .collect();
    write_row(&mut writer, 1, &header)?;

    for row_idx in 0..df.height() {
        let cells: Vec<Option<CellValue>> = df
            .get_columns()
            .iter()
            .map(|column| Ok(cell_value(&column.get(row_idx)?)))
            .collect::<PolarsResult<_>>()?;
        write_row(&mut writer, row_idx + 2, &cells)?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner().into_inner())
}

fn cell_value(value: &AnyValue) -> Option<CellValue> {
    match value {
        AnyValue::Null => None,
        AnyValue::Boolean(b) => Some(CellValue::Bool(*b)),
        AnyValue::String(s) => Some(CellValue::Text((*s).to_string())),
        AnyValue::StringOwned(s) => Some(CellValue::Text(s.to_string())),
        AnyValue::Float64(f) => Some(CellValue::Number(*f)),
        AnyValue::Float32(f) => Some(CellValue::Number(*f as f64)),
        v if v.dtype().is_numeric() => v.extract::<i64>().map(CellValue::Int),
        v => Some(CellValue::Text(v.str_value().to_string())),
    }
}

fn write_row(
    writer: &mut XmlWriter<Cursor<Vec<u8>>>,
    row_number: usize,
    cells: &[Option<CellValue>],
) -> Result<()> {
    let mut row = BytesStart::new("row");
    row.push_attribute(("r", row_number.to_string().as_str()));
    writer.write_event(Event::Start(row))?;
    for (col_idx, cell) in cells.iter().enumerate() {
        if let Some(cell) = cell {
            let cell_ref = format!("{}{}", column_ref(col_idx), row_number);
            write_cell(writer, &cell_ref, cell)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new("row")))?;
    Ok(())
}

fn write_cell(
    writer: &mut XmlWriter<Cursor<Vec<u8>>>,
    cell_ref: &str,
    cell: &CellValue,
) -> Result<()> {
    let mut c = BytesStart::new("c");
    c.push_attribute(("r", cell_ref));
    match cell {
        CellValue::Int(i) => {
            writer.write_event(Event::Start(c))?;
            write_text_element(writer, "v", &i.to_string())?;
        }
        CellValue::Number(n) => {
            writer.write_event(Event::Start(c))?;
            write_text_element(writer, "v", &n.to_string())?;
        }
        CellValue::Bool(b) => {
            c.push_attribute(("t", "b"));
            writer.write_event(Event::Start(c))?;
            write_text_element(writer, "v", if *b { "1" } else { "0" })?;
        }
        CellValue::Text(s) => {
            c.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(c))?;
            writer.write_event(Event::Start(BytesStart::new("is")))?;
            write_text_element(writer, "t", s)?;
            writer.write_event(Event::End(BytesEnd::new("is")))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new("c")))?;
    Ok(())
}

fn write_text_element(
    writer: &mut XmlWriter<Cursor<Vec<u8>>>,
    tag: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Spreadsheet column reference for a 0-based index: A, B, .., Z, AA, AB, ..
fn column_ref(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII letters")
}
