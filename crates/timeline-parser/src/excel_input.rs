//! Excel timeline reader
//!
//! Reads the first worksheet of an `.xlsx` or `.xls` workbook. The first row
//! is the header and is matched exactly like a CSV header. Cells are turned
//! into the same text the CSV reader would see: date cells become
//! `YYYY-MM-DD`, whole numbers lose their `.0`.

use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use timeline_core::{RawRow, ISO_DATE_FORMAT};

use crate::csv_input::{check_required, map_headers, to_raw_row};
use crate::ParseError;

/// Read raw rows from the first sheet of a workbook
pub fn read_excel(path: &Path) -> Result<Vec<RawRow>, ParseError> {
    let excel_error = |message: String| ParseError::Excel {
        path: path.display().to_string(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| excel_error(e.to_string()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| excel_error("workbook has no sheets".into()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| excel_error(e.to_string()))?;
    tracing::debug!(sheet = %sheet, "reading first worksheet");

    let mut records = range.rows();
    let headers: Vec<String> = records
        .next()
        .map(|header| header.iter().map(cell_text).collect())
        .unwrap_or_default();
    let columns = map_headers(headers.iter().map(String::as_str));
    check_required(&columns)?;

    let mut rows = Vec::new();
    for (index, record) in records.enumerate() {
        let cells: Vec<String> = record.iter().map(cell_text).collect();
        if cells.iter().all(|cell| cell.is_empty()) {
            tracing::debug!(row = index, "skipping empty sheet row");
            continue;
        }
        rows.push(to_raw_row(cells.iter().map(String::as_str), &columns).at(index));
    }

    tracing::info!(rows = rows.len(), sheet = %sheet, "read Excel input");
    Ok(rows)
}

/// Cell value as the text a CSV export would carry
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Error(e) => {
            tracing::debug!(error = ?e, "error cell read as blank");
            String::new()
        }
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_text(*f),
        Data::Bool(b) => b.to_string(),
        other => match other.as_date() {
            Some(date) => date.format(ISO_DATE_FORMAT).to_string(),
            None => other.to_string(),
        },
    }
}

fn float_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
