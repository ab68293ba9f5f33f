//! CSV timeline reader
//!
//! The first record is the header. Header cells are matched against the known
//! columns case-insensitively; unknown columns are ignored. Rows may be
//! shorter than the header.

use std::io::Read;

use csv::{ReaderBuilder, Trim};
use timeline_core::{Column, RawRow};

use crate::ParseError;

/// Read raw rows from CSV text
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRow>, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?.clone();
    let columns = map_headers(headers.iter());
    check_required(&columns)?;

    let mut rows = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_error)?;
        if record.iter().all(|cell| cell.is_empty()) {
            tracing::debug!(row = index, "skipping empty CSV record");
            continue;
        }
        rows.push(to_raw_row(record.iter(), &columns).at(index));
    }

    tracing::info!(rows = rows.len(), "read CSV input");
    Ok(rows)
}

/// Header position -> known column
pub(crate) fn map_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<Option<Column>> {
    headers.into_iter().map(Column::from_header).collect()
}

pub(crate) fn check_required(columns: &[Option<Column>]) -> Result<(), ParseError> {
    let missing: Vec<Column> = Column::REQUIRED
        .into_iter()
        .filter(|required| !columns.contains(&Some(*required)))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ParseError::MissingColumns(missing))
    }
}

/// Cells in header order -> raw row; cells under unknown headers are dropped
pub(crate) fn to_raw_row<'a>(
    cells: impl IntoIterator<Item = &'a str>,
    columns: &[Option<Column>],
) -> RawRow {
    let mut row = RawRow::new();
    for (cell, column) in cells.into_iter().zip(columns) {
        if let Some(column) = column {
            row.set(*column, cell);
        }
    }
    row
}

fn csv_error(err: csv::Error) -> ParseError {
    let line = err.position().map(|p| p.line() as usize);
    ParseError::Csv {
        line,
        message: err.to_string(),
    }
}
