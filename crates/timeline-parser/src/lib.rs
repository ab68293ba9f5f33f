//! # timeline-parser
//!
//! Input readers and record normalization for mermaid-timeline.
//!
//! This crate provides:
//! - CSV and Excel reading into raw rows (`read_csv`, `read_excel`, `parse_file`)
//! - Input format detection by file extension
//! - Record normalization from raw rows to typed `WorkItem`s
//!
//! ## Example
//!
//! ```rust
//! use timeline_parser::{normalize_rows, read_csv};
//!
//! let input = "WorkStream,WorkPackage,Start,WorkingDays\nEng,Design,2024-01-01,3\n";
//! let rows = read_csv(input.as_bytes()).unwrap();
//! let items = normalize_rows(&rows);
//!
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].as_ref().unwrap().working_days, Some(3));
//! ```

pub mod csv_input;
pub mod excel_input;
pub mod normalize;

pub use csv_input::read_csv;
pub use excel_input::read_excel;
pub use normalize::{normalize_row, normalize_rows, parse_date};

use thiserror::Error;
use timeline_core::{Column, RawRow};

/// Input reading error
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("CSV error{}: {message}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Csv { line: Option<usize>, message: String },

    #[error("Excel error in {path}: {message}")]
    Excel { path: String, message: String },

    #[error("Missing required columns: {}", format_columns(.0))]
    MissingColumns(Vec<Column>),

    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

fn format_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values (.csv)
    Csv,
    /// Excel workbook (.xlsx, .xls)
    Excel,
    /// Anything else
    Unknown,
}

/// Detect file format from extension
pub fn detect_format(path: &std::path::Path) -> FileFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("csv") => FileFormat::Csv,
        Some("xlsx" | "xls") => FileFormat::Excel,
        _ => FileFormat::Unknown,
    }
}

/// Read raw rows from a file path (format chosen by extension)
pub fn parse_file(path: &std::path::Path) -> Result<Vec<RawRow>, ParseError> {
    match detect_format(path) {
        FileFormat::Csv => {
            let file = std::fs::File::open(path).map_err(|e| ParseError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            read_csv(std::io::BufReader::new(file))
        }
        FileFormat::Excel => read_excel(path),
        FileFormat::Unknown => Err(ParseError::UnsupportedFormat(format!(
            "'{}' (expected a .csv, .xlsx or .xls file)",
            path.display()
        ))),
    }
}
