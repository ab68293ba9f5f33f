//! Record normalization: raw rows to typed work items
//!
//! Two policies apply, and they are kept in separate functions:
//!
//! - **Strict** (`required_*`, `optional_date`): structural problems such as a
//!   missing start date or an unparseable date reject the row with a
//!   [`RowError`].
//! - **Lenient** (`lenient_*`): data-quality problems with a safe default
//!   (bad percentages, odd milestone flags, unusable working-day counts) are
//!   normalized silently.

use chrono::NaiveDate;
use timeline_core::{Column, RawRow, RowError, RowFailure, RowIndex, WorkItem, DEFAULT_WORK_STREAM};

/// Accepted textual date layouts, tried in order
pub const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d.%m.%Y"];

/// Tokens that mark a row as a milestone (compared case-insensitively)
pub const MILESTONE_TRUE_VALUES: [&str; 3] = ["true", "yes", "1"];

/// Normalize every row independently, keeping input order
///
/// Rows carrying a source index keep it; others are numbered by position.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<Result<WorkItem, RowFailure>> {
    rows.iter()
        .enumerate()
        .map(|(position, raw)| {
            let index = raw.index().unwrap_or(position);
            normalize_row(index, raw).map_err(|e| RowFailure::new(index, e))
        })
        .collect()
}

/// Normalize a single row
pub fn normalize_row(row: RowIndex, raw: &RawRow) -> Result<WorkItem, RowError> {
    // Strict path
    let name = required_text(raw, Column::WorkPackage)?;
    let start = required_date(raw, Column::Start)?;
    let end = optional_date(raw, Column::End)?;

    // Lenient path
    let work_stream = raw.get(Column::WorkStream).unwrap_or(DEFAULT_WORK_STREAM);
    let mut working_days = lenient_working_days(raw.get(Column::WorkingDays));
    let percent_complete = lenient_percent(raw.get(Column::PercentComplete));
    let is_milestone = lenient_flag(raw.get(Column::IsMilestone));

    if end.is_some() && working_days.is_some() {
        tracing::debug!(row, "both End and WorkingDays set; End takes precedence");
        working_days = None;
    }

    Ok(WorkItem {
        row,
        work_stream: work_stream.to_string(),
        name: name.to_string(),
        start,
        end,
        working_days,
        percent_complete,
        is_milestone,
        milestone_group: optional_text(raw, Column::MilestoneGroup),
        team: optional_text(raw, Column::Team),
        spoc: optional_text(raw, Column::Spoc),
    })
}

/// Parse a date in either accepted layout
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

// ============================================================================
// Strict path
// ============================================================================

fn required_text(raw: &RawRow, column: Column) -> Result<&str, RowError> {
    raw.get(column)
        .ok_or(RowError::MissingRequiredField { column })
}

fn required_date(raw: &RawRow, column: Column) -> Result<NaiveDate, RowError> {
    let value = required_text(raw, column)?;
    parse_date(value).ok_or_else(|| RowError::InvalidDateFormat {
        column,
        value: value.to_string(),
    })
}

fn optional_date(raw: &RawRow, column: Column) -> Result<Option<NaiveDate>, RowError> {
    match raw.get(column) {
        None => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| RowError::InvalidDateFormat {
                column,
                value: value.to_string(),
            }),
    }
}

fn optional_text(raw: &RawRow, column: Column) -> Option<String> {
    raw.get(column).map(str::to_string)
}

// ============================================================================
// Lenient path
// ============================================================================

/// Completion percentage: non-numeric reads as 0, numbers clamp to 0-100
///
/// Fractions truncate, except that any progress below 1 counts as 1 so a
/// started task is never shown as pending.
pub fn lenient_percent(value: Option<&str>) -> u8 {
    let Some(value) = value else {
        return 0;
    };
    match value.parse::<f64>() {
        Ok(pct) if pct > 0.0 && pct < 1.0 => 1,
        Ok(pct) if pct.is_finite() => pct.clamp(0.0, 100.0) as u8,
        _ => {
            tracing::debug!(value, "non-numeric PercentComplete treated as 0");
            0
        }
    }
}

/// Working-day count: non-numeric, zero or negative reads as absent
pub fn lenient_working_days(value: Option<&str>) -> Option<u32> {
    let days = value?.parse::<f64>().ok()?;
    if !days.is_finite() || days < 1.0 {
        tracing::debug!(days, "ignoring non-positive WorkingDays");
        return None;
    }
    Some(days.trunc() as u32)
}

/// Milestone flag: only the accepted true tokens count
pub fn lenient_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        MILESTONE_TRUE_VALUES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(v))
    })
}
