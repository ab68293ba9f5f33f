//! # timeline-core
//!
//! Core domain model and traits for the mermaid-timeline generator.
//!
//! This crate provides:
//! - Input types: `RawRow`, `Column`
//! - Domain types: `WorkItem`, `ScheduledItem`, `Milestone`, `Section`, `Timeline`
//! - Working-day arithmetic: `Calendar`
//! - Status classification: `Status`
//! - Core traits: `ChartRenderer`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use timeline_core::{Status, WorkItem};
//!
//! let item = WorkItem::new(0, "Engineering", "Design", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
//!     .working_days(3)
//!     .complete(50)
//!     .group("Phase 1");
//!
//! assert_eq!(item.status(), Status::Active);
//! assert_eq!(item.milestone_group.as_deref(), Some("Phase 1"));
//! ```

pub mod calendar;
pub mod status;

pub use calendar::Calendar;
pub use status::Status;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Type Aliases & Constants
// ============================================================================

/// Zero-based index of a row in the input sequence
pub type RowIndex = usize;

/// Section name used for rows whose work stream cell is blank
pub const DEFAULT_WORK_STREAM: &str = "General Tasks";

/// Literal date layout used for diagram output (`YYYY-MM-DD`)
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Raw Input
// ============================================================================

/// The fixed set of columns understood in timeline input
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    WorkStream,
    WorkPackage,
    Start,
    End,
    WorkingDays,
    PercentComplete,
    IsMilestone,
    MilestoneGroup,
    Team,
    Spoc,
}

impl Column {
    /// Every known column, in canonical order
    pub const ALL: [Column; 10] = [
        Column::WorkStream,
        Column::WorkPackage,
        Column::Start,
        Column::End,
        Column::WorkingDays,
        Column::PercentComplete,
        Column::IsMilestone,
        Column::MilestoneGroup,
        Column::Team,
        Column::Spoc,
    ];

    /// Columns that must be present in the input header
    pub const REQUIRED: [Column; 3] = [Column::WorkStream, Column::WorkPackage, Column::Start];

    /// Header text for this column
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::WorkStream => "WorkStream",
            Column::WorkPackage => "WorkPackage",
            Column::Start => "Start",
            Column::End => "End",
            Column::WorkingDays => "WorkingDays",
            Column::PercentComplete => "PercentComplete",
            Column::IsMilestone => "IsMilestone",
            Column::MilestoneGroup => "MilestoneGroup",
            Column::Team => "Team",
            Column::Spoc => "SPOC",
        }
    }

    /// Match a header cell against the known columns (case-insensitive)
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(header))
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input row: raw cell text keyed by column
///
/// Blank cells and absent columns are the same thing to the normalizer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: BTreeMap<Column, String>,
    /// Data-row index in the source, when it differs from sequence position
    index: Option<RowIndex>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where this row sits in the source (builder pattern)
    pub fn at(mut self, index: RowIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Source data-row index, if the reader recorded one
    pub fn index(&self) -> Option<RowIndex> {
        self.index
    }

    /// Set a cell (builder pattern)
    pub fn cell(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a cell in place
    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells.insert(column, value.into());
    }

    /// Set a cell by header name. Returns false for unknown headers.
    pub fn set_by_header(&mut self, header: &str, value: impl Into<String>) -> bool {
        match Column::from_header(header) {
            Some(column) => {
                self.set(column, value);
                true
            }
            None => false,
        }
    }

    /// Trimmed cell text, or `None` when the cell is blank or absent
    pub fn get(&self, column: Column) -> Option<&str> {
        self.cells
            .get(&column)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

// ============================================================================
// Work Items
// ============================================================================

/// A normalized input row
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Input row this item came from
    pub row: RowIndex,
    /// Grouping key (diagram section)
    pub work_stream: String,
    /// Work package name
    pub name: String,
    /// First day of work
    pub start: NaiveDate,
    /// Last day of work, if given explicitly
    pub end: Option<NaiveDate>,
    /// Duration in Monday-Friday units; only used when `end` is absent
    pub working_days: Option<u32>,
    /// Completion percentage, 0-100
    pub percent_complete: u8,
    /// Rendered only as a milestone, never as a bar
    pub is_milestone: bool,
    /// Milestone group this item contributes to
    pub milestone_group: Option<String>,
    /// Owning team (informational)
    pub team: Option<String>,
    /// Single point of contact (informational)
    pub spoc: Option<String>,
}

impl WorkItem {
    pub fn new(
        row: RowIndex,
        work_stream: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
    ) -> Self {
        Self {
            row,
            work_stream: work_stream.into(),
            name: name.into(),
            start,
            end: None,
            working_days: None,
            percent_complete: 0,
            is_milestone: false,
            milestone_group: None,
            team: None,
            spoc: None,
        }
    }

    /// Set the explicit end date
    pub fn end(mut self, end: NaiveDate) -> Self {
        self.end = Some(end);
        self
    }

    /// Set the duration in working days
    pub fn working_days(mut self, days: u32) -> Self {
        self.working_days = Some(days);
        self
    }

    /// Set the completion percentage (clamped to 100)
    pub fn complete(mut self, pct: u8) -> Self {
        self.percent_complete = pct.min(100);
        self
    }

    /// Mark as milestone
    pub fn milestone(mut self) -> Self {
        self.is_milestone = true;
        self
    }

    /// Assign to a milestone group
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.milestone_group = Some(group.into());
        self
    }

    pub fn team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn spoc(mut self, spoc: impl Into<String>) -> Self {
        self.spoc = Some(spoc.into());
        self
    }

    /// Status derived from completion
    pub fn status(&self) -> Status {
        Status::from_percent(self.percent_complete)
    }

    /// Point-in-time date used when this item is a milestone
    pub fn milestone_date(&self) -> NaiveDate {
        self.end.unwrap_or(self.start)
    }
}

/// A work item with a concrete span and status, ready to be drawn as a bar
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledItem {
    pub row: RowIndex,
    pub work_stream: String,
    pub name: String,
    pub start: NaiveDate,
    /// Inclusive last day; never before `start`
    pub end: NaiveDate,
    pub percent_complete: u8,
    pub status: Status,
    pub milestone_group: Option<String>,
    pub team: Option<String>,
    pub spoc: Option<String>,
}

impl ScheduledItem {
    /// Calendar days covered, counting both ends
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Whether the item counts as fully complete
    pub fn is_complete(&self) -> bool {
        self.status == Status::Done
    }
}

// ============================================================================
// Milestones & Sections
// ============================================================================

/// How a milestone came to exist
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MilestoneKind {
    /// Flagged in the input via `IsMilestone`
    Explicit,
    /// Derived from a fully complete milestone group
    Grouped,
}

/// A zero-duration marker on the chart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Item name (explicit) or group identifier (grouped)
    pub name: String,
    pub date: NaiveDate,
    pub kind: MilestoneKind,
    /// Stream of the flagged item, or of the group's first member
    pub work_stream: String,
}

impl Milestone {
    pub fn explicit(name: impl Into<String>, date: NaiveDate, work_stream: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date,
            kind: MilestoneKind::Explicit,
            work_stream: work_stream.into(),
        }
    }

    pub fn grouped(name: impl Into<String>, date: NaiveDate, work_stream: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date,
            kind: MilestoneKind::Grouped,
            work_stream: work_stream.into(),
        }
    }
}

/// Bars belonging to one work stream, in input order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub work_stream: String,
    pub items: Vec<ScheduledItem>,
}

impl Section {
    pub fn new(work_stream: impl Into<String>) -> Self {
        Self {
            work_stream: work_stream.into(),
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A rejected input row and the reason it was rejected
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub row: RowIndex,
    pub error: RowError,
}

impl RowFailure {
    pub fn new(row: RowIndex, error: RowError) -> Self {
        Self { row, error }
    }
}

impl std::fmt::Display for RowFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}: {}", self.row, self.error)
    }
}

/// The fully resolved result of one generation run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Non-empty sections in first-seen stream order
    pub sections: Vec<Section>,
    /// Explicit milestones, then grouped milestones
    pub milestones: Vec<Milestone>,
    /// Rows that could not be used
    pub failures: Vec<RowFailure>,
}

impl Timeline {
    /// All bar items across sections, in emission order
    pub fn items(&self) -> impl Iterator<Item = &ScheduledItem> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    /// Find a section by work stream name
    pub fn section(&self, work_stream: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.work_stream == work_stream)
    }

    /// Find a milestone by name (first match)
    pub fn milestone(&self, name: &str) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.name == name)
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.milestones.is_empty()
    }

    /// Earliest and latest dates on the chart
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let starts = self
            .items()
            .map(|i| i.start)
            .chain(self.milestones.iter().map(|m| m.date));
        let ends = self
            .items()
            .map(|i| i.end)
            .chain(self.milestones.iter().map(|m| m.date));
        Some((starts.min()?, ends.max()?))
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Turns a resolved timeline into an output artifact
pub trait ChartRenderer {
    type Output;

    /// Render the timeline under the given chart title
    fn render(&self, timeline: &Timeline, title: &str) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Why a single row was rejected
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RowError {
    #[error("Missing required field: {column}")]
    MissingRequiredField { column: Column },

    #[error("Invalid date format in {column}: '{value}' (expected YYYY-MM-DD or DD.MM.YYYY)")]
    InvalidDateFormat { column: Column, value: String },

    #[error("Missing duration: neither End nor WorkingDays is set")]
    MissingDuration,

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("WorkingDays {working_days} from {start} runs past the last representable date")]
    InvalidDuration { start: NaiveDate, working_days: u32 },
}

impl RowError {
    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            RowError::MissingRequiredField { .. } => "E001",
            RowError::InvalidDateFormat { .. } => "E002",
            RowError::MissingDuration => "E003",
            RowError::EndBeforeStart { .. } => "E004",
            RowError::InvalidDuration { .. } => "E005",
        }
    }
}

/// Failure of a whole generation run
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("No valid data: {} of {total_rows} rows rejected", .failures.len())]
    NoValidData {
        total_rows: usize,
        failures: Vec<RowFailure>,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn column_from_header_is_case_insensitive() {
        assert_eq!(Column::from_header("workstream"), Some(Column::WorkStream));
        assert_eq!(Column::from_header(" PercentComplete "), Some(Column::PercentComplete));
        assert_eq!(Column::from_header("spoc"), Some(Column::Spoc));
        assert_eq!(Column::from_header("Owner"), None);
    }

    #[test]
    fn raw_row_blank_cells_read_as_missing() {
        let row = RawRow::new()
            .cell(Column::WorkPackage, "  Design ")
            .cell(Column::End, "   ");

        assert_eq!(row.get(Column::WorkPackage), Some("Design"));
        assert_eq!(row.get(Column::End), None);
        assert_eq!(row.get(Column::Start), None);
    }

    #[test]
    fn raw_row_set_by_header() {
        let mut row = RawRow::new();
        assert!(row.set_by_header("milestonegroup", "G1"));
        assert!(!row.set_by_header("Notes", "ignored"));
        assert_eq!(row.get(Column::MilestoneGroup), Some("G1"));
        assert_eq!(row.index(), None);
        assert_eq!(row.at(4).index(), Some(4));
    }

    #[test]
    fn work_item_builder() {
        let item = WorkItem::new(3, "Eng", "Build", date(2024, 1, 1))
            .end(date(2024, 1, 5))
            .complete(150)
            .group("G1")
            .team("Core")
            .spoc("Sam");

        assert_eq!(item.row, 3);
        assert_eq!(item.percent_complete, 100);
        assert_eq!(item.status(), Status::Done);
        assert_eq!(item.milestone_group.as_deref(), Some("G1"));
        assert_eq!(item.team.as_deref(), Some("Core"));
    }

    #[test]
    fn milestone_date_falls_back_to_start() {
        let item = WorkItem::new(0, "Eng", "Launch", date(2024, 2, 10)).milestone();
        assert_eq!(item.milestone_date(), date(2024, 2, 10));

        let item = item.end(date(2024, 2, 12));
        assert_eq!(item.milestone_date(), date(2024, 2, 12));
    }

    #[test]
    fn scheduled_item_duration_is_inclusive() {
        let item = ScheduledItem {
            row: 0,
            work_stream: "Eng".into(),
            name: "A".into(),
            start: date(2024, 1, 1),
            end: date(2024, 1, 1),
            percent_complete: 0,
            status: Status::Pending,
            milestone_group: None,
            team: None,
            spoc: None,
        };
        assert_eq!(item.duration_days(), 1);
        assert!(!item.is_complete());
    }

    #[test]
    fn timeline_date_range_spans_items_and_milestones() {
        let mut section = Section::new("Eng");
        section.items.push(ScheduledItem {
            row: 0,
            work_stream: "Eng".into(),
            name: "A".into(),
            start: date(2024, 1, 2),
            end: date(2024, 1, 5),
            percent_complete: 50,
            status: Status::Active,
            milestone_group: None,
            team: None,
            spoc: None,
        });
        let timeline = Timeline {
            sections: vec![section],
            milestones: vec![Milestone::explicit("Go", date(2024, 1, 9), "Eng")],
            failures: vec![],
        };

        assert_eq!(timeline.date_range(), Some((date(2024, 1, 2), date(2024, 1, 9))));
        assert!(timeline.section("Eng").is_some());
        assert_eq!(timeline.milestone("Go").map(|m| m.kind), Some(MilestoneKind::Explicit));
        assert!(Timeline::default().date_range().is_none());
    }

    #[test]
    fn row_error_display_and_codes() {
        let err = RowError::MissingRequiredField { column: Column::Start };
        assert_eq!(err.to_string(), "Missing required field: Start");
        assert_eq!(err.code(), "E001");

        let err = RowError::InvalidDateFormat {
            column: Column::End,
            value: "31/01/2024".into(),
        };
        assert!(err.to_string().contains("'31/01/2024'"));
        assert_eq!(RowError::MissingDuration.code(), "E003");

        let err = RowError::InvalidDuration {
            start: date(2024, 1, 1),
            working_days: u32::MAX,
        };
        assert_eq!(err.code(), "E005");
        assert!(err.to_string().contains("WorkingDays 4294967295 from 2024-01-01"));
    }

    #[test]
    fn no_valid_data_reports_counts() {
        let err = GenerateError::NoValidData {
            total_rows: 2,
            failures: vec![
                RowFailure::new(0, RowError::MissingDuration),
                RowFailure::new(1, RowError::MissingDuration),
            ],
        };
        assert_eq!(err.to_string(), "No valid data: 2 of 2 rows rejected");
    }
}
