//! # timeline-solver
//!
//! Turns raw timeline rows into a resolved [`Timeline`].
//!
//! This crate provides:
//! - Duration resolution (explicit end dates or working-day counts)
//! - Status classification
//! - Explicit and grouped milestone derivation
//! - Section organization by work stream
//!
//! Rows that cannot be used are recorded in [`Timeline::failures`] and never
//! stop the run. The run fails only when no row survives.
//!
//! ## Example
//!
//! ```rust
//! use timeline_core::{Column, RawRow};
//! use timeline_solver::TimelineBuilder;
//!
//! let rows = vec![
//!     RawRow::new()
//!         .cell(Column::WorkStream, "Eng")
//!         .cell(Column::WorkPackage, "Design")
//!         .cell(Column::Start, "2024-01-01")
//!         .cell(Column::WorkingDays, "3"),
//! ];
//!
//! let timeline = TimelineBuilder::new().build(&rows).unwrap();
//! assert_eq!(timeline.sections[0].items[0].end.to_string(), "2024-01-03");
//! ```

pub mod milestones;
pub mod resolve;
pub mod sections;

pub use milestones::{derive_milestones, group_progress, GroupProgress};
pub use resolve::resolve_item;
pub use sections::organize_sections;

use timeline_core::{Calendar, GenerateError, RawRow, RowFailure, Timeline, WorkItem};
use timeline_parser::normalize_rows;

/// Builds a [`Timeline`] from input rows
#[derive(Clone, Debug, Default)]
pub struct TimelineBuilder {
    /// Working week used to derive end dates from working-day counts
    pub calendar: Calendar,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom working week
    pub fn calendar(mut self, calendar: Calendar) -> Self {
        self.calendar = calendar;
        self
    }

    /// Normalize and resolve raw rows
    pub fn build(&self, rows: &[RawRow]) -> Result<Timeline, GenerateError> {
        self.build_from_items(rows.len(), normalize_rows(rows))
    }

    /// Resolve rows that have already been normalized
    pub fn build_from_items(
        &self,
        total_rows: usize,
        normalized: Vec<Result<WorkItem, RowFailure>>,
    ) -> Result<Timeline, GenerateError> {
        let mut failures = Vec::new();
        let mut flagged = Vec::new();
        let mut scheduled = Vec::new();

        for result in normalized {
            let item = match result {
                Ok(item) => item,
                Err(failure) => {
                    failures.push(failure);
                    continue;
                }
            };

            if item.is_milestone {
                // Milestones only need a date, not a duration
                let span = item
                    .end
                    .map_or(Ok(()), |end| resolve::check_span(item.start, end));
                match span {
                    Ok(()) => flagged.push(item),
                    Err(e) => failures.push(RowFailure::new(item.row, e)),
                }
            } else {
                match resolve_item(&item, &self.calendar) {
                    Ok(s) => scheduled.push(s),
                    Err(e) => failures.push(RowFailure::new(item.row, e)),
                }
            }
        }

        for failure in &failures {
            tracing::warn!(row = failure.row, code = failure.error.code(), "{}", failure.error);
        }

        if flagged.is_empty() && scheduled.is_empty() {
            return Err(GenerateError::NoValidData {
                total_rows,
                failures,
            });
        }

        let milestones = derive_milestones(&flagged, &scheduled);
        let sections = organize_sections(scheduled);

        tracing::info!(
            sections = sections.len(),
            milestones = milestones.len(),
            rejected = failures.len(),
            "timeline resolved"
        );

        Ok(Timeline {
            sections,
            milestones,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use timeline_core::{Column, RowError};

    #[test]
    fn builder_creation() {
        let builder = TimelineBuilder::new();
        assert_eq!(builder.calendar, Calendar::default());
    }

    #[test]
    fn empty_input_has_no_valid_data() {
        let err = TimelineBuilder::new().build(&[]).unwrap_err();
        match err {
            GenerateError::NoValidData { total_rows, failures } => {
                assert_eq!(total_rows, 0);
                assert!(failures.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn all_rows_rejected_has_no_valid_data() {
        let rows = vec![RawRow::new()
            .cell(Column::WorkStream, "WS1")
            .cell(Column::WorkPackage, "Task Bad Date")
            .cell(Column::Start, "invalid-date")
            .cell(Column::End, "2024-01-01")];

        match TimelineBuilder::new().build(&rows).unwrap_err() {
            GenerateError::NoValidData { total_rows, failures } => {
                assert_eq!(total_rows, 1);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].error.code(), "E002");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn milestone_without_duration_is_valid() {
        let rows = vec![RawRow::new()
            .cell(Column::WorkStream, "Milestones")
            .cell(Column::WorkPackage, "M2")
            .cell(Column::Start, "2024-01-12")
            .cell(Column::IsMilestone, "true")];

        let timeline = TimelineBuilder::new().build(&rows).unwrap();
        assert!(timeline.sections.is_empty());
        assert_eq!(timeline.milestones.len(), 1);
        assert!(timeline.failures.is_empty());
    }

    #[test]
    fn milestone_ending_before_start_is_rejected() {
        let rows = vec![
            RawRow::new()
                .cell(Column::WorkStream, "WS1")
                .cell(Column::WorkPackage, "Backwards")
                .cell(Column::Start, "2024-01-12")
                .cell(Column::End, "2024-01-10")
                .cell(Column::IsMilestone, "yes"),
            RawRow::new()
                .cell(Column::WorkStream, "WS1")
                .cell(Column::WorkPackage, "Fine")
                .cell(Column::Start, "2024-01-12")
                .cell(Column::End, "2024-01-12"),
        ];

        let timeline = TimelineBuilder::new().build(&rows).unwrap();
        assert!(timeline.milestones.is_empty());
        assert_eq!(timeline.failures.len(), 1);
        assert!(matches!(
            timeline.failures[0].error,
            RowError::EndBeforeStart { .. }
        ));
    }
}
