//! Status and duration resolution
//!
//! Every bar needs a concrete inclusive span. An explicit `End` is used as
//! given; otherwise the end is derived from `WorkingDays` on the calendar.

use chrono::NaiveDate;
use timeline_core::{Calendar, RowError, ScheduledItem, Status, WorkItem};

/// Resolve the inclusive end date of an item
pub fn resolve_end(item: &WorkItem, calendar: &Calendar) -> Result<NaiveDate, RowError> {
    let end = match (item.end, item.working_days) {
        (Some(end), _) => end,
        (None, Some(days)) if days > 0 => {
            calendar
                .end_date(item.start, days)
                .ok_or(RowError::InvalidDuration {
                    start: item.start,
                    working_days: days,
                })?
        }
        _ => return Err(RowError::MissingDuration),
    };
    check_span(item.start, end)?;
    Ok(end)
}

/// Reject spans that end before they start
pub fn check_span(start: NaiveDate, end: NaiveDate) -> Result<(), RowError> {
    if end < start {
        Err(RowError::EndBeforeStart { start, end })
    } else {
        Ok(())
    }
}

/// Resolve a bar item into its scheduled form
pub fn resolve_item(item: &WorkItem, calendar: &Calendar) -> Result<ScheduledItem, RowError> {
    let end = resolve_end(item, calendar)?;

    let scheduled = ScheduledItem {
        row: item.row,
        work_stream: item.work_stream.clone(),
        name: item.name.clone(),
        start: item.start,
        end,
        percent_complete: item.percent_complete,
        status: Status::from_percent(item.percent_complete),
        milestone_group: item.milestone_group.clone(),
        team: item.team.clone(),
        spoc: item.spoc.clone(),
    };
    tracing::debug!(
        row = scheduled.row,
        "resolved '{}' to {}..{} ({} days)",
        scheduled.name,
        scheduled.start,
        scheduled.end,
        scheduled.duration_days()
    );
    Ok(scheduled)
}
