//! End-to-end resolution tests: raw rows to a resolved timeline

use chrono::{Datelike, NaiveDate, Weekday};
use pretty_assertions::assert_eq;
use timeline_core::{Calendar, Column, MilestoneKind, RawRow, RowError, Status};
use timeline_solver::TimelineBuilder;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn row(stream: &str, name: &str, start: &str) -> RawRow {
    RawRow::new()
        .cell(Column::WorkStream, stream)
        .cell(Column::WorkPackage, name)
        .cell(Column::Start, start)
}

fn grouped_pair(a_percent: &str) -> Vec<RawRow> {
    vec![
        row("Eng", "A", "2024-01-01")
            .cell(Column::End, "")
            .cell(Column::WorkingDays, "3")
            .cell(Column::PercentComplete, a_percent)
            .cell(Column::IsMilestone, "false")
            .cell(Column::MilestoneGroup, "G1"),
        row("Eng", "B", "2024-01-01")
            .cell(Column::End, "")
            .cell(Column::WorkingDays, "3")
            .cell(Column::PercentComplete, "100")
            .cell(Column::IsMilestone, "false")
            .cell(Column::MilestoneGroup, "G1"),
    ]
}

// ============================================================================
// Worked examples
// ============================================================================

#[test]
fn incomplete_group_spans_and_no_milestone() {
    let timeline = TimelineBuilder::new().build(&grouped_pair("50")).unwrap();

    let items: Vec<_> = timeline.items().collect();
    assert_eq!(items.len(), 2);
    for item in &items {
        assert_eq!(item.start, date(2024, 1, 1));
        assert_eq!(item.end, date(2024, 1, 3));
    }
    assert_eq!(items[0].status, Status::Active);
    assert_eq!(items[1].status, Status::Done);
    assert!(timeline.milestones.is_empty());
}

#[test]
fn complete_group_emits_grouped_milestone() {
    let timeline = TimelineBuilder::new().build(&grouped_pair("100")).unwrap();

    assert_eq!(timeline.milestones.len(), 1);
    let milestone = &timeline.milestones[0];
    assert_eq!(milestone.name, "G1");
    assert_eq!(milestone.date, date(2024, 1, 3));
    assert_eq!(milestone.kind, MilestoneKind::Grouped);
}

#[test]
fn explicit_milestone_without_end() {
    let rows = vec![
        row("Eng", "Build", "2024-02-01").cell(Column::End, "2024-02-09"),
        row("Eng", "Review", "2024-02-10")
            .cell(Column::End, "")
            .cell(Column::IsMilestone, "true"),
    ];
    let timeline = TimelineBuilder::new().build(&rows).unwrap();

    assert_eq!(timeline.milestones.len(), 1);
    assert_eq!(timeline.milestones[0].name, "Review");
    assert_eq!(timeline.milestones[0].date, date(2024, 2, 10));
    assert_eq!(timeline.milestones[0].kind, MilestoneKind::Explicit);

    let names: Vec<_> = timeline.items().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Build"]);
}

#[test]
fn empty_start_is_recorded_for_its_row() {
    let rows = vec![
        row("Eng", "Good", "2024-01-01").cell(Column::End, "2024-01-02"),
        row("Eng", "No Start", ""),
    ];
    let timeline = TimelineBuilder::new().build(&rows).unwrap();

    assert_eq!(timeline.items().count(), 1);
    assert_eq!(timeline.failures.len(), 1);
    assert_eq!(timeline.failures[0].row, 1);
    assert_eq!(
        timeline.failures[0].error,
        RowError::MissingRequiredField { column: Column::Start }
    );
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn start_never_after_end() {
    let mut rows = Vec::new();
    for (i, start) in ["2024-01-01", "2024-01-06", "07.01.2024", "2024-03-29"].iter().enumerate() {
        for days in 1..=12 {
            rows.push(
                row("WS", &format!("wd-{}-{}", i, days), start)
                    .cell(Column::WorkingDays, days.to_string()),
            );
        }
    }
    rows.push(row("WS", "explicit", "2024-01-01").cell(Column::End, "2024-01-01"));

    let timeline = TimelineBuilder::new().build(&rows).unwrap();
    assert!(timeline.failures.is_empty());
    for item in timeline.items() {
        assert!(item.start <= item.end, "{} has start after end", item.name);
    }
}

#[test]
fn derived_ends_are_weekdays_with_exact_count() {
    let calendar = Calendar::default();
    let mut rows = Vec::new();
    for offset in 0..7 {
        let start = date(2024, 1, 1 + offset);
        for days in 1..=10u32 {
            rows.push(
                row("WS", &format!("{}-{}", offset, days), &start.to_string())
                    .cell(Column::WorkingDays, days.to_string()),
            );
        }
    }

    let timeline = TimelineBuilder::new().build(&rows).unwrap();
    for item in timeline.items() {
        let expected: u32 = item.name.split('-').nth(1).unwrap().parse().unwrap();
        assert!(!matches!(item.end.weekday(), Weekday::Sat | Weekday::Sun));
        assert_eq!(calendar.working_days_between(item.start, item.end), expected);
    }
}

#[test]
fn status_follows_percent_with_clamping() {
    let cases = [
        ("0", Status::Pending),
        ("", Status::Pending),
        ("abc", Status::Pending),
        ("-5", Status::Pending),
        ("1", Status::Active),
        ("99", Status::Active),
        ("100", Status::Done),
        ("250", Status::Done),
    ];
    let rows: Vec<_> = cases
        .iter()
        .enumerate()
        .map(|(i, (pct, _))| {
            row("WS", &format!("t{}", i), "2024-01-01")
                .cell(Column::End, "2024-01-02")
                .cell(Column::PercentComplete, *pct)
        })
        .collect();

    let timeline = TimelineBuilder::new().build(&rows).unwrap();
    let statuses: Vec<_> = timeline.items().map(|i| i.status).collect();
    let expected: Vec<_> = cases.iter().map(|(_, s)| *s).collect();
    assert_eq!(statuses, expected);
}

#[test]
fn section_order_is_deterministic() {
    let rows = vec![
        row("Stream B", "b1", "2024-01-01").cell(Column::End, "2024-01-02"),
        row("Stream A", "a1", "2024-01-01").cell(Column::End, "2024-01-02"),
        row("", "loose", "2024-01-01").cell(Column::End, "2024-01-02"),
        row("Stream B", "b2", "2024-01-01").cell(Column::End, "2024-01-02"),
    ];

    let first = TimelineBuilder::new().build(&rows).unwrap();
    let second = TimelineBuilder::new().build(&rows).unwrap();
    assert_eq!(first, second);

    let names: Vec<_> = first.sections.iter().map(|s| s.work_stream.as_str()).collect();
    assert_eq!(names, vec!["Stream B", "Stream A", "General Tasks"]);
}

#[test]
fn stream_of_only_milestones_has_no_section() {
    let rows = vec![
        row("Eng", "Build", "2024-01-01").cell(Column::End, "2024-01-05"),
        row("Gates", "Kickoff", "2024-01-01").cell(Column::IsMilestone, "yes"),
        row("Gates", "Launch", "2024-01-05").cell(Column::IsMilestone, "1"),
    ];
    let timeline = TimelineBuilder::new().build(&rows).unwrap();

    assert!(timeline.section("Gates").is_none());
    assert_eq!(timeline.sections.len(), 1);
    assert_eq!(timeline.milestones.len(), 2);
}

#[test]
fn missing_duration_recorded_but_run_continues() {
    let rows = vec![
        row("WS1", "No Duration", "2024-01-01"),
        row("WS1", "Fine", "2024-01-01").cell(Column::WorkingDays, "2"),
    ];
    let timeline = TimelineBuilder::new().build(&rows).unwrap();

    assert_eq!(timeline.failures.len(), 1);
    assert_eq!(timeline.failures[0].error, RowError::MissingDuration);
    assert_eq!(timeline.items().next().map(|i| i.end), Some(date(2024, 1, 2)));
}

#[test]
fn milestone_members_do_not_count_toward_groups() {
    let rows = vec![
        row("Eng", "A", "2024-01-01")
            .cell(Column::End, "2024-01-03")
            .cell(Column::PercentComplete, "100")
            .cell(Column::MilestoneGroup, "G1"),
        row("Eng", "Flag", "2024-01-09")
            .cell(Column::IsMilestone, "true")
            .cell(Column::PercentComplete, "0")
            .cell(Column::MilestoneGroup, "G1"),
    ];
    let timeline = TimelineBuilder::new().build(&rows).unwrap();

    let grouped: Vec<_> = timeline
        .milestones
        .iter()
        .filter(|m| m.kind == MilestoneKind::Grouped)
        .collect();
    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped[0].date, date(2024, 1, 3));
}

#[test]
fn huge_working_days_fail_only_their_row() {
    let rows = vec![
        row("WS", "Forever", "2024-01-01").cell(Column::WorkingDays, "100000000"),
        row("WS", "Exponent", "2024-01-01").cell(Column::WorkingDays, "1e12"),
        row("WS", "Fine", "2024-01-01").cell(Column::WorkingDays, "2"),
    ];
    let timeline = TimelineBuilder::new().build(&rows).unwrap();

    let codes: Vec<_> = timeline
        .failures
        .iter()
        .map(|f| (f.row, f.error.code()))
        .collect();
    assert_eq!(codes, vec![(0, "E005"), (1, "E005")]);
    assert_eq!(timeline.items().map(|i| i.end).collect::<Vec<_>>(), vec![date(2024, 1, 2)]);
}
