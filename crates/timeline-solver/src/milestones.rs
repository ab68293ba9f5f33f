//! Milestone derivation
//!
//! Explicit milestones come from items flagged `IsMilestone`. Grouped
//! milestones appear once every bar item sharing a `MilestoneGroup` is fully
//! complete, dated at the latest end among the group's members.

use std::collections::HashMap;

use chrono::NaiveDate;
use timeline_core::{Milestone, ScheduledItem, WorkItem};

/// Completion summary for one milestone group
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupProgress {
    /// Group identifier
    pub name: String,
    /// Work stream of the first member seen
    pub work_stream: String,
    /// Number of bar items in the group
    pub members: usize,
    /// Members at 100%
    pub complete: usize,
    /// Latest end date among members
    pub finish: NaiveDate,
}

impl GroupProgress {
    /// Whether the group has reached full completion
    pub fn is_complete(&self) -> bool {
        self.members > 0 && self.complete == self.members
    }
}

/// One milestone per flagged item, at its end date (falling back to start)
pub fn explicit_milestones(flagged: &[WorkItem]) -> Vec<Milestone> {
    flagged
        .iter()
        .filter(|item| item.is_milestone)
        .map(|item| Milestone::explicit(&item.name, item.milestone_date(), &item.work_stream))
        .collect()
}

/// Per-group completion, in order of each group's first appearance
pub fn group_progress(items: &[ScheduledItem]) -> Vec<GroupProgress> {
    let mut groups: Vec<GroupProgress> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in items {
        let Some(group) = item.milestone_group.as_deref() else {
            continue;
        };
        let done = usize::from(item.is_complete());

        match index.get(group) {
            Some(&i) => {
                let progress = &mut groups[i];
                progress.members += 1;
                progress.complete += done;
                progress.finish = progress.finish.max(item.end);
            }
            None => {
                index.insert(group, groups.len());
                groups.push(GroupProgress {
                    name: group.to_string(),
                    work_stream: item.work_stream.clone(),
                    members: 1,
                    complete: done,
                    finish: item.end,
                });
            }
        }
    }

    groups
}

/// Milestones for every fully complete group
pub fn grouped_milestones(items: &[ScheduledItem]) -> Vec<Milestone> {
    group_progress(items)
        .into_iter()
        .filter_map(|group| {
            if group.is_complete() {
                Some(Milestone::grouped(group.name, group.finish, group.work_stream))
            } else {
                tracing::info!(
                    group = %group.name,
                    complete = group.complete,
                    members = group.members,
                    "milestone group not yet complete"
                );
                None
            }
        })
        .collect()
}

/// Groups named only by flagged milestone items, so they have no members
///
/// These produce nothing; they are reported for logging only.
pub fn unreferenced_groups(flagged: &[WorkItem], items: &[ScheduledItem]) -> Vec<String> {
    let mut unreferenced: Vec<String> = Vec::new();
    for group in flagged.iter().filter_map(|i| i.milestone_group.as_deref()) {
        let has_members = items
            .iter()
            .any(|i| i.milestone_group.as_deref() == Some(group));
        if !has_members && !unreferenced.iter().any(|g| g == group) {
            unreferenced.push(group.to_string());
        }
    }
    unreferenced
}

/// Explicit milestones followed by grouped milestones
pub fn derive_milestones(flagged: &[WorkItem], items: &[ScheduledItem]) -> Vec<Milestone> {
    for group in unreferenced_groups(flagged, items) {
        tracing::debug!(group = %group, "milestone group has no work packages; ignoring");
    }

    let mut milestones = explicit_milestones(flagged);
    milestones.extend(grouped_milestones(items));
    milestones
}
