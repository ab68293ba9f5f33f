//! MermaidJS Gantt chart renderer
//!
//! Generates Gantt charts in MermaidJS format, renderable by `mmdc` or any
//! Markdown host with Mermaid support.
//!
//! ## Example Output
//!
//! ```text
//! gantt
//!     title Project Plan
//!     dateFormat YYYY-MM-DD
//!     axisFormat %d.%m
//!     inclusiveEndDates
//!
//!     section Engineering
//!     Design :done, design, 2024-01-01, 2024-01-03
//!     Build :active, build, 2024-01-04, 2024-01-10
//!
//!     section Milestones
//!     Go Live :milestone, go_live, 2024-01-10, 0d
//! ```

use std::collections::HashSet;

use chrono::NaiveDate;
use timeline_core::{
    ChartRenderer, Milestone, RenderError, ScheduledItem, Timeline, DEFAULT_WORK_STREAM,
    ISO_DATE_FORMAT,
};

/// Words Mermaid reads as task metadata when they lead the field list
const RESERVED_IDS: [&str; 6] = ["active", "after", "crit", "done", "milestone", "until"];

/// MermaidJS Gantt chart renderer
#[derive(Clone, Debug)]
pub struct MermaidRenderer {
    /// Whether to tag bars with `done`/`active`
    pub show_status: bool,
    /// Axis tick format (d3 time format)
    pub axis_format: String,
    /// Grey out weekends (emits `excludes weekends`)
    pub exclude_weekends: bool,
    /// Label of the trailing section that holds milestones
    pub milestone_section: String,
}

impl Default for MermaidRenderer {
    fn default() -> Self {
        Self {
            show_status: true,
            axis_format: "%d.%m".into(),
            exclude_weekends: false,
            milestone_section: "Milestones".into(),
        }
    }
}

impl MermaidRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable done/active tags
    pub fn no_status(mut self) -> Self {
        self.show_status = false;
        self
    }

    /// Set custom axis format
    pub fn axis_format(mut self, format: impl Into<String>) -> Self {
        self.axis_format = format.into();
        self
    }

    /// Exclude weekends (use excludes directive)
    pub fn exclude_weekends(mut self) -> Self {
        self.exclude_weekends = true;
        self
    }

    /// Set the label of the milestone section
    pub fn milestone_section(mut self, label: impl Into<String>) -> Self {
        self.milestone_section = label.into();
        self
    }

    /// Sanitize display text for Mermaid (escape special characters)
    pub fn sanitize_name(name: &str) -> String {
        // Mermaid is sensitive to colons and special chars in task names
        name.replace(':', "-")
            .replace(';', "-")
            .replace('#', "")
            .replace('\n', " ")
            .replace('\r', "")
            .trim()
            .to_string()
    }

    /// Create a valid Mermaid task ID from a name
    ///
    /// IDs that would be read as task metadata keywords (`done`, `crit`,
    /// `after`, ...) get the same `t_` prefix as IDs starting with a digit.
    pub fn make_id(name: &str) -> String {
        // Mermaid IDs must be alphanumeric with underscores
        let id: String = name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();

        if id.is_empty()
            || id.starts_with(|c: char| c.is_ascii_digit())
            || RESERVED_IDS.contains(&id.as_str())
        {
            format!("t_{}", id)
        } else {
            id
        }
    }

    /// Display label, falling back to the task ID when nothing printable is left
    fn label(name: &str, id: &str) -> String {
        let label = Self::sanitize_name(name);
        if label.is_empty() {
            id.to_string()
        } else {
            label
        }
    }

    fn format_date(date: NaiveDate) -> String {
        date.format(ISO_DATE_FORMAT).to_string()
    }

    /// Format a bar line
    fn format_item_line(&self, item: &ScheduledItem, ids: &mut IdAllocator) -> String {
        let mut parts = Vec::new();

        if self.show_status {
            if let Some(tag) = item.status.tag() {
                parts.push(tag.to_string());
            }
        }
        let id = ids.allocate(&item.name);
        let label = Self::label(&item.name, &id);
        parts.push(id);
        parts.push(Self::format_date(item.start));
        parts.push(Self::format_date(item.end));

        format!("{} :{}", label, parts.join(", "))
    }

    /// Format a milestone line
    fn format_milestone_line(&self, milestone: &Milestone, ids: &mut IdAllocator) -> String {
        let id = ids.allocate(&milestone.name);
        format!(
            "{} :milestone, {}, {}, 0d",
            Self::label(&milestone.name, &id),
            id,
            Self::format_date(milestone.date)
        )
    }
}

impl ChartRenderer for MermaidRenderer {
    type Output = String;

    fn render(&self, timeline: &Timeline, title: &str) -> Result<String, RenderError> {
        if timeline.is_empty() {
            return Err(RenderError::InvalidData("No items to render".into()));
        }

        let mut output = String::new();
        let mut ids = IdAllocator::default();

        // Header
        output.push_str("gantt\n");
        output.push_str(&format!("    title {}\n", Self::sanitize_name(title)));
        output.push_str("    dateFormat YYYY-MM-DD\n");
        output.push_str(&format!("    axisFormat {}\n", self.axis_format));
        output.push_str("    inclusiveEndDates\n");

        if self.exclude_weekends {
            output.push_str("    excludes weekends\n");
        }

        for section in timeline.sections.iter().filter(|s| !s.is_empty()) {
            output.push('\n');
            output.push_str(&format!(
                "    section {}\n",
                Self::label(&section.work_stream, DEFAULT_WORK_STREAM)
            ));
            for item in &section.items {
                output.push_str(&format!("    {}\n", self.format_item_line(item, &mut ids)));
            }
        }

        if !timeline.milestones.is_empty() {
            output.push('\n');
            output.push_str(&format!(
                "    section {}\n",
                Self::sanitize_name(&self.milestone_section)
            ));
            for milestone in &timeline.milestones {
                output.push_str(&format!(
                    "    {}\n",
                    self.format_milestone_line(milestone, &mut ids)
                ));
            }
        }

        Ok(output)
    }
}

/// Hands out unique task IDs, suffixing `_2`, `_3`, ... on collision
#[derive(Debug, Default)]
struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    fn allocate(&mut self, name: &str) -> String {
        let base = MermaidRenderer::make_id(name);
        if self.used.insert(base.clone()) {
            return base;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.used.insert(candidate.clone()) {
                tracing::debug!(name, id = %candidate, "disambiguated colliding task id");
                return candidate;
            }
            n += 1;
        }
    }
}
