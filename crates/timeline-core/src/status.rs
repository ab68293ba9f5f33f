//! Completion status of a work item
//!
//! Status is a pure function of the completion percentage:
//!
//! | Percent     | Status    | Diagram tag |
//! |-------------|-----------|-------------|
//! | 0           | `Pending` | (none)      |
//! | 1-99        | `Active`  | `active`    |
//! | 100 or more | `Done`    | `done`      |

use serde::{Deserialize, Serialize};

/// Status classification for a bar on the chart
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Not started
    #[default]
    Pending,
    /// Partially complete
    Active,
    /// Fully complete
    Done,
}

impl Status {
    /// Classify a completion percentage
    pub fn from_percent(pct: u8) -> Self {
        if pct >= 100 {
            Status::Done
        } else if pct > 0 {
            Status::Active
        } else {
            Status::Pending
        }
    }

    /// Diagram tag for this status; pending items are left unstyled
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Status::Pending => None,
            Status::Active => Some("active"),
            Status::Done => Some("done"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Active => "active",
            Status::Done => "done",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
