//! Working-day arithmetic
//!
//! A working day is a weekday listed in `Calendar::working_days`
//! (Monday-Friday by default). Durations given in working days count both
//! the first and the last day, so a one-day task starts and ends on the same
//! date.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Working week definition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Working days (0 = Sunday, 6 = Saturday)
    pub working_days: Vec<u8>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            working_days: vec![1, 2, 3, 4, 5], // Mon-Fri
        }
    }
}

impl Calendar {
    /// Check if a date is a working day
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        let weekday = date.weekday().num_days_from_sunday() as u8;
        self.working_days.contains(&weekday)
    }

    /// Number of distinct working weekdays per week
    pub fn days_per_week(&self) -> u32 {
        (0..7u8).filter(|d| self.working_days.contains(d)).count() as u32
    }

    /// The given date if it is a working day, otherwise the next one.
    ///
    /// `None` when the result falls outside the representable date range.
    pub fn next_working_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        if self.days_per_week() == 0 {
            return Some(date);
        }
        let mut current = date;
        while !self.is_working_day(current) {
            current = current.checked_add_days(Days::new(1))?;
        }
        Some(current)
    }

    /// Advance `count` working days from `date`, skipping non-working days.
    ///
    /// Whole weeks are skipped arithmetically; only the final partial week is
    /// walked day by day. `None` when the result is out of range.
    pub fn add_working_days(&self, date: NaiveDate, count: u32) -> Option<NaiveDate> {
        let per_week = self.days_per_week();
        if per_week == 0 || count == 0 {
            return Some(date);
        }

        // Any 7 consecutive days hold exactly `per_week` working days
        let weeks = (count - 1) / per_week;
        let mut remaining = count - weeks * per_week;
        let mut current = date.checked_add_days(Days::new(u64::from(weeks) * 7))?;

        while remaining > 0 {
            current = current.checked_add_days(Days::new(1))?;
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }
        Some(current)
    }

    /// Last day of a task that starts on `start` and lasts `working_days`
    ///
    /// Counting begins at the first working day on or after `start`. A zero
    /// duration ends on `start` itself. `None` when the end date would fall
    /// outside the representable date range.
    pub fn end_date(&self, start: NaiveDate, working_days: u32) -> Option<NaiveDate> {
        if working_days == 0 {
            return Some(start);
        }
        let first = self.next_working_day(start)?;
        self.add_working_days(first, working_days - 1)
    }

    /// Number of working days in `start..=end`
    pub fn working_days_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        if end < start {
            return 0;
        }
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| self.is_working_day(*d))
            .count() as u32
    }
}
