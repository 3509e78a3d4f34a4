//! Weekly availability patterns and date-specific overrides.
//!
//! A resource's schedule is a recurring weekly pattern of time-of-day windows
//! plus date overrides. When one or more *active* overrides exist for a date,
//! they replace the weekly pattern for that date entirely — there is no merge.
//! Multiple windows per day represent split shifts (morning/evening with a
//! break between).
//!
//! Window consistency (no overlap within one day) is validated by the external
//! schedule editor at write time; this module tolerates overlapping windows
//! and renders them defensively rather than repairing them.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::ResourceId;

/// A contiguous time-of-day interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Windows with `end <= start` are tolerated but generate no slots.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }
}

/// One window of a resource's recurring weekly pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyWindow {
    pub resource_id: ResourceId,
    pub weekday: Weekday,
    pub window: TimeWindow,
    pub active: bool,
}

/// A date-specific window that supersedes the weekly pattern for its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub window: TimeWindow,
    pub active: bool,
}

/// The schedule inputs for one resource, as loaded from the schedule store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchedule {
    pub weekly: Vec<WeeklyWindow>,
    pub overrides: Vec<DateOverride>,
}

impl ResourceSchedule {
    /// The windows that apply to `date`: the active overrides for that date
    /// when any exist, otherwise the active weekly windows for the date's
    /// weekday. Sorted by start time.
    ///
    /// Inactive overrides are ignored entirely — they do not suppress the
    /// weekly pattern.
    #[must_use]
    pub fn effective_windows(&self, date: NaiveDate) -> Vec<TimeWindow> {
        let mut windows: Vec<TimeWindow> = self
            .overrides
            .iter()
            .filter(|o| o.active && o.date == date)
            .map(|o| o.window)
            .collect();

        if windows.is_empty() {
            let weekday = date.weekday();
            windows = self
                .weekly
                .iter()
                .filter(|w| w.active && w.weekday == weekday)
                .map(|w| w.window)
                .collect();
        }

        windows.sort_by_key(|w| (w.start, w.end));
        windows
    }
}
