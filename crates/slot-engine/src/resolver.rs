//! Availability resolution — turning schedules, bookings, and "now" into
//! per-day slot grids and month summaries.
//!
//! Resolution is a pure function of its explicit inputs. Callers (or the
//! async shell around this crate) fetch the schedule and the ledger rows,
//! then hand everything over; nothing is cached here, so a grid can never go
//! stale relative to the ledger that produced it.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::schedule::ResourceSchedule;
use crate::slots::{minute_of_day, slot_starts, Granularity};
use crate::types::{Booking, BookingId, ResourceId};

/// Computed status of a single slot.
///
/// A slot whose start time has passed is `Past` regardless of occupancy:
/// nothing about it is actionable any more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlotStatus {
    Free,
    Past,
    /// Occupied by an active booking. `head` marks the slot matching the
    /// booking's start time; the follow-on slots of a longer booking carry
    /// the same id with `head == false`, which is all a renderer needs to
    /// reconstruct the merged block.
    Booked { booking: BookingId, head: bool },
}

/// One derived (resource, date, start-time) unit of a day grid.
///
/// Slots are never persisted; they are regenerated from the stores plus the
/// current instant on every resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    /// Index of the availability window this slot came from, so renderers
    /// can draw a divider between split shifts.
    pub block: usize,
    pub status: SlotStatus,
}

impl Slot {
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.status == SlotStatus::Free
    }

    #[must_use]
    pub fn is_past(&self) -> bool {
        self.status == SlotStatus::Past
    }

    #[must_use]
    pub const fn is_booked(&self) -> bool {
        matches!(self.status, SlotStatus::Booked { .. })
    }
}

/// Day-level summary, derived from the non-past slots only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayStatus {
    /// No availability windows apply to this date.
    NoSchedule,
    /// Windows exist but every slot start has already passed — nothing is
    /// actionable. Applies to earlier dates and to an exhausted "today"
    /// alike.
    Past,
    /// At least one non-past slot exists and none of them are free.
    FullyBooked,
    /// At least one non-past slot is free and none are booked.
    Available,
    /// A mix of free and booked non-past slots.
    PartiallyBooked,
}

/// The resolved grid for one date: slot list plus day-level status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub status: DayStatus,
    /// Ordered by (start time, resource).
    pub slots: Vec<Slot>,
}

impl DaySlots {
    /// The distinct resources that contributed slots, in slot order.
    ///
    /// A single-element result tells the caller the day behaves as
    /// single-resource even under an all-resources query.
    #[must_use]
    pub fn resources(&self) -> Vec<ResourceId> {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for slot in &self.slots {
            if seen.insert(slot.resource_id) {
                out.push(slot.resource_id);
            }
        }
        out
    }

    /// The free slots of the day, in order.
    pub fn free_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|s| s.is_free())
    }
}

/// One resource's inputs to resolution: its schedule and its known bookings.
///
/// The booking slice may be a superset of the date under resolution (for
/// example a whole month); occupancy only ever matches bookings on the slot's
/// own date because bookings cannot span midnight.
#[derive(Debug, Clone, Copy)]
pub struct ResourceView<'a> {
    pub resource_id: ResourceId,
    pub schedule: &'a ResourceSchedule,
    pub bookings: &'a [Booking],
}

/// Whether a slot starting at `start` on `date` lies in the past, compared at
/// minute precision against `now`.
fn is_past(date: NaiveDate, start: NaiveTime, now: NaiveDateTime) -> bool {
    let today = now.date();
    if date != today {
        return date < today;
    }
    minute_of_day(start) < minute_of_day(now.time())
}

/// The active booking occupying instant `t`, if any, with its head flag.
fn occupancy(bookings: &[Booking], t: NaiveDateTime) -> Option<(BookingId, bool)> {
    bookings
        .iter()
        .find(|b| b.is_active() && b.start <= t && t < b.end())
        .map(|b| (b.id, b.start == t))
}

/// Generate one resource's slots for `date`. Returns whether any windows
/// applied at all, alongside the slots.
fn resolve_resource_slots(
    view: &ResourceView<'_>,
    date: NaiveDate,
    now: NaiveDateTime,
    granularity: Granularity,
) -> (bool, Vec<Slot>) {
    let windows = view.schedule.effective_windows(date);
    if windows.is_empty() {
        return (false, Vec::new());
    }

    let mut slots = Vec::new();
    // Overlapping windows are tolerated, not repaired: duplicate start times
    // are dropped, first window wins.
    let mut seen = BTreeSet::new();
    for (block, window) in windows.iter().enumerate() {
        for start in slot_starts(*window, granularity) {
            if !seen.insert(start) {
                continue;
            }
            let status = if is_past(date, start, now) {
                SlotStatus::Past
            } else {
                match occupancy(view.bookings, date.and_time(start)) {
                    Some((booking, head)) => SlotStatus::Booked { booking, head },
                    None => SlotStatus::Free,
                }
            };
            slots.push(Slot {
                resource_id: view.resource_id,
                date,
                start,
                block,
                status,
            });
        }
    }
    slots.sort_by_key(|s| s.start);
    (true, slots)
}

/// Day status from the counting rule: only non-past slots participate.
fn day_status(has_windows: bool, slots: &[Slot]) -> DayStatus {
    if !has_windows {
        return DayStatus::NoSchedule;
    }
    let mut free = 0usize;
    let mut booked = 0usize;
    for slot in slots {
        match slot.status {
            SlotStatus::Free => free += 1,
            SlotStatus::Booked { .. } => booked += 1,
            SlotStatus::Past => {}
        }
    }
    match (free, booked) {
        (0, 0) => DayStatus::Past,
        (0, _) => DayStatus::FullyBooked,
        (_, 0) => DayStatus::Available,
        _ => DayStatus::PartiallyBooked,
    }
}

/// Resolve one resource's grid for `date`.
///
/// Implements the full pipeline: effective windows (override replaces
/// weekly), slot generation, occupancy against active bookings, past cutoff
/// at minute precision, and the day-status counting rule.
#[must_use]
pub fn resolve_day(
    view: &ResourceView<'_>,
    date: NaiveDate,
    now: NaiveDateTime,
    granularity: Granularity,
) -> DaySlots {
    let (has_windows, slots) = resolve_resource_slots(view, date, now, granularity);
    DaySlots {
        date,
        status: day_status(has_windows, &slots),
        slots,
    }
}

/// Resolve the union grid across all given resources for `date`.
///
/// Each resource is resolved independently; the union is ordered by
/// (start, resource) and the day status applies the same counting rule to the
/// union. [`DaySlots::resources`] exposes which resources contributed.
#[must_use]
pub fn resolve_day_all(
    views: &[ResourceView<'_>],
    date: NaiveDate,
    now: NaiveDateTime,
    granularity: Granularity,
) -> DaySlots {
    let mut any_windows = false;
    let mut slots = Vec::new();
    for view in views {
        let (has_windows, resource_slots) = resolve_resource_slots(view, date, now, granularity);
        any_windows |= has_windows;
        slots.extend(resource_slots);
    }
    slots.sort_by_key(|s| (s.start, s.resource_id));
    DaySlots {
        date,
        status: day_status(any_windows, &slots),
        slots,
    }
}

/// Per-day statuses for every date of the given month, across all views.
///
/// An invalid (year, month) pair yields an empty map.
#[must_use]
pub fn resolve_month(
    views: &[ResourceView<'_>],
    year: i32,
    month: u32,
    now: NaiveDateTime,
    granularity: Granularity,
) -> BTreeMap<NaiveDate, DayStatus> {
    let mut out = BTreeMap::new();
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return out;
    };
    let mut date = first;
    while date.month() == month {
        out.insert(date, resolve_day_all(views, date, now, granularity).status);
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    out
}
