//! # slot-engine
//!
//! Pure availability math for a multi-resource appointment scheduler.
//!
//! Everything in this crate is a deterministic function of its inputs:
//! schedules, bookings, and a caller-supplied `now`. There is no I/O, no
//! clock access, and no cache — slot grids are derived fresh on every call,
//! so they can never drift from the booking ledger.
//!
//! ## Modules
//!
//! - [`schedule`] — weekly availability patterns and date-specific overrides
//! - [`slots`] — quantizing availability windows into bookable start times
//! - [`resolver`] — per-day and per-month availability resolution
//! - [`types`] — shared domain value types (resources, bookings)
//! - [`error`] — validation error types

pub mod error;
pub mod resolver;
pub mod schedule;
pub mod slots;
pub mod types;

pub use error::SlotError;
pub use resolver::{
    resolve_day, resolve_day_all, resolve_month, DaySlots, DayStatus, ResourceView, Slot,
    SlotStatus,
};
pub use schedule::{DateOverride, ResourceSchedule, TimeWindow, WeeklyWindow};
pub use slots::{ensure_aligned, ensure_duration, ensure_within_day, slot_starts, Granularity};
pub use types::{Booking, BookingId, BookingStatus, ResourceId};
