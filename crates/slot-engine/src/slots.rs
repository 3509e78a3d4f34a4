//! Slot generation — quantizing availability windows into bookable start
//! times — plus the alignment rules the write path enforces.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::schedule::TimeWindow;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// The fixed step size, in minutes, at which bookable slot start-times are
/// quantized. All booking start times and durations must be multiples of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Granularity(u32);

impl Granularity {
    /// The clinic default: 30-minute slots.
    pub const DEFAULT: Self = Self(30);

    /// # Errors
    ///
    /// Returns [`SlotError::InvalidGranularity`] for zero or a value that
    /// does not fit within a day.
    pub const fn new(minutes: u32) -> Result<Self> {
        if minutes == 0 || minutes >= MINUTES_PER_DAY {
            return Err(SlotError::InvalidGranularity { minutes });
        }
        Ok(Self(minutes))
    }

    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Minutes since midnight. Seconds are ignored on purpose: all comparisons in
/// this engine happen at minute precision to avoid boundary flicker.
pub(crate) fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// Start times within `window`, stepping every `granularity` minutes.
///
/// Emits `start`, `start + g`, … while the full slot still fits
/// (`t + g <= end`); a trailing partial interval shorter than the granularity
/// is dropped. Ill-formed windows (`end <= start`) produce no slots.
///
/// Pure and deterministic: no side effects, no I/O.
#[must_use]
pub fn slot_starts(window: TimeWindow, granularity: Granularity) -> Vec<NaiveTime> {
    if !window.is_well_formed() {
        return Vec::new();
    }
    let g = granularity.minutes();
    let end = minute_of_day(window.end);
    let mut out = Vec::new();
    let mut t = minute_of_day(window.start);
    while t + g <= end {
        if let Some(time) = NaiveTime::from_hms_opt(t / 60, t % 60, 0) {
            out.push(time);
        }
        t += g;
    }
    out
}

/// Checks that `time` sits on the granularity grid, counted from midnight.
///
/// # Errors
///
/// Returns [`SlotError::MisalignedStart`] when it does not (including
/// non-zero seconds).
pub fn ensure_aligned(time: NaiveTime, granularity: Granularity) -> Result<()> {
    if time.second() != 0 || minute_of_day(time) % granularity.minutes() != 0 {
        return Err(SlotError::MisalignedStart {
            time,
            granularity: granularity.minutes(),
        });
    }
    Ok(())
}

/// Checks that `minutes` is a positive multiple of the granularity.
///
/// # Errors
///
/// Returns [`SlotError::InvalidDuration`] otherwise.
pub fn ensure_duration(minutes: u32, granularity: Granularity) -> Result<()> {
    if minutes == 0 || minutes % granularity.minutes() != 0 {
        return Err(SlotError::InvalidDuration {
            minutes,
            granularity: granularity.minutes(),
        });
    }
    Ok(())
}

/// Checks that an interval starting at `start` stays within its calendar day.
/// No booking may span midnight.
///
/// # Errors
///
/// Returns [`SlotError::CrossesMidnight`] when it would not.
pub fn ensure_within_day(start: NaiveTime, minutes: u32) -> Result<()> {
    if minute_of_day(start) + minutes > MINUTES_PER_DAY {
        return Err(SlotError::CrossesMidnight { start, minutes });
    }
    Ok(())
}
