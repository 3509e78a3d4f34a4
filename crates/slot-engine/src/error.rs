//! Validation error types for the pure slot layer.

use chrono::NaiveTime;
use thiserror::Error;

/// A request violated the slot-grid rules.
///
/// These are caller errors: they are surfaced directly and never retried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// Granularity must be a positive number of minutes shorter than a day.
    #[error("invalid granularity: {minutes} minutes")]
    InvalidGranularity { minutes: u32 },

    /// The start time does not sit on the granularity grid.
    #[error("start time {time} is not aligned to the {granularity}-minute grid")]
    MisalignedStart { time: NaiveTime, granularity: u32 },

    /// The duration is zero or not a multiple of the granularity.
    #[error("duration of {minutes} minutes is not a positive multiple of {granularity}")]
    InvalidDuration { minutes: u32, granularity: u32 },

    /// The interval would extend past midnight into the next day.
    #[error("interval starting {start} lasting {minutes} minutes crosses midnight")]
    CrossesMidnight { start: NaiveTime, minutes: u32 },
}

/// Convenience alias used throughout slot-engine.
pub type Result<T> = std::result::Result<T, SlotError>;
