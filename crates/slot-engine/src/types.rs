//! Shared domain value types: resources and bookings.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a bookable resource (a doctor in the clinic roster).
///
/// Resources are owned by an external admin module; this engine only
/// references them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ResourceId(pub Uuid);

impl ResourceId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a booking in the ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BookingId(pub Uuid);

impl BookingId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a booking.
///
/// `Cancelled` and `Finalized` are terminal for this engine: a finalized
/// booking has been paid/completed and can no longer be rescheduled or
/// cancelled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Active,
    Cancelled,
    Finalized,
}

impl BookingStatus {
    /// Whether this status refuses further transitions by the engine.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Finalized)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

/// A booking occupying the half-open interval `[start, start + duration)`
/// on one resource. Bookings never span midnight.
///
/// The `payload` is an opaque reference to data owned by other modules
/// (patient, service, billing); the engine stores and returns it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub resource_id: ResourceId,
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub status: BookingStatus,
    pub payload: serde_json::Value,
}

impl Booking {
    /// Exclusive end of the occupied interval.
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }

    /// Whether this booking's interval intersects `[start, end)`.
    ///
    /// Adjacent intervals (one ending exactly when the other starts) do not
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end()
    }
}
