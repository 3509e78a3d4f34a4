//! The engine error taxonomy.
//!
//! Business-rule errors (`Validation`, `Conflict`, `InvalidState`, not-found)
//! originate only in the write path and are returned as typed results, never
//! used as control flow. `StoreUnavailable` is the one infrastructure error:
//! reads may retry it freely; writes must only be retried with the original
//! idempotency key, because a timed-out write has an unknown outcome.

use chrono::NaiveDateTime;
use thiserror::Error;

use slot_engine::{BookingId, BookingStatus, ResourceId, SlotError};

/// Transient failure at the storage boundary.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Everything a caller of the engine can get back besides a success.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed or misaligned input. A caller error — surfaced directly,
    /// never retried automatically.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested interval overlaps an existing active booking. Expected
    /// under concurrent use: the caller should re-fetch availability and let
    /// the user pick again, not silently retry another time.
    #[error("booking conflict on resource {resource_id}: {start} for {duration_minutes} minutes")]
    Conflict {
        resource_id: ResourceId,
        start: NaiveDateTime,
        duration_minutes: u32,
    },

    /// Mutation attempted on a booking in a terminal state.
    #[error("booking {id} is {status} and cannot be modified")]
    InvalidState { id: BookingId, status: BookingStatus },

    #[error("unknown resource {0}")]
    ResourceNotFound(ResourceId),

    #[error("unknown booking {0}")]
    BookingNotFound(BookingId),

    /// Transient infrastructure failure, bubbled unchanged from the stores.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<SlotError> for EngineError {
    fn from(err: SlotError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        Self::StoreUnavailable(err.0)
    }
}

/// Convenience alias used throughout booking-engine.
pub type Result<T> = std::result::Result<T, EngineError>;
