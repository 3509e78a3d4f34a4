//! Storage traits at the engine's I/O boundary.
//!
//! These are the only suspension points in the engine. Implementations must
//! provide linearizable read-after-write on the booking ledger: once a write
//! returns, every subsequent read reflects it. All failures surface as
//! [`StoreError`]; the stores carry no business rules.

use async_trait::async_trait;
use chrono::NaiveDate;

use slot_engine::{Booking, BookingId, ResourceId, ResourceSchedule};

use crate::error::StoreError;

/// Read-only view of the clinic roster. Resources are created and removed by
/// an external admin module; this engine only checks existence.
#[async_trait]
pub trait ResourceDirectory: Send + Sync {
    async fn exists(&self, resource_id: ResourceId) -> Result<bool, StoreError>;
    async fn list(&self) -> Result<Vec<ResourceId>, StoreError>;
}

/// Per-resource recurring weekly windows and date overrides.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// The full schedule inputs for one resource. Unknown resources yield an
    /// empty schedule rather than an error; existence is the directory's job.
    async fn schedule(&self, resource_id: ResourceId) -> Result<ResourceSchedule, StoreError>;
}

/// The authoritative booking ledger.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError>;

    /// All bookings (any status) for `resource_id` whose start date lies in
    /// `[from, until)`.
    async fn in_range(
        &self,
        resource_id: ResourceId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Booking>, StoreError>;

    async fn insert(&self, booking: Booking) -> Result<(), StoreError>;

    /// Replace the stored booking with the same id.
    async fn update(&self, booking: Booking) -> Result<(), StoreError>;
}

/// The exclusive upper bound for a single-day `in_range` query.
pub(crate) fn day_after(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}
