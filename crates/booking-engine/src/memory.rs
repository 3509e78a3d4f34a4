//! In-memory store implementations.
//!
//! Reference backends for the storage traits, held behind `tokio` RwLocks.
//! They are the deterministic test substrate and a workable single-process
//! backend; a database-backed implementation can replace them without
//! touching the rest of the engine.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use slot_engine::{Booking, BookingId, DateOverride, ResourceId, ResourceSchedule, WeeklyWindow};

use crate::error::StoreError;
use crate::store::{BookingStore, ResourceDirectory, ScheduleStore};

/// Roster of known resources.
#[derive(Debug, Default)]
pub struct MemoryResourceDirectory {
    resources: RwLock<BTreeSet<ResourceId>>,
}

impl MemoryResourceDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, resource_id: ResourceId) {
        self.resources.write().await.insert(resource_id);
    }
}

#[async_trait]
impl ResourceDirectory for MemoryResourceDirectory {
    async fn exists(&self, resource_id: ResourceId) -> Result<bool, StoreError> {
        Ok(self.resources.read().await.contains(&resource_id))
    }

    async fn list(&self) -> Result<Vec<ResourceId>, StoreError> {
        Ok(self.resources.read().await.iter().copied().collect())
    }
}

/// Weekly windows and overrides per resource.
#[derive(Debug, Default)]
pub struct MemoryScheduleStore {
    schedules: RwLock<HashMap<ResourceId, ResourceSchedule>>,
}

impl MemoryScheduleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_weekly(&self, window: WeeklyWindow) {
        self.schedules
            .write()
            .await
            .entry(window.resource_id)
            .or_default()
            .weekly
            .push(window);
    }

    pub async fn add_override(&self, date_override: DateOverride) {
        self.schedules
            .write()
            .await
            .entry(date_override.resource_id)
            .or_default()
            .overrides
            .push(date_override);
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn schedule(&self, resource_id: ResourceId) -> Result<ResourceSchedule, StoreError> {
        Ok(self
            .schedules
            .read()
            .await
            .get(&resource_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// The booking ledger, keyed by booking id.
#[derive(Debug, Default)]
pub struct MemoryBookingStore {
    bookings: RwLock<HashMap<BookingId, Booking>>,
}

impl MemoryBookingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn get(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn in_range(
        &self,
        resource_id: ResourceId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Booking>, StoreError> {
        let bookings = self.bookings.read().await;
        let mut out: Vec<Booking> = bookings
            .values()
            .filter(|b| {
                b.resource_id == resource_id && b.start.date() >= from && b.start.date() < until
            })
            .cloned()
            .collect();
        out.sort_by_key(|b| b.start);
        Ok(out)
    }

    async fn insert(&self, booking: Booking) -> Result<(), StoreError> {
        self.bookings.write().await.insert(booking.id, booking);
        Ok(())
    }

    async fn update(&self, booking: Booking) -> Result<(), StoreError> {
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&booking.id) {
            Some(slot) => {
                *slot = booking;
                Ok(())
            }
            None => Err(StoreError(format!("unknown booking {}", booking.id))),
        }
    }
}
