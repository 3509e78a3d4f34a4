//! Booking writes — the only code that mutates the ledger.
//!
//! Every write serializes on a per-resource mutex for the whole
//! load–check–commit sequence. That lock is the engine's single critical
//! section and what upholds the no-overlap invariant when callers race:
//! an optimistic check-then-insert without it would let two overlapping
//! bookings both commit, so it is not an option here.
//!
//! Events are published after commit, fire-and-forget; they never delay or
//! fail the transaction.

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use slot_engine::{
    ensure_aligned, ensure_duration, ensure_within_day, Booking, BookingId, BookingStatus,
    Granularity, ResourceId,
};

use crate::error::{EngineError, Result};
use crate::notifier::{BookingEvent, BookingEventKind, ChangeNotifier};
use crate::store::{day_after, BookingStore, ResourceDirectory};

/// A booking creation request.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub resource_id: ResourceId,
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    /// Opaque reference to data owned by other modules; stored untouched.
    pub payload: serde_json::Value,
    /// Caller-supplied key that makes retries after an unknown-outcome
    /// timeout safe: resubmitting the same key returns the originally
    /// created booking instead of inserting a second one.
    pub idempotency_key: String,
}

/// Validates and atomically commits booking creation, rescheduling,
/// cancellation, and finalization.
pub struct BookingManager {
    ledger: Arc<dyn BookingStore>,
    directory: Arc<dyn ResourceDirectory>,
    notifier: ChangeNotifier,
    granularity: Granularity,
    resource_locks: DashMap<ResourceId, Arc<Mutex<()>>>,
    idempotency: DashMap<String, BookingId>,
}

impl BookingManager {
    #[must_use]
    pub fn new(
        ledger: Arc<dyn BookingStore>,
        directory: Arc<dyn ResourceDirectory>,
        notifier: ChangeNotifier,
        granularity: Granularity,
    ) -> Self {
        Self {
            ledger,
            directory,
            notifier,
            granularity,
            resource_locks: DashMap::new(),
            idempotency: DashMap::new(),
        }
    }

    fn lock_for(&self, resource_id: ResourceId) -> Arc<Mutex<()>> {
        self.resource_locks
            .entry(resource_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn validate_interval(&self, start: NaiveDateTime, duration_minutes: u32) -> Result<()> {
        ensure_aligned(start.time(), self.granularity)?;
        ensure_duration(duration_minutes, self.granularity)?;
        ensure_within_day(start.time(), duration_minutes)?;
        Ok(())
    }

    /// The active booking overlapping `[start, start+duration)` on the given
    /// day, if any. Must be called with the resource lock held.
    async fn find_overlap(
        &self,
        resource_id: ResourceId,
        start: NaiveDateTime,
        duration_minutes: u32,
        exclude: Option<BookingId>,
    ) -> Result<Option<Booking>> {
        // A single day bounds the search: bookings cannot span midnight.
        let date = start.date();
        let day = self
            .ledger
            .in_range(resource_id, date, day_after(date))
            .await?;
        let end = start + Duration::minutes(i64::from(duration_minutes));
        Ok(day.into_iter().find(|b| {
            Some(b.id) != exclude && b.is_active() && b.overlaps(start, end)
        }))
    }

    /// Create a booking, or return [`EngineError::Conflict`] with no state
    /// change if the interval is already taken.
    ///
    /// Exactly one of two callers racing for overlapping intervals on the
    /// same resource succeeds.
    pub async fn create(&self, request: CreateBooking) -> Result<Booking> {
        self.validate_interval(request.start, request.duration_minutes)?;
        if !self.directory.exists(request.resource_id).await? {
            return Err(EngineError::ResourceNotFound(request.resource_id));
        }

        let lock = self.lock_for(request.resource_id);
        let _guard = lock.lock().await;

        if let Some(existing) = self.replayed_create(&request).await? {
            return Ok(existing);
        }

        debug!(
            resource_id = %request.resource_id,
            start = %request.start,
            duration_minutes = request.duration_minutes,
            "checking booking interval"
        );
        if let Some(conflicting) = self
            .find_overlap(request.resource_id, request.start, request.duration_minutes, None)
            .await?
        {
            warn!(
                resource_id = %request.resource_id,
                start = %request.start,
                conflicting = %conflicting.id,
                "booking conflict"
            );
            return Err(EngineError::Conflict {
                resource_id: request.resource_id,
                start: request.start,
                duration_minutes: request.duration_minutes,
            });
        }

        let booking = Booking {
            id: BookingId::new(),
            resource_id: request.resource_id,
            start: request.start,
            duration_minutes: request.duration_minutes,
            status: BookingStatus::Active,
            payload: request.payload,
        };
        self.ledger.insert(booking.clone()).await?;
        self.idempotency
            .insert(request.idempotency_key, booking.id);

        info!(id = %booking.id, resource_id = %booking.resource_id, start = %booking.start, "booking created");
        self.notifier.publish(BookingEvent {
            kind: BookingEventKind::Created,
            resource_id: booking.resource_id,
            date: booking.start.date(),
        });
        Ok(booking)
    }

    /// If the request's idempotency key was already committed, return the
    /// original booking. A reused key with different parameters is rejected.
    async fn replayed_create(&self, request: &CreateBooking) -> Result<Option<Booking>> {
        let Some(id) = self.idempotency.get(&request.idempotency_key).map(|e| *e) else {
            return Ok(None);
        };
        let booking = self
            .ledger
            .get(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))?;
        if booking.resource_id != request.resource_id
            || booking.start != request.start
            || booking.duration_minutes != request.duration_minutes
        {
            return Err(EngineError::Validation(format!(
                "idempotency key {:?} was already used for a different request",
                request.idempotency_key
            )));
        }
        debug!(id = %booking.id, "replaying idempotent create");
        Ok(Some(booking))
    }

    /// Transition `active → cancelled`. Cancelling an already-cancelled
    /// booking is a no-op; a finalized booking cannot be cancelled here.
    pub async fn cancel(&self, id: BookingId) -> Result<()> {
        // The owning resource is unknown until the booking is loaded, so
        // fetch once, then take the lock and re-read to close the gap.
        let preliminary = self
            .ledger
            .get(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))?;
        let lock = self.lock_for(preliminary.resource_id);
        let _guard = lock.lock().await;

        let mut booking = self
            .ledger
            .get(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))?;
        match booking.status {
            BookingStatus::Finalized => Err(EngineError::InvalidState {
                id,
                status: booking.status,
            }),
            BookingStatus::Cancelled => Ok(()),
            BookingStatus::Active => {
                booking.status = BookingStatus::Cancelled;
                let resource_id = booking.resource_id;
                let date = booking.start.date();
                self.ledger.update(booking).await?;

                info!(%id, %resource_id, "booking cancelled");
                self.notifier.publish(BookingEvent {
                    kind: BookingEventKind::Cancelled,
                    resource_id,
                    date,
                });
                Ok(())
            }
        }
    }

    /// Move an active booking to a new interval. The overlap check excludes
    /// the booking's own current interval; terminal bookings refuse to move.
    pub async fn reschedule(
        &self,
        id: BookingId,
        new_start: NaiveDateTime,
        new_duration_minutes: u32,
    ) -> Result<Booking> {
        self.validate_interval(new_start, new_duration_minutes)?;

        let preliminary = self
            .ledger
            .get(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))?;
        let lock = self.lock_for(preliminary.resource_id);
        let _guard = lock.lock().await;

        let current = self
            .ledger
            .get(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))?;
        if !current.is_active() {
            return Err(EngineError::InvalidState {
                id,
                status: current.status,
            });
        }

        if let Some(conflicting) = self
            .find_overlap(current.resource_id, new_start, new_duration_minutes, Some(id))
            .await?
        {
            warn!(
                %id,
                resource_id = %current.resource_id,
                conflicting = %conflicting.id,
                "reschedule conflict"
            );
            return Err(EngineError::Conflict {
                resource_id: current.resource_id,
                start: new_start,
                duration_minutes: new_duration_minutes,
            });
        }

        let old_date = current.start.date();
        let mut updated = current;
        updated.start = new_start;
        updated.duration_minutes = new_duration_minutes;
        self.ledger.update(updated.clone()).await?;

        info!(%id, resource_id = %updated.resource_id, start = %updated.start, "booking rescheduled");
        // Both the vacated and the newly occupied date went stale.
        self.notifier.publish(BookingEvent {
            kind: BookingEventKind::Updated,
            resource_id: updated.resource_id,
            date: old_date,
        });
        let new_date = updated.start.date();
        if new_date != old_date {
            self.notifier.publish(BookingEvent {
                kind: BookingEventKind::Updated,
                resource_id: updated.resource_id,
                date: new_date,
            });
        }
        Ok(updated)
    }

    /// Transition `active → finalized` once payment/completion has occurred.
    /// Finalizing twice is a no-op; a cancelled booking cannot be finalized.
    pub async fn finalize(&self, id: BookingId) -> Result<()> {
        let preliminary = self
            .ledger
            .get(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))?;
        let lock = self.lock_for(preliminary.resource_id);
        let _guard = lock.lock().await;

        let mut booking = self
            .ledger
            .get(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))?;
        match booking.status {
            BookingStatus::Cancelled => Err(EngineError::InvalidState {
                id,
                status: booking.status,
            }),
            BookingStatus::Finalized => Ok(()),
            BookingStatus::Active => {
                booking.status = BookingStatus::Finalized;
                let resource_id = booking.resource_id;
                let date = booking.start.date();
                self.ledger.update(booking).await?;

                info!(%id, %resource_id, "booking finalized");
                self.notifier.publish(BookingEvent {
                    kind: BookingEventKind::Updated,
                    resource_id,
                    date,
                });
                Ok(())
            }
        }
    }
}
