//! The facade external modules call.
//!
//! [`BookingEngine`] wires the stores, clock, transaction manager, and
//! notifier together. Its read operations fetch schedule and ledger rows and
//! hand them to the pure resolver in [`slot_engine`] — no cache sits in
//! between, so a read after a successful write always reflects that write.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use slot_engine::{
    resolve_day, resolve_day_all, resolve_month, Booking, BookingId, DaySlots, DayStatus,
    Granularity, ResourceId, ResourceSchedule, ResourceView,
};

use crate::clock::Clock;
use crate::error::{EngineError, Result};
use crate::manager::{BookingManager, CreateBooking};
use crate::notifier::{BookingEvent, ChangeNotifier};
use crate::store::{day_after, BookingStore, ResourceDirectory, ScheduleStore};

/// Which resources a read applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
    One(ResourceId),
    All,
}

/// A free slot suggestion from [`BookingEngine::nearest_available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCandidate {
    pub resource_id: ResourceId,
    pub date: NaiveDate,
    pub start: NaiveTime,
}

/// The slot-availability and booking-conflict engine.
pub struct BookingEngine {
    schedules: Arc<dyn ScheduleStore>,
    ledger: Arc<dyn BookingStore>,
    directory: Arc<dyn ResourceDirectory>,
    clock: Arc<dyn Clock>,
    granularity: Granularity,
    notifier: ChangeNotifier,
    manager: BookingManager,
}

impl BookingEngine {
    #[must_use]
    pub fn new(
        schedules: Arc<dyn ScheduleStore>,
        ledger: Arc<dyn BookingStore>,
        directory: Arc<dyn ResourceDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_granularity(schedules, ledger, directory, clock, Granularity::DEFAULT)
    }

    #[must_use]
    pub fn with_granularity(
        schedules: Arc<dyn ScheduleStore>,
        ledger: Arc<dyn BookingStore>,
        directory: Arc<dyn ResourceDirectory>,
        clock: Arc<dyn Clock>,
        granularity: Granularity,
    ) -> Self {
        let notifier = ChangeNotifier::default();
        let manager = BookingManager::new(
            Arc::clone(&ledger),
            Arc::clone(&directory),
            notifier.clone(),
            granularity,
        );
        Self {
            schedules,
            ledger,
            directory,
            clock,
            granularity,
            notifier,
            manager,
        }
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    /// The ordered slot grid for one date, for one resource or the union of
    /// all of them.
    pub async fn get_day_slots(&self, scope: ResourceScope, date: NaiveDate) -> Result<DaySlots> {
        let now = self.clock.now();
        let inputs = self.load_inputs(scope, date, day_after(date)).await?;
        let views: Vec<ResourceView<'_>> = inputs
            .iter()
            .map(|(id, schedule, bookings)| ResourceView {
                resource_id: *id,
                schedule,
                bookings,
            })
            .collect();
        Ok(resolve_day_all(&views, date, now, self.granularity))
    }

    /// Day-level statuses for every date of the month.
    pub async fn list_month_availability(
        &self,
        scope: ResourceScope,
        year: i32,
        month: u32,
    ) -> Result<BTreeMap<NaiveDate, DayStatus>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| EngineError::Validation(format!("invalid month {year}-{month:02}")))?;
        let until = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| EngineError::Validation(format!("invalid month {year}-{month:02}")))?;

        let now = self.clock.now();
        let inputs = self.load_inputs(scope, first, until).await?;
        let views: Vec<ResourceView<'_>> = inputs
            .iter()
            .map(|(id, schedule, bookings)| ResourceView {
                resource_id: *id,
                schedule,
                bookings,
            })
            .collect();
        Ok(resolve_month(&views, year, month, now, self.granularity))
    }

    /// The next free slots from now, scanning forward day by day up to
    /// `horizon_days`, ordered by (date, start, resource) and truncated to
    /// `limit`. An empty `resource_ids` means all resources.
    pub async fn nearest_available(
        &self,
        resource_ids: &[ResourceId],
        horizon_days: u32,
        limit: usize,
    ) -> Result<Vec<SlotCandidate>> {
        self.nearest_available_from(resource_ids, self.clock.now(), horizon_days, limit)
            .await
    }

    /// [`Self::nearest_available`] with an explicit starting instant.
    /// Purely a read: restartable and idempotent.
    pub async fn nearest_available_from(
        &self,
        resource_ids: &[ResourceId],
        from: NaiveDateTime,
        horizon_days: u32,
        limit: usize,
    ) -> Result<Vec<SlotCandidate>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let ids = if resource_ids.is_empty() {
            self.directory.list().await?
        } else {
            for id in resource_ids {
                if !self.directory.exists(*id).await? {
                    return Err(EngineError::ResourceNotFound(*id));
                }
            }
            resource_ids.to_vec()
        };

        let mut out: Vec<SlotCandidate> = Vec::new();
        let mut date = from.date();
        for _ in 0..horizon_days {
            let mut day_candidates: Vec<SlotCandidate> = Vec::new();
            for id in &ids {
                let schedule = self.schedules.schedule(*id).await?;
                let bookings = self.ledger.in_range(*id, date, day_after(date)).await?;
                let view = ResourceView {
                    resource_id: *id,
                    schedule: &schedule,
                    bookings: &bookings,
                };
                let day = resolve_day(&view, date, from, self.granularity);
                day_candidates.extend(day.free_slots().map(|s| SlotCandidate {
                    resource_id: s.resource_id,
                    date: s.date,
                    start: s.start,
                }));
            }
            day_candidates.sort_by_key(|c| (c.start, c.resource_id));
            out.extend(day_candidates);
            if out.len() >= limit {
                break;
            }
            date = day_after(date);
        }
        out.truncate(limit);
        debug!(count = out.len(), "nearest-available scan finished");
        Ok(out)
    }

    /// The booking with the given id, regardless of status.
    pub async fn get_booking(&self, id: BookingId) -> Result<Booking> {
        self.ledger
            .get(id)
            .await?
            .ok_or(EngineError::BookingNotFound(id))
    }

    // ── Writes (delegated to the transaction manager) ───────────────────────

    pub async fn create_booking(&self, request: CreateBooking) -> Result<Booking> {
        self.manager.create(request).await
    }

    pub async fn reschedule_booking(
        &self,
        id: BookingId,
        new_start: NaiveDateTime,
        new_duration_minutes: u32,
    ) -> Result<Booking> {
        self.manager
            .reschedule(id, new_start, new_duration_minutes)
            .await
    }

    pub async fn cancel_booking(&self, id: BookingId) -> Result<()> {
        self.manager.cancel(id).await
    }

    pub async fn finalize_booking(&self, id: BookingId) -> Result<()> {
        self.manager.finalize(id).await
    }

    // ── Events ──────────────────────────────────────────────────────────────

    /// Subscribe to booking lifecycle hints. Receivers that fall behind drop
    /// the oldest events; re-resolve on every user-initiated refresh.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.notifier.subscribe()
    }

    // ── Internals ───────────────────────────────────────────────────────────

    /// Fetch the resolver inputs for every resource in scope, with bookings
    /// bounded to `[from, until)`.
    async fn load_inputs(
        &self,
        scope: ResourceScope,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<(ResourceId, ResourceSchedule, Vec<Booking>)>> {
        let ids = match scope {
            ResourceScope::One(id) => {
                if !self.directory.exists(id).await? {
                    return Err(EngineError::ResourceNotFound(id));
                }
                vec![id]
            }
            ResourceScope::All => self.directory.list().await?,
        };

        let mut inputs = Vec::with_capacity(ids.len());
        for id in ids {
            let schedule = self.schedules.schedule(id).await?;
            let bookings = self.ledger.in_range(id, from, until).await?;
            inputs.push((id, schedule, bookings));
        }
        Ok(inputs)
    }
}
