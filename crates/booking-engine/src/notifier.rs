//! Booking lifecycle broadcast.
//!
//! Events are hints to refresh, never the source of truth: they carry only
//! the resource and date whose availability went stale, and subscribers
//! re-resolve through the engine instead of trusting the event body. Delivery
//! is best-effort fan-out with no persistence — a lagged receiver drops the
//! oldest events, and a missed event cannot cause permanent staleness because
//! clients also re-resolve on every user-initiated refresh.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use slot_engine::ResourceId;

/// What happened to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingEventKind {
    Created,
    Updated,
    Cancelled,
}

/// A booking lifecycle hint: which resource and date need re-resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEvent {
    pub kind: BookingEventKind,
    pub resource_id: ResourceId,
    pub date: NaiveDate,
}

/// Fan-out broadcast over a tokio channel.
///
/// Cloning shares the underlying channel, so the manager and the facade can
/// both hold a handle.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<BookingEvent>,
}

impl ChangeNotifier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fire-and-forget publish. Never blocks and never fails the surrounding
    /// transaction: a send error only means nobody is currently subscribed.
    pub fn publish(&self, event: BookingEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!(?event, "no subscribers for booking event");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.sender.subscribe()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}
