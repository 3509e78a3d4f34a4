//! # booking-engine
//!
//! The stateful shell around [`slot_engine`]: an appointment booking engine
//! for multi-resource (multi-doctor) scheduling that guarantees no two active
//! bookings for the same resource ever occupy overlapping time, even under
//! concurrent booking attempts.
//!
//! Reads (`get_day_slots`, `list_month_availability`, `nearest_available`)
//! are lock-free and run fully in parallel; they fetch schedule and ledger
//! rows and hand them to the pure resolver. Writes serialize per resource
//! around a single check-then-commit critical section.
//!
//! ## Modules
//!
//! - [`engine`] — the [`BookingEngine`] facade external modules call
//! - [`manager`] — booking writes: create, reschedule, cancel, finalize
//! - [`store`] — storage traits at the I/O boundary
//! - [`memory`] — in-memory store implementations
//! - [`notifier`] — booking lifecycle broadcast (hints to refresh)
//! - [`clock`] — injectable "now"
//! - [`error`] — the engine error taxonomy

pub mod clock;
pub mod engine;
pub mod error;
pub mod manager;
pub mod memory;
pub mod notifier;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{BookingEngine, ResourceScope, SlotCandidate};
pub use error::{EngineError, Result, StoreError};
pub use manager::{BookingManager, CreateBooking};
pub use memory::{MemoryBookingStore, MemoryResourceDirectory, MemoryScheduleStore};
pub use notifier::{BookingEvent, BookingEventKind, ChangeNotifier};
pub use store::{BookingStore, ResourceDirectory, ScheduleStore};

pub use slot_engine;
