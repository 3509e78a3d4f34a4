//! Injectable "now".
//!
//! The engine never reads the system clock directly; every read path takes
//! its instant from a [`Clock`] so tests can pin time and past-cutoff
//! behavior stays deterministic.

use chrono::{Local, NaiveDateTime};

/// Supplies the current clinic-local wall time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Production clock backed by system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant. For tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
