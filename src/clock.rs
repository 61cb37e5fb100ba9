use chrono::{Duration, Local, NaiveDateTime};
use std::cell::Cell;

/// Supplies "now" on the local wall clock.
///
/// Callers read it once per tick and pass the instant down, so a single
/// render never mixes two different readings.
pub trait TimeSource {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
    instant: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(instant: NaiveDateTime) -> Self {
        FixedClock {
            instant: Cell::new(instant),
        }
    }

    pub fn set(&self, instant: NaiveDateTime) {
        self.instant.set(instant);
    }

    pub fn advance(&self, by: Duration) {
        self.instant.set(self.instant.get() + by);
    }
}

impl TimeSource for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.instant.get()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}
