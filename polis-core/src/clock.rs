use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Supplies both the monotonic instant used for cooldown arithmetic and the
/// wall-clock timestamp written to `status.lastScaleTime`. Split in two so
/// tests can inject both independently without the cooldown math being
/// sensitive to wall-clock adjustments (spec.md §9, "Time").
pub trait Clock: Send + Sync {
    fn now_monotonic(&self) -> Instant;
    fn now_utc(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_monotonic(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock tests can advance deterministically.
pub struct FakeClock {
    inner: Mutex<FakeClockState>,
}

struct FakeClockState {
    monotonic: Instant,
    utc: DateTime<Utc>,
}

impl FakeClock {
    pub fn new(start_utc: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(FakeClockState {
                monotonic: Instant::now(),
                utc: start_utc,
            }),
        })
    }

    pub fn advance(&self, duration: std::time::Duration) {
        let mut state = self.inner.lock().unwrap();
        state.monotonic += duration;
        state.utc += chrono::Duration::from_std(duration).unwrap_or_default();
    }
}

impl Clock for FakeClock {
    fn now_monotonic(&self) -> Instant {
        self.inner.lock().unwrap().monotonic
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap().utc
    }
}
