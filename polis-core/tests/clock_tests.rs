use polis_core::{Clock, FakeClock, SystemClock};
use std::time::Duration;

#[test]
fn system_clock_advances_with_real_time() {
    let clock = SystemClock;
    let first = clock.now_monotonic();
    std::thread::sleep(Duration::from_millis(5));
    assert!(clock.now_monotonic() > first);
}

#[test]
fn fake_clock_starts_at_given_utc_time() {
    let start = chrono::Utc::now();
    let clock = FakeClock::new(start);
    assert_eq!(clock.now_utc(), start);
}

#[test]
fn fake_clock_advance_moves_both_monotonic_and_utc() {
    let clock = FakeClock::new(chrono::Utc::now());
    let before_monotonic = clock.now_monotonic();
    let before_utc = clock.now_utc();

    clock.advance(Duration::from_secs(60));

    assert!(clock.now_monotonic() > before_monotonic);
    assert_eq!(clock.now_utc(), before_utc + chrono::Duration::seconds(60));
}
