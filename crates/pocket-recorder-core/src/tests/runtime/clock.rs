use crate::{Clock, ManualClock, SystemClock, tests::support::test_epoch};

use std::time::Duration;

/// WHAT: Advancing a manual clock moves both readings together
/// WHY: Durations and created_at timestamps must agree in tests
#[test]
fn given_manual_clock_when_advancing_then_monotonic_and_wall_move_together() {
    // Given: A clock at the test epoch
    let clock = ManualClock::starting_at(test_epoch());
    assert_eq!(clock.monotonic(), Duration::ZERO);

    // When: Advancing 90 seconds
    clock.advance(Duration::from_secs(90));

    // Then: Both readings moved by 90 seconds
    assert_eq!(clock.monotonic(), Duration::from_secs(90));
    assert_eq!(clock.wall() - test_epoch(), chrono::Duration::seconds(90));
}

/// WHAT: The system clock never goes backwards
/// WHY: Recording duration is derived from monotonic readings
#[test]
fn given_system_clock_when_read_twice_then_non_decreasing() {
    let clock = SystemClock::new();
    let first = clock.monotonic();
    let second = clock.monotonic();
    assert!(second >= first);
}
