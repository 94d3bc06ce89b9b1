// Cooperative repeating timers.

use std::time::Duration;

use app_core::RepeatingTimer;
use instant::Instant;

#[test]
fn does_not_fire_before_the_first_interval() {
    let start = Instant::now();
    let mut timer = RepeatingTimer::new(Duration::from_millis(10), start);
    assert_eq!(timer.poll(start), 0);
    assert_eq!(timer.poll(start + Duration::from_millis(9)), 0);
}

#[test]
fn fires_once_per_elapsed_interval() {
    let start = Instant::now();
    let mut timer = RepeatingTimer::new(Duration::from_millis(10), start);
    assert_eq!(timer.poll(start + Duration::from_millis(10)), 1);
    assert_eq!(timer.poll(start + Duration::from_millis(20)), 1);
}

#[test]
fn catches_up_after_a_slow_frame() {
    let start = Instant::now();
    let mut timer = RepeatingTimer::new(Duration::from_millis(10), start);
    assert_eq!(timer.poll(start + Duration::from_millis(105)), 10);
    // The missed ticks were consumed, not merely counted.
    assert_eq!(timer.poll(start + Duration::from_millis(109)), 0);
    assert_eq!(timer.poll(start + Duration::from_millis(110)), 1);
}

#[test]
fn polling_in_the_past_is_harmless() {
    let start = Instant::now();
    let mut timer = RepeatingTimer::new(Duration::from_millis(8), start);
    assert_eq!(timer.poll(start + Duration::from_millis(16)), 2);
    assert_eq!(timer.poll(start), 0);
}
