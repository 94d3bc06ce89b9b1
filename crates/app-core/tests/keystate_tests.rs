// The per-key press state machine in isolation.

use app_core::{KeyState, KEYPRESS_DEPTH, PRESS_INTERVALS};

#[test]
fn new_key_rests_at_the_top() {
    let state = KeyState::default();
    assert_eq!(state.level(), 0);
    assert!(state.at_top());
    assert!(!state.at_bottom());
    assert!(!state.is_moving());
    assert_eq!(state.y_offset(), 0.0);
}

#[test]
fn pressing_takes_exactly_the_configured_steps() {
    let mut state = KeyState::default();
    for step in 1..=PRESS_INTERVALS {
        state.tick_down();
        assert_eq!(state.level(), -step);
    }
    assert!(state.at_bottom());
    assert!((state.y_offset() + KEYPRESS_DEPTH).abs() < 1e-5);
}

#[test]
fn extra_ticks_past_either_end_are_ignored() {
    let mut state = KeyState::default();
    state.tick_up();
    assert_eq!(state.level(), 0);

    for _ in 0..PRESS_INTERVALS + 3 {
        state.tick_down();
    }
    assert_eq!(state.level(), -PRESS_INTERVALS);

    for _ in 0..PRESS_INTERVALS + 3 {
        state.tick_up();
    }
    assert_eq!(state.level(), 0);
    assert!((state.y_offset()).abs() < 1e-5);
}

#[test]
fn moving_at_every_depressed_level_including_the_bottom() {
    let mut state = KeyState::default();
    for _ in 0..PRESS_INTERVALS {
        state.tick_down();
        assert!(state.is_moving(), "level {} should report moving", state.level());
    }
    // Held at the bottom the key still reports moving; it only stops once
    // fully released again.
    assert!(state.at_bottom());
    assert!(state.is_moving());

    for _ in 0..PRESS_INTERVALS {
        state.tick_up();
    }
    assert!(!state.is_moving());
}

#[test]
fn full_round_trip_restores_the_rest_position() {
    let mut state = KeyState::default();
    for _ in 0..PRESS_INTERVALS {
        state.tick_down();
    }
    for _ in 0..PRESS_INTERVALS {
        state.tick_up();
    }
    assert_eq!(state.level(), 0);
    assert!(state.at_top());
    assert!((state.y_offset()).abs() < 1e-5);
}
