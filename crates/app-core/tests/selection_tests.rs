// Key selection over the full keyboard: edge snapping, octave sub-intervals
// and the legacy raw encoding.

use app_core::{select_key, select_key_in, KeyId, NUM_BLACK_KEYS, NUM_WHITE_KEYS, WHITE_KEY_SPACING};

#[test]
fn nothing_selected_outside_the_keyboard() {
    assert_eq!(select_key(-0.001), None);
    assert_eq!(select_key(-100.0), None);
    assert_eq!(select_key(NUM_WHITE_KEYS as f32 * WHITE_KEY_SPACING + 0.1), None);
    assert_eq!(select_key(1.0e6), None);
}

#[test]
fn left_edge_snaps_to_first_white_key() {
    // No black key overlaps the far left edge, so anything below 0.75 widths
    // is the leading A.
    assert_eq!(select_key(0.0), Some(KeyId::White(0)));
    assert_eq!(select_key(1.0), Some(KeyId::White(0)));
    assert_eq!(select_key(WHITE_KEY_SPACING * 0.74), Some(KeyId::White(0)));
}

#[test]
fn right_edge_snaps_to_last_white_key() {
    let last = NUM_WHITE_KEYS - 1;
    assert_eq!(
        select_key(WHITE_KEY_SPACING * (NUM_WHITE_KEYS as f32 - 0.4)),
        Some(KeyId::White(last))
    );
    assert_eq!(
        select_key(WHITE_KEY_SPACING * (NUM_WHITE_KEYS as f32 - 0.01)),
        Some(KeyId::White(last))
    );
}

#[test]
fn first_black_key_selected_between_a_and_b() {
    // 2.5 world units is 1.04 white-key widths in, inside Bb0's span.
    assert_eq!(select_key(2.5), Some(KeyId::Black(0)));
    assert_eq!(select_key(2.5).map(KeyId::to_raw), Some(-2));
}

#[test]
fn sub_intervals_within_an_octave() {
    // Sweep the second selection octave (white keys 7..=13, so the previous
    // octave's Ab right edge is reachable). Positions avoid exact interval
    // boundaries; those are covered separately.
    let at = |local: f32| select_key(WHITE_KEY_SPACING * (7.0 + local));
    assert_eq!(at(0.1), Some(KeyId::Black(4))); // right edge of Ab below
    assert_eq!(at(0.5), Some(KeyId::White(7))); // A
    assert_eq!(at(1.0), Some(KeyId::Black(5))); // Bb
    assert_eq!(at(1.6), Some(KeyId::White(8))); // B
    assert_eq!(at(2.3), Some(KeyId::White(9))); // C
    assert_eq!(at(3.0), Some(KeyId::Black(6))); // Db
    assert_eq!(at(3.5), Some(KeyId::White(10))); // D
    assert_eq!(at(4.0), Some(KeyId::Black(7))); // Eb
    assert_eq!(at(4.6), Some(KeyId::White(11))); // E
    assert_eq!(at(5.3), Some(KeyId::White(12))); // F
    assert_eq!(at(6.0), Some(KeyId::Black(8))); // Gb
    assert_eq!(at(6.5), Some(KeyId::White(13))); // G
    assert_eq!(at(6.9), Some(KeyId::Black(9))); // left edge of Ab
}

#[test]
fn interval_boundaries_are_half_open() {
    // Each boundary belongs to the key on its right. Offsets are chosen just
    // inside each side of the boundary to keep the float comparison honest.
    let at = |local: f32| select_key(WHITE_KEY_SPACING * (7.0 + local));
    let boundaries = [
        (0.25, KeyId::Black(4), KeyId::White(7)),
        (0.75, KeyId::White(7), KeyId::Black(5)),
        (1.25, KeyId::Black(5), KeyId::White(8)),
        (2.0, KeyId::White(8), KeyId::White(9)),
        (2.75, KeyId::White(9), KeyId::Black(6)),
        (3.25, KeyId::Black(6), KeyId::White(10)),
        (3.75, KeyId::White(10), KeyId::Black(7)),
        (4.25, KeyId::Black(7), KeyId::White(11)),
        (5.0, KeyId::White(11), KeyId::White(12)),
        (5.75, KeyId::White(12), KeyId::Black(8)),
        (6.25, KeyId::Black(8), KeyId::White(13)),
        (6.75, KeyId::White(13), KeyId::Black(9)),
    ];
    for (boundary, below, above) in boundaries {
        assert_eq!(
            at(boundary - 0.001),
            Some(below),
            "just left of local {boundary}"
        );
        assert_eq!(
            at(boundary + 0.001),
            Some(above),
            "just right of local {boundary}"
        );
    }
}

#[test]
fn exact_boundaries_belong_to_the_right_interval() {
    // With unit spacing every sub-interval edge is an exact binary fraction,
    // so the half-open rule can be asserted literally: the edge itself falls
    // in the interval to its right.
    let at = |local: f32| select_key_in(7.0 + local, 52, 1.0);
    assert_eq!(at(0.25), Some(KeyId::White(7))); // A
    assert_eq!(at(0.75), Some(KeyId::Black(5))); // Bb
    assert_eq!(at(1.25), Some(KeyId::White(8))); // B
    assert_eq!(at(2.0), Some(KeyId::White(9))); // C
    assert_eq!(at(2.75), Some(KeyId::Black(6))); // Db
    assert_eq!(at(3.25), Some(KeyId::White(10))); // D
    assert_eq!(at(3.75), Some(KeyId::Black(7))); // Eb
    assert_eq!(at(4.25), Some(KeyId::White(11))); // E
    assert_eq!(at(5.0), Some(KeyId::White(12))); // F
    assert_eq!(at(5.75), Some(KeyId::Black(8))); // Gb
    assert_eq!(at(6.25), Some(KeyId::White(13))); // G
    assert_eq!(at(6.75), Some(KeyId::Black(9))); // Ab
}

#[test]
fn every_key_is_reachable() {
    let mut white_seen = vec![false; NUM_WHITE_KEYS];
    let mut black_seen = vec![false; NUM_BLACK_KEYS];
    let mut x = 0.0_f32;
    while x < NUM_WHITE_KEYS as f32 * WHITE_KEY_SPACING {
        match select_key(x) {
            Some(KeyId::White(i)) => white_seen[i] = true,
            Some(KeyId::Black(i)) => black_seen[i] = true,
            None => panic!("no key under x = {x}"),
        }
        x += 0.05;
    }
    assert!(white_seen.iter().all(|&seen| seen), "unreachable white key");
    assert!(black_seen.iter().all(|&seen| seen), "unreachable black key");
}

#[test]
fn custom_keyboard_edge_snapping_scales() {
    // A short keyboard with unit spacing: the snap thresholds follow the
    // parameters, not the standard layout.
    assert_eq!(select_key_in(0.5, 8, 1.0), Some(KeyId::White(0)));
    assert_eq!(select_key_in(7.9, 8, 1.0), Some(KeyId::White(7)));
    assert_eq!(select_key_in(8.1, 8, 1.0), None);
}

#[test]
fn raw_encoding_round_trips() {
    assert_eq!(KeyId::White(0).to_raw(), 0);
    assert_eq!(KeyId::White(51).to_raw(), 51);
    assert_eq!(KeyId::Black(0).to_raw(), -2);
    assert_eq!(KeyId::Black(35).to_raw(), -37);
    assert_eq!(KeyId::from_raw(-1), None);
    for id in [KeyId::White(0), KeyId::White(51), KeyId::Black(0), KeyId::Black(35)] {
        assert_eq!(KeyId::from_raw(id.to_raw()), Some(id));
    }
}
