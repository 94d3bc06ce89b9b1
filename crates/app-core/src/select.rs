//! Key selection: mapping a world x-coordinate to the key underneath it.
//!
//! The keyboard is an irregular union of white and black keys following the
//! 12-note pattern, so the mapping is not a simple division by key width.
//! Each octave of seven white-key widths is cut into thirteen sub-intervals
//! whose widths reflect how far each black key overlaps its neighbours.

use crate::constants::{NUM_WHITE_KEYS, WHITE_KEYS_PER_OCTAVE, WHITE_KEY_SPACING};

/// Identity of one playable key.
///
/// The index is contiguous from 0 within each kind, in left-to-right
/// physical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyId {
    White(usize),
    Black(usize),
}

impl KeyId {
    /// Legacy single-integer encoding: `>= 0` is a white index, `-1` is no
    /// selection, `<= -2` is black index `-(raw + 2)`.
    pub fn to_raw(self) -> i32 {
        match self {
            KeyId::White(i) => i as i32,
            KeyId::Black(i) => -(i as i32) - 2,
        }
    }

    /// Inverse of [`KeyId::to_raw`]; `-1` decodes to `None`.
    pub fn from_raw(raw: i32) -> Option<KeyId> {
        match raw {
            r if r >= 0 => Some(KeyId::White(r as usize)),
            -1 => None,
            r => Some(KeyId::Black((-(r + 2)) as usize)),
        }
    }
}

/// Returns the key under world x-coordinate `x` on the standard keyboard,
/// or `None` left or right of it.
pub fn select_key(x: f32) -> Option<KeyId> {
    select_key_in(x, NUM_WHITE_KEYS, WHITE_KEY_SPACING)
}

/// Selection over a keyboard of `num_white_keys` white keys spaced `spacing`
/// apart. Total over all finite inputs; never panics.
pub fn select_key_in(x: f32, num_white_keys: usize, spacing: f32) -> Option<KeyId> {
    let x = x as f64;
    let spacing = spacing as f64;
    let num_white = num_white_keys as f64;

    if x < 0.0 {
        return None;
    }
    // Snap to the first key: no black key exists at the far left edge, so
    // anything this small is the leading white key.
    if x < spacing * 0.75 {
        return Some(KeyId::White(0));
    }
    if x > num_white * spacing {
        return None;
    }
    // Symmetric snap at the right edge.
    if x > (num_white - 0.5) * spacing {
        return Some(KeyId::White(num_white_keys - 1));
    }

    // Continuous position in white-key units, reduced to the octave it falls
    // in. Octave 0 here spans white keys A through G regardless of where the
    // musical octave boundary sits.
    let key_index = x / spacing;
    let octave = (key_index / WHITE_KEYS_PER_OCTAVE as f64) as usize;
    let local = key_index % WHITE_KEYS_PER_OCTAVE as f64;

    let white = |offset: usize| Some(KeyId::White(octave * 7 + offset));
    let black = |offset: usize| Some(KeyId::Black(octave * 5 + offset));

    if local < 0.25 {
        // Right edge of the previous octave's Ab. Unreachable for octave 0:
        // those positions were snapped to the first key above.
        return Some(KeyId::Black(octave * 5 - 1));
    }
    if local < 0.75 {
        return white(0); // A
    }
    if local < 1.25 {
        return black(0); // Bb
    }
    if local < 2.0 {
        return white(1); // B
    }
    if local < 2.75 {
        return white(2); // C
    }
    if local < 3.25 {
        return black(1); // Db
    }
    if local < 3.75 {
        return white(3); // D
    }
    if local < 4.25 {
        return black(2); // Eb
    }
    if local < 5.0 {
        return white(4); // E
    }
    if local < 5.75 {
        return white(5); // F
    }
    if local < 6.25 {
        return black(3); // Gb
    }
    if local < 6.75 {
        return white(6); // G
    }
    black(4) // Ab, approached from its left edge
}
