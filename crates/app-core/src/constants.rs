use std::time::Duration;

// Keyboard geometry and animation tuning shared across the core and frontends.

/// Complete octaves (C through B) on the keyboard.
pub const NUM_OCTAVES: usize = 7;
/// White keys in one octave.
pub const WHITE_KEYS_PER_OCTAVE: usize = 7;
/// Black keys in one octave.
pub const BLACK_KEYS_PER_OCTAVE: usize = 5;

/// Two leading partial-octave keys (A, B) plus the lone trailing C.
pub const NUM_WHITE_KEYS: usize = NUM_OCTAVES * WHITE_KEYS_PER_OCTAVE + 3; // 52
/// One leading Bb plus five per complete octave.
pub const NUM_BLACK_KEYS: usize = NUM_OCTAVES * BLACK_KEYS_PER_OCTAVE + 1; // 36

/// Distance between the left edges of adjacent white keys, in world units.
pub const WHITE_KEY_SPACING: f32 = 2.4;

/// Discrete steps a key travels between released and fully pressed.
pub const PRESS_INTERVALS: i32 = 5;
/// Total downward travel of a fully pressed key.
pub const KEYPRESS_DEPTH: f32 = 1.0;
/// Downward travel applied per animation tick.
pub const PRESS_STEP: f32 = KEYPRESS_DEPTH / PRESS_INTERVALS as f32;

/// Tick interval while a key is being pressed down.
pub const KEY_DOWN_INTERVAL: Duration = Duration::from_millis(10);
/// Tick interval while a key is easing back up.
pub const KEY_UP_INTERVAL: Duration = Duration::from_millis(8);
/// Fade applied to a note when its key is released.
pub const SOUND_FADE_OUT: Duration = Duration::from_millis(1000);
