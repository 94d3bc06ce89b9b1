//! Sound playback collaborator interface and pitch helpers.

use std::time::Duration;

use crate::layout::Key;

/// Selected timbre applied to subsequent key presses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Voice {
    #[default]
    Organ,
    Piano,
}

impl Voice {
    /// Folder holding this voice's per-key sound assets, named
    /// `<octave><note>` ("0a", "0bb", "1c", ...).
    pub fn asset_folder(self) -> &'static str {
        match self {
            Voice::Organ => "organ_sounds",
            Voice::Piano => "piano_sounds",
        }
    }

    /// The next voice in the cycle.
    pub fn next(self) -> Voice {
        match self {
            Voice::Organ => Voice::Piano,
            Voice::Piano => Voice::Organ,
        }
    }
}

/// Opaque handle to a playing note, issued by an [`AudioSink`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelId(pub u64);

/// Playback collaborator driven by the keyboard controller.
///
/// `play` returning `None` means the note is unavailable (missing asset, no
/// output device); the key still animates and plays silently.
pub trait AudioSink {
    fn play(&mut self, voice: Voice, key: &Key) -> Option<ChannelId>;
    fn fade_out(&mut self, channel: ChannelId, duration: Duration);
}

/// Sink that plays nothing. Stands in when no output device is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, _voice: Voice, _key: &Key) -> Option<ChannelId> {
        None
    }

    fn fade_out(&mut self, _channel: ChannelId, _duration: Duration) {}
}

/// Equal-tempered frequency for a MIDI note number (A4 = 69 = 440 Hz).
pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}
