//! Keyboard construction: the fixed musical layout table and the registry of
//! keys built from it.
//!
//! The real keyboard is not aligned to octave boundaries: it begins on a
//! partial octave (A0, Bb0, B0), runs through seven complete octaves, and
//! ends on an isolated C8.

use crate::audio::midi_to_hz;
use crate::constants::{NUM_OCTAVES, WHITE_KEY_SPACING};
use crate::select::KeyId;
use crate::state::KeyState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    White,
    Black,
}

/// Which sides of a white key are cut away to make room for black keys.
/// Geometry-only classification consumed by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notch {
    None,
    Left,
    Right,
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteName {
    C,
    Db,
    D,
    Eb,
    E,
    F,
    Gb,
    G,
    Ab,
    A,
    Bb,
    B,
}

impl NoteName {
    /// Lowercase spelling used in sound asset names.
    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "c",
            NoteName::Db => "db",
            NoteName::D => "d",
            NoteName::Eb => "eb",
            NoteName::E => "e",
            NoteName::F => "f",
            NoteName::Gb => "gb",
            NoteName::G => "g",
            NoteName::Ab => "ab",
            NoteName::A => "a",
            NoteName::Bb => "bb",
            NoteName::B => "b",
        }
    }

    /// Semitone offset from C within the octave.
    pub fn semitone(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::Db => 1,
            NoteName::D => 2,
            NoteName::Eb => 3,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::Gb => 6,
            NoteName::G => 7,
            NoteName::Ab => 8,
            NoteName::A => 9,
            NoteName::Bb => 10,
            NoteName::B => 11,
        }
    }
}

/// One octave of the layout in pitch order: each white key with its notch
/// classification and the black key, if any, overlapping its right edge.
const OCTAVE_PATTERN: [(NoteName, Notch, Option<NoteName>); 7] = [
    (NoteName::C, Notch::Right, Some(NoteName::Db)),
    (NoteName::D, Notch::Both, Some(NoteName::Eb)),
    (NoteName::E, Notch::Left, None),
    (NoteName::F, Notch::Right, Some(NoteName::Gb)),
    (NoteName::G, Notch::Both, Some(NoteName::Ab)),
    (NoteName::A, Notch::Both, Some(NoteName::Bb)),
    (NoteName::B, Notch::Left, None),
];

/// One playable key. Identity and geometry are fixed at construction; only
/// the press [`KeyState`] mutates afterwards.
#[derive(Clone, Debug)]
pub struct Key {
    kind: KeyKind,
    index: usize,
    octave: u8,
    note: NoteName,
    notch: Notch,
    note_position: f32,
    pub state: KeyState,
}

impl Key {
    fn new(kind: KeyKind, index: usize, octave: u8, note: NoteName, notch: Notch, x: f32) -> Self {
        Self {
            kind,
            index,
            octave,
            note,
            notch,
            note_position: x,
            state: KeyState::default(),
        }
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Contiguous index within this key's kind, left to right from 0.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    pub fn note(&self) -> NoteName {
        self.note
    }

    pub fn notch(&self) -> Notch {
        self.notch
    }

    /// World x-coordinate. A black key shares the position of the white key
    /// it follows; its mesh carries the offset within that span.
    pub fn note_position(&self) -> f32 {
        self.note_position
    }

    pub fn id(&self) -> KeyId {
        match self.kind {
            KeyKind::White => KeyId::White(self.index),
            KeyKind::Black => KeyId::Black(self.index),
        }
    }

    /// Asset naming convention `<octave><note>`: "0a", "0bb", "1c", ... "8c".
    pub fn name(&self) -> String {
        format!("{}{}", self.octave, self.note.as_str())
    }

    /// MIDI note number; A0 is 21, C8 is 108.
    pub fn midi(&self) -> i32 {
        12 * (self.octave as i32 + 1) + self.note.semitone()
    }

    pub fn frequency_hz(&self) -> f32 {
        midi_to_hz(self.midi() as f32)
    }
}

/// Ordered collections of white and black keys with stable indices and
/// x-positions, built once from the layout table.
#[derive(Clone, Debug)]
pub struct KeyRegistry {
    spacing: f32,
    white: Vec<Key>,
    black: Vec<Key>,
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new(NUM_OCTAVES, WHITE_KEY_SPACING)
    }
}

impl KeyRegistry {
    /// Builds the full keyboard: leading A and B, `octaves` complete octaves,
    /// and the trailing lone C. Total over any valid `octaves`/`spacing`.
    pub fn new(octaves: usize, spacing: f32) -> Self {
        let mut white = Vec::with_capacity(octaves * 7 + 3);
        let mut black = Vec::with_capacity(octaves * 5 + 1);
        let mut x = 0.0_f32;

        // Leading partial octave: the keyboard starts on A0.
        white.push(Key::new(KeyKind::White, white.len(), 0, NoteName::A, Notch::Right, x));
        black.push(Key::new(KeyKind::Black, black.len(), 0, NoteName::Bb, Notch::None, x));
        x += spacing;
        white.push(Key::new(KeyKind::White, white.len(), 0, NoteName::B, Notch::Left, x));
        x += spacing;

        for octave in 1..=octaves {
            for (note, notch, black_note) in OCTAVE_PATTERN {
                white.push(Key::new(KeyKind::White, white.len(), octave as u8, note, notch, x));
                if let Some(black_note) = black_note {
                    black.push(Key::new(
                        KeyKind::Black,
                        black.len(),
                        octave as u8,
                        black_note,
                        Notch::None,
                        x,
                    ));
                }
                x += spacing;
            }
        }

        // The trailing C has no neighbours, so no notches.
        white.push(Key::new(
            KeyKind::White,
            white.len(),
            octaves as u8 + 1,
            NoteName::C,
            Notch::None,
            x,
        ));

        Self { spacing, white, black }
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn white_keys(&self) -> &[Key] {
        &self.white
    }

    pub fn black_keys(&self) -> &[Key] {
        &self.black
    }

    pub fn num_white_keys(&self) -> usize {
        self.white.len()
    }

    pub fn num_black_keys(&self) -> usize {
        self.black.len()
    }

    pub fn contains(&self, id: KeyId) -> bool {
        match id {
            KeyId::White(i) => i < self.white.len(),
            KeyId::Black(i) => i < self.black.len(),
        }
    }

    pub fn key(&self, id: KeyId) -> Option<&Key> {
        match id {
            KeyId::White(i) => self.white.get(i),
            KeyId::Black(i) => self.black.get(i),
        }
    }

    pub fn key_mut(&mut self, id: KeyId) -> Option<&mut Key> {
        match id {
            KeyId::White(i) => self.white.get_mut(i),
            KeyId::Black(i) => self.black.get_mut(i),
        }
    }
}
