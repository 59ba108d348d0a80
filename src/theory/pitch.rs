//! Pitch classes and note names: "C#", "Bb", "Eb4" to pitch numbers and back.

use std::fmt;

use serde::{Serialize, Serializer};

/// Canonical sharp-spelled note names, indexed by pitch class.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Flat spellings accepted on input, mapped to their sharp equivalents.
///
/// Only the five black-key flats are covered. "Cb" and "Fb" are left unmapped
/// and resolve to the default pitch class like any other unknown name.
pub const FLAT_TO_SHARP: [(&str, &str); 5] = [
    ("Bb", "A#"),
    ("Eb", "D#"),
    ("Ab", "G#"),
    ("Db", "C#"),
    ("Gb", "F#"),
];

/// Octave used when a note name carries no octave. C4 = 60.
pub const DEFAULT_OCTAVE: i32 = 4;

/// A note identity independent of octave, always in `0..12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Build a pitch class from any integer, reduced modulo 12.
    pub fn new(value: i32) -> Self {
        Self(value.rem_euclid(12) as u8)
    }

    /// Look up a note name. Case-insensitive, flats normalized, unknown names map to C.
    pub fn from_name(name: &str) -> Self {
        Self::lookup(name).unwrap_or_else(|| {
            tracing::debug!(name, "unrecognized note name, defaulting to C");
            Self::C
        })
    }

    /// Strict lookup: `None` when the name is not one of the twelve notes.
    pub fn lookup(name: &str) -> Option<Self> {
        let canonical = canonical_spelling(name);
        let sharp = normalize_flat(&canonical).unwrap_or(canonical.as_str());
        NOTE_NAMES
            .iter()
            .position(|&n| n == sharp)
            .map(|i| Self(i as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }

    /// Shift by a signed number of semitones, wrapping at the octave.
    pub fn transpose(self, semitones: i32) -> Self {
        Self::new(self.0 as i32 + semitones)
    }

    /// The absolute pitch of this class in the given octave.
    pub fn in_octave(self, octave: i32) -> i32 {
        (octave + 1) * 12 + self.0 as i32
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for PitchClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Map a flat spelling ("Bb") to its sharp equivalent ("A#").
///
/// Expects the canonical casing produced by [`canonical_spelling`].
pub fn normalize_flat(name: &str) -> Option<&'static str> {
    FLAT_TO_SHARP
        .iter()
        .find(|(flat, _)| *flat == name)
        .map(|(_, sharp)| *sharp)
}

/// Trim and re-case a note name: letter uppercased, accidental lowercased, so
/// "bb", "BB" and " Bb " all become "Bb" and "c#" becomes "C#".
pub fn canonical_spelling(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.extend(chars.flat_map(char::to_lowercase));
            out
        }
        None => String::new(),
    }
}

/// Note name with octave for an absolute pitch: 60 → "C4", 0 → "C-1".
pub fn note_name(pitch: u8) -> String {
    let class = PitchClass::new(pitch as i32);
    let octave = (pitch as i32).div_euclid(12) - 1;
    format!("{class}{octave}")
}

/// Parse a note name into an absolute pitch.
///
/// Format: `<letter><optional accidental><optional octave>`. A missing octave
/// means [`DEFAULT_OCTAVE`]. An unrecognized letter or accidental yields
/// pitch class C; a malformed octave falls back to the default octave.
/// Results outside the MIDI range are clamped to `0..=127`.
pub fn parse_note_name(name: &str) -> u8 {
    let trimmed = name.trim();
    let split = trimmed
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '-' || c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let (note, octave) = trimmed.split_at(split);

    let class = PitchClass::from_name(note);
    let octave = if octave.is_empty() {
        DEFAULT_OCTAVE
    } else {
        octave.parse().unwrap_or(DEFAULT_OCTAVE)
    };

    class.in_octave(octave).clamp(0, 127) as u8
}
