//! Chord patterns and chord resolution: ("C", "major") → [60, 64, 67].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pitch::{note_name, PitchClass, DEFAULT_OCTAVE};

/// Chord quality, one entry per fixed semitone pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChordType {
    #[default]
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Minor7,
    Dominant7,
    Diminished7,
    Power,
}

impl ChordType {
    pub const ALL: [ChordType; 9] = [
        ChordType::Major,
        ChordType::Minor,
        ChordType::Diminished,
        ChordType::Augmented,
        ChordType::Major7,
        ChordType::Minor7,
        ChordType::Dominant7,
        ChordType::Diminished7,
        ChordType::Power,
    ];

    /// Semitone offsets from the root, root first.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordType::Major => &[0, 4, 7],
            ChordType::Minor => &[0, 3, 7],
            ChordType::Diminished => &[0, 3, 6],
            ChordType::Augmented => &[0, 4, 8],
            ChordType::Major7 => &[0, 4, 7, 11],
            ChordType::Minor7 => &[0, 3, 7, 10],
            ChordType::Dominant7 => &[0, 4, 7, 10],
            ChordType::Diminished7 => &[0, 3, 6, 9],
            ChordType::Power => &[0, 7],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChordType::Major => "major",
            ChordType::Minor => "minor",
            ChordType::Diminished => "diminished",
            ChordType::Augmented => "augmented",
            ChordType::Major7 => "major7",
            ChordType::Minor7 => "minor7",
            ChordType::Dominant7 => "dominant7",
            ChordType::Diminished7 => "diminished7",
            ChordType::Power => "power",
        }
    }

    /// Exact (trimmed, case-insensitive) lookup by canonical name.
    pub fn lookup(name: &str) -> Option<Self> {
        let wanted = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.name() == wanted)
    }

    /// Lookup with the permissive default: unknown names resolve to major.
    pub fn from_name(name: &str) -> Self {
        Self::lookup(name).unwrap_or_else(|| {
            tracing::debug!(name, "unknown chord type, using major");
            ChordType::Major
        })
    }
}

impl fmt::Display for ChordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A root plus a chord pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChordInstance {
    pub root: PitchClass,
    pub chord_type: ChordType,
}

impl ChordInstance {
    pub fn new(root: PitchClass, chord_type: ChordType) -> Self {
        Self { root, chord_type }
    }

    /// Build from user-facing names with the usual defaults for unknown input.
    pub fn from_names(root_name: &str, chord_type_name: &str) -> Self {
        Self::new(
            PitchClass::from_name(root_name),
            ChordType::from_name(chord_type_name),
        )
    }

    /// Absolute pitch of the root in the default octave (C → 60).
    pub fn root_pitch(&self) -> u8 {
        self.root.in_octave(DEFAULT_OCTAVE) as u8
    }

    /// Absolute pitches in pattern order.
    pub fn pitches(&self) -> Vec<u8> {
        let base = self.root_pitch();
        self.chord_type
            .intervals()
            .iter()
            .map(|offset| base + offset)
            .collect()
    }

    /// Note names with octave, e.g. ["C4", "E4", "G4"].
    pub fn note_names(&self) -> Vec<String> {
        self.pitches().into_iter().map(note_name).collect()
    }

    /// Short chord label, e.g. "C", "F#m7", "Gdim".
    pub fn symbol(&self) -> String {
        let suffix = match self.chord_type {
            ChordType::Major => "",
            ChordType::Minor => "m",
            ChordType::Diminished => "dim",
            ChordType::Augmented => "aug",
            ChordType::Major7 => "maj7",
            ChordType::Minor7 => "m7",
            ChordType::Dominant7 => "7",
            ChordType::Diminished7 => "dim7",
            ChordType::Power => "5",
        };
        format!("{}{suffix}", self.root)
    }
}

impl fmt::Display for ChordInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.root, self.chord_type)
    }
}

/// Resolve a root name and chord type name to absolute pitches.
pub fn resolve_chord(root_name: &str, chord_type_name: &str) -> Vec<u8> {
    ChordInstance::from_names(root_name, chord_type_name).pitches()
}
