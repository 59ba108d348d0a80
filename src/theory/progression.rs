//! Chord progressions and the fixed 12-bar blues form.

use serde::Serialize;

use super::chord::{ChordInstance, ChordType};
use super::interval::{PERFECT_FIFTH, PERFECT_FOURTH};
use super::pitch::PitchClass;

/// Beats in one 4/4 bar.
pub const BEATS_PER_BAR: f64 = 4.0;

/// Scale degrees used by the blues form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Degree {
    I,
    IV,
    V,
}

impl Degree {
    fn semitones(self) -> i32 {
        match self {
            Degree::I => 0,
            Degree::IV => PERFECT_FOURTH,
            Degree::V => PERFECT_FIFTH,
        }
    }
}

use Degree::{I, IV, V};

/// The 12-bar blues, one degree per bar.
const TWELVE_BAR_BLUES: [Degree; 12] = [I, I, I, I, IV, IV, I, I, V, IV, I, I];

/// One chord in a progression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressionEntry {
    /// 1-based bar number.
    pub bar: u32,
    pub chord: ChordInstance,
    /// Length in beats.
    pub duration: f64,
}

/// An ordered, immutable sequence of chords.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progression {
    key: String,
    entries: Vec<ProgressionEntry>,
    total_bars: u32,
    description: String,
}

impl Progression {
    /// Build a progression. `total_bars` defaults to the highest bar number.
    pub fn new(
        key: impl Into<String>,
        entries: Vec<ProgressionEntry>,
        total_bars: Option<u32>,
        description: impl Into<String>,
    ) -> Self {
        let highest = entries.iter().map(|e| e.bar).max().unwrap_or(0);
        Self {
            key: key.into(),
            total_bars: total_bars.unwrap_or(highest).max(highest),
            entries,
            description: description.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn entries(&self) -> &[ProgressionEntry] {
        &self.entries
    }

    pub fn total_bars(&self) -> u32 {
        self.total_bars
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry durations, in beats.
    pub fn total_beats(&self) -> f64 {
        self.entries.iter().map(|e| e.duration).sum()
    }
}

/// The 12-bar blues in `root_name`: I I I I IV IV I I V IV I I, all major.
pub fn build_12_bar_blues(root_name: &str) -> Progression {
    let root = PitchClass::from_name(root_name);
    let entries = TWELVE_BAR_BLUES
        .iter()
        .zip(1u32..)
        .map(|(degree, bar)| ProgressionEntry {
            bar,
            chord: ChordInstance::new(root.transpose(degree.semitones()), ChordType::Major),
            duration: BEATS_PER_BAR,
        })
        .collect();

    Progression::new(
        root.name(),
        entries,
        Some(TWELVE_BAR_BLUES.len() as u32),
        format!("12-bar blues in {root}"),
    )
}
