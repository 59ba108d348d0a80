//! Scale suggestions for a chord: the deterministic local table.
//!
//! Chords are sorted into a coarse category and each category maps to a fixed
//! list of scales. Anything that is not clearly major or minor gets the major
//! pentatonic, so the list is never empty.

use serde::Serialize;

use super::pitch::PitchClass;

/// Scales the local table can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleKind {
    MajorPentatonic,
    Ionian,
    MinorPentatonic,
    Aeolian,
}

impl ScaleKind {
    pub fn intervals(self) -> &'static [i32] {
        match self {
            ScaleKind::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleKind::Ionian => &[0, 2, 4, 5, 7, 9, 11],
            ScaleKind::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleKind::Aeolian => &[0, 2, 3, 5, 7, 8, 10],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScaleKind::MajorPentatonic => "Major Pentatonic",
            ScaleKind::Ionian => "Ionian (Major)",
            ScaleKind::MinorPentatonic => "Minor Pentatonic",
            ScaleKind::Aeolian => "Aeolian (Natural Minor)",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ScaleKind::MajorPentatonic => {
                "Five-note major scale without the 4th and 7th; no avoid notes over the chord."
            }
            ScaleKind::Ionian => "The full major scale; treat the 4th as a passing tone.",
            ScaleKind::MinorPentatonic => {
                "Five-note minor scale; the go-to choice for blues and rock soloing."
            }
            ScaleKind::Aeolian => "Natural minor; the b6 gives a darker colour than Dorian.",
        }
    }

    /// Spell the scale from `root` by stepping the interval pattern.
    pub fn build(self, root: PitchClass) -> ScaleSuggestion {
        ScaleSuggestion {
            name: format!("{root} {}", self.label()),
            notes: self
                .intervals()
                .iter()
                .map(|&step| root.transpose(step))
                .collect(),
            description: self.description().to_string(),
            source: SuggestionSource::Local,
        }
    }
}

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Local,
    Remote,
}

/// A named scale to play over a chord. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScaleSuggestion {
    pub name: String,
    pub notes: Vec<PitchClass>,
    pub description: String,
    pub source: SuggestionSource,
}

/// Coarse chord family used to pick scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordCategory {
    Major,
    Minor,
    Other,
}

impl ChordCategory {
    /// Classify a chord type name. Unrecognized strings are `Other`; they do
    /// not take the major default that chord resolution uses.
    pub fn classify(chord_type_name: &str) -> Self {
        match chord_type_name.trim().to_lowercase().as_str() {
            "major" | "major7" | "dominant7" => ChordCategory::Major,
            "minor" | "minor7" => ChordCategory::Minor,
            _ => ChordCategory::Other,
        }
    }

    pub fn scales(self) -> &'static [ScaleKind] {
        match self {
            ChordCategory::Major => &[ScaleKind::MajorPentatonic, ScaleKind::Ionian],
            ChordCategory::Minor => &[ScaleKind::MinorPentatonic, ScaleKind::Aeolian],
            ChordCategory::Other => &[ScaleKind::MajorPentatonic],
        }
    }
}

/// Local scale suggestions for a chord. Same input, same output.
pub fn suggest_scales(root_name: &str, chord_type_name: &str) -> Vec<ScaleSuggestion> {
    let root = PitchClass::from_name(root_name);
    ChordCategory::classify(chord_type_name)
        .scales()
        .iter()
        .map(|kind| kind.build(root))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(notes: &[PitchClass]) -> Vec<&'static str> {
        notes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn major_family_gets_pentatonic_and_ionian() {
        let scales = suggest_scales("C", "major");
        assert_eq!(scales.len(), 2);
        assert_eq!(scales[0].name, "C Major Pentatonic");
        assert_eq!(names(&scales[0].notes), ["C", "D", "E", "G", "A"]);
        assert_eq!(names(&scales[1].notes), ["C", "D", "E", "F", "G", "A", "B"]);
    }

    #[test]
    fn dominant_seventh_is_major_family() {
        let scales = suggest_scales("G", "dominant7");
        assert_eq!(scales[1].name, "G Ionian (Major)");
        assert_eq!(names(&scales[1].notes), ["G", "A", "B", "C", "D", "E", "F#"]);
    }

    #[test]
    fn minor_family_gets_minor_scales() {
        let scales = suggest_scales("A", "minor7");
        assert_eq!(scales.len(), 2);
        assert_eq!(names(&scales[0].notes), ["A", "C", "D", "E", "G"]);
        assert_eq!(names(&scales[1].notes), ["A", "B", "C", "D", "E", "F", "G"]);
    }

    #[test]
    fn other_and_unknown_get_major_pentatonic() {
        for chord_type in ["diminished", "power", "augmented", "bogus", ""] {
            let scales = suggest_scales("D", chord_type);
            assert_eq!(scales.len(), 1, "{chord_type}");
            assert_eq!(scales[0].name, "D Major Pentatonic");
            assert_eq!(names(&scales[0].notes), ["D", "E", "F#", "A", "B"]);
        }
    }

    #[test]
    fn flat_root_is_sharp_spelled() {
        let scales = suggest_scales("Eb", "minor");
        assert_eq!(names(&scales[0].notes), ["D#", "F#", "G#", "A#", "C#"]);
    }

    #[test]
    fn deterministic() {
        assert_eq!(suggest_scales("F#", "minor"), suggest_scales("F#", "minor"));
    }

    #[test]
    fn local_source() {
        assert!(suggest_scales("C", "major")
            .iter()
            .all(|s| s.source == SuggestionSource::Local));
    }
}
