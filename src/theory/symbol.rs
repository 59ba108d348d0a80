//! Chord-symbol parsing: "Fm7", "C major", "Bb dim" → root + chord type.

use serde::Serialize;

use super::chord::{ChordInstance, ChordType};
use super::pitch::{normalize_flat, PitchClass};

/// Alias substrings checked against the lowercased text after the root.
///
/// The first alias contained in the text wins, so longer and more specific
/// aliases sit ahead of the ones they contain ("maj7" before "maj", "dim"
/// and "dom" before "min", bare "m" last). Every canonical type name resolves
/// to its own type.
pub const CHORD_ALIASES: [(&str, ChordType); 21] = [
    ("major7", ChordType::Major7),
    ("minor7", ChordType::Minor7),
    ("diminished7", ChordType::Diminished7),
    ("dim7", ChordType::Diminished7),
    ("°7", ChordType::Diminished7),
    ("maj7", ChordType::Major7),
    ("min7", ChordType::Minor7),
    ("m7", ChordType::Minor7),
    ("dom", ChordType::Dominant7),
    ("dim", ChordType::Diminished),
    ("°", ChordType::Diminished),
    ("aug", ChordType::Augmented),
    ("+", ChordType::Augmented),
    ("power", ChordType::Power),
    ("major", ChordType::Major),
    ("minor", ChordType::Minor),
    ("maj", ChordType::Major),
    ("min", ChordType::Minor),
    ("7", ChordType::Dominant7),
    ("5", ChordType::Power),
    ("m", ChordType::Minor),
];

/// Result of parsing a chord symbol.
///
/// `root` keeps the parsed spelling. It is sharp-spelled whenever the root was
/// recognized; an unmapped flat such as "Cb" is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordSymbol {
    pub root: String,
    pub chord_type: ChordType,
}

impl ChordSymbol {
    pub fn to_instance(&self) -> ChordInstance {
        ChordInstance::new(PitchClass::from_name(&self.root), self.chord_type)
    }
}

/// Parse free-text chord notation.
///
/// The first character (uppercased) is the root letter. A following `#` is
/// appended; a following `b` makes a flat which goes through the flat→sharp
/// table. The lowercased remainder is matched against [`CHORD_ALIASES`];
/// no match means major. Empty input parses as C major.
pub fn parse_chord_symbol(text: &str) -> ChordSymbol {
    let text = text.trim();
    let mut chars = text.char_indices();

    let Some((_, first)) = chars.next() else {
        return ChordSymbol {
            root: "C".to_string(),
            chord_type: ChordType::Major,
        };
    };

    let mut root: String = first.to_uppercase().collect();
    let mut rest_start = first.len_utf8();

    match chars.next() {
        Some((i, '#')) => {
            root.push('#');
            rest_start = i + 1;
        }
        Some((i, 'b')) => {
            root.push('b');
            rest_start = i + 1;
            match normalize_flat(&root) {
                Some(sharp) => root = sharp.to_string(),
                None => tracing::warn!(root = %root, "flat root has no sharp mapping"),
            }
        }
        _ => {}
    }

    let remainder = text[rest_start..].to_lowercase();
    let chord_type = CHORD_ALIASES
        .iter()
        .find(|(alias, _)| remainder.contains(alias))
        .map(|(_, t)| *t)
        .unwrap_or(ChordType::Major);

    ChordSymbol { root, chord_type }
}
