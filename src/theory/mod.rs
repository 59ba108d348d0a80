//! Music theory engine: note names, chord patterns, transposition, scales, progressions.
//!
//! Everything here is pure and deterministic over constant tables. Unknown input
//! never errors: note names default to C and chord types default to major.

pub mod chord;
pub mod interval;
pub mod pitch;
pub mod progression;
pub mod scale;
pub mod symbol;

pub use chord::{resolve_chord, ChordInstance, ChordType};
pub use interval::{transpose, PERFECT_FIFTH, PERFECT_FOURTH};
pub use pitch::{note_name, parse_note_name, PitchClass, NOTE_NAMES};
pub use progression::{build_12_bar_blues, Progression, ProgressionEntry, BEATS_PER_BAR};
pub use scale::{suggest_scales, ChordCategory, ScaleKind, ScaleSuggestion, SuggestionSource};
pub use symbol::{parse_chord_symbol, ChordSymbol};
