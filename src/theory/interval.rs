//! Interval transposition over the twelve canonical note names.

use super::pitch::PitchClass;

/// Perfect fourth, the IV degree above a root.
pub const PERFECT_FOURTH: i32 = 5;

/// Perfect fifth, the V degree above a root.
pub const PERFECT_FIFTH: i32 = 7;

/// Shift a root name by `semitones`, returning the sharp-spelled result.
///
/// Unknown names transpose from C, as everywhere else in the engine.
pub fn transpose(root_name: &str, semitones: i32) -> &'static str {
    PitchClass::from_name(root_name).transpose(semitones).name()
}
