//! Request and response shapes for the chord service.
//!
//! Requests deserialize leniently: every field has a default. Responses skip
//! fields that do not apply, so a successful audio response carries a
//! `driver` but no `file_path`, and so on.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ai::Origin;
use crate::output::{Delivered, Method};
use crate::theory::{note_name, ChordType, PitchClass, Progression, ScaleSuggestion};

/// Message used whenever a request cannot be processed at all.
pub const REQUEST_FAILED: &str = "An error occurred while processing the request";

fn default_root() -> String {
    "C".to_string()
}

fn default_chord_type() -> String {
    "major".to_string()
}

/// Play (or export) one chord.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChordRequest {
    #[serde(default = "default_root")]
    pub root_note: String,
    #[serde(default = "default_chord_type")]
    pub chord_type: String,
    /// Free-text chord symbol ("F#m7"). Takes precedence over root and type.
    #[serde(default)]
    pub symbol: Option<String>,
    /// Seconds; config default when absent.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Clamped to 0-127; config default when absent.
    #[serde(default)]
    pub velocity: Option<i64>,
}

impl Default for ChordRequest {
    fn default() -> Self {
        Self {
            root_note: default_root(),
            chord_type: default_chord_type(),
            symbol: None,
            duration: None,
            velocity: None,
        }
    }
}

impl ChordRequest {
    pub fn new(root_note: impl Into<String>, chord_type: impl Into<String>) -> Self {
        Self {
            root_note: root_note.into(),
            chord_type: chord_type.into(),
            ..Self::default()
        }
    }

    pub fn from_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }
}

/// Play (or export) a progression: suggested for a song title, or the
/// 12-bar blues on a root.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgressionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub root_note: Option<String>,
    #[serde(default)]
    pub tempo_bpm: Option<f64>,
    #[serde(default)]
    pub velocity: Option<i64>,
}

/// Scales to play over a chord.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScaleRequest {
    #[serde(default = "default_root")]
    pub root_note: String,
    #[serde(default = "default_chord_type")]
    pub chord_type: String,
}

impl Default for ScaleRequest {
    fn default() -> Self {
        Self {
            root_note: default_root(),
            chord_type: default_chord_type(),
        }
    }
}

/// Delivery details shared by chord and progression responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Delivery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Delivered> for Delivery {
    fn from(delivered: Delivered) -> Self {
        Self {
            method: Some(delivered.method),
            driver: delivered.driver,
            file_path: delivered.file_path,
            error: None,
        }
    }
}

impl Delivery {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChordResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chord_notes: Vec<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub note_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chord_type: Option<ChordType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_note: Option<PitchClass>,
    #[serde(flatten)]
    pub delivery: Delivery,
    pub message: String,
}

impl ChordResponse {
    /// A request that never reached chord resolution.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            chord_notes: Vec::new(),
            note_names: Vec::new(),
            chord_type: None,
            root_note: None,
            delivery: Delivery::failed(error),
            message: REQUEST_FAILED.to_string(),
        }
    }
}

/// One progression entry as reported back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarView {
    pub bar: u32,
    pub chord: String,
    /// Beats.
    pub duration: f64,
    pub pitches: Vec<u8>,
    pub note_names: Vec<String>,
}

/// Flatten a progression for reporting.
pub fn bar_views(progression: &Progression) -> Vec<BarView> {
    progression
        .entries()
        .iter()
        .map(|entry| {
            let pitches = entry.chord.pitches();
            BarView {
                bar: entry.bar,
                chord: entry.chord.symbol(),
                duration: entry.duration,
                note_names: pitches.iter().map(|&p| note_name(p)).collect(),
                pitches,
            }
        })
        .collect()
}

/// Where a suggestion came from, as reported back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceView {
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl From<Origin> for SourceView {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Remote => Self {
                source: "remote",
                fallback_reason: None,
            },
            Origin::Fallback { reason } => Self {
                source: "fallback",
                fallback_reason: Some(reason),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_bars: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bars: Vec<BarView>,
    #[serde(flatten)]
    pub source: Option<SourceView>,
    #[serde(flatten)]
    pub delivery: Delivery,
    pub message: String,
}

impl ProgressionResponse {
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            key: None,
            description: None,
            total_bars: None,
            bars: Vec::new(),
            source: None,
            delivery: Delivery::failed(error),
            message: REQUEST_FAILED.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleResponse {
    pub success: bool,
    pub root_note: PitchClass,
    pub chord_type: String,
    pub scales: Vec<ScaleSuggestion>,
    #[serde(flatten)]
    pub source: SourceView,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(flatten)]
    pub source: Option<SourceView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

impl SheetResponse {
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            title: None,
            markdown: None,
            source: None,
            error: Some(error.into()),
            message: REQUEST_FAILED.to_string(),
        }
    }
}
