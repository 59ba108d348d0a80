//! Timed chord events handed to the output strategies.

use crate::theory::{ChordInstance, Progression};

/// Highest MIDI velocity.
pub const MAX_VELOCITY: u8 = 127;

/// Accepted tempo range in beats per minute.
pub const MIN_TEMPO_BPM: f64 = 20.0;
pub const MAX_TEMPO_BPM: f64 = 999.0;

/// Longest single chord, in seconds.
pub const MAX_CHORD_SECONDS: f64 = 60.0;

/// A chord sounding for a span of time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordEvent {
    pub pitches: Vec<u8>,
    /// Start time in seconds.
    pub start: f64,
    /// Length in seconds.
    pub duration: f64,
    pub velocity: u8,
}

impl ChordEvent {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// What to play or export: chord events in start order, plus the tempo the
/// exporter records.
#[derive(Debug, Clone, PartialEq)]
pub struct Performance {
    events: Vec<ChordEvent>,
    tempo_bpm: f64,
}

impl Performance {
    /// A single chord held for `duration` seconds.
    pub fn chord(pitches: Vec<u8>, duration: f64, velocity: u8, tempo_bpm: f64) -> Self {
        Self {
            events: vec![ChordEvent {
                pitches,
                start: 0.0,
                duration,
                velocity: velocity.min(MAX_VELOCITY),
            }],
            tempo_bpm,
        }
    }

    /// Chords back to back, each lasting its progression duration in beats.
    pub fn progression(progression: &Progression, tempo_bpm: f64, velocity: u8) -> Self {
        let seconds_per_beat = 60.0 / tempo_bpm;
        let mut start = 0.0;
        let events = progression
            .entries()
            .iter()
            .map(|entry| {
                let duration = entry.duration * seconds_per_beat;
                let event = ChordEvent {
                    pitches: entry.chord.pitches(),
                    start,
                    duration,
                    velocity: velocity.min(MAX_VELOCITY),
                };
                start += duration;
                event
            })
            .collect();
        Self { events, tempo_bpm }
    }

    /// Convenience for one chord instance.
    pub fn from_chord(chord: &ChordInstance, duration: f64, velocity: u8, tempo_bpm: f64) -> Self {
        Self::chord(chord.pitches(), duration, velocity, tempo_bpm)
    }

    pub fn events(&self) -> &[ChordEvent] {
        &self.events
    }

    pub fn tempo_bpm(&self) -> f64 {
        self.tempo_bpm
    }

    /// End of the last event, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.events.iter().map(ChordEvent::end).fold(0.0, f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.events.iter().all(|e| e.pitches.is_empty())
    }
}
