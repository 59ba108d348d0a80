//! Standard MIDI File export.
//!
//! Output is SMF format 1: a tempo track followed by one note track. Every
//! chord event becomes a block of note-ons at its start and note-offs at its
//! end, all on channel 0 with a piano program.

use std::path::{Path, PathBuf};

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};

use super::ExportError;
use crate::output::{Delivered, Method, OutputError, OutputStrategy, Performance};

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Default file name inside the export directory.
pub const DEFAULT_FILE_NAME: &str = "chord_output.mid";

/// General MIDI acoustic grand piano.
const PIANO_PROGRAM: u8 = 0;

const CHANNEL: u8 = 0;

/// Largest value a `u24` tempo field holds.
const MAX_MICROS_PER_QUARTER: u32 = (1 << 24) - 1;

/// Largest absolute tick; deltas never exceed it, so they fit in a `u28`.
const MAX_TICK: u32 = (1 << 28) - 1;

/// Convert seconds to ticks at the given tempo.
///
/// `None` unless the result lands within `0..=MAX_TICK`.
pub fn seconds_to_ticks(seconds: f64, tempo_bpm: f64) -> Option<u32> {
    let ticks = (seconds * tempo_bpm / 60.0 * TICKS_PER_QUARTER as f64).round();
    (0.0..=MAX_TICK as f64).contains(&ticks).then_some(ticks as u32)
}

fn micros_per_quarter(tempo_bpm: f64) -> Option<u32> {
    let micros = (60_000_000.0 / tempo_bpm).round();
    (1.0..=MAX_MICROS_PER_QUARTER as f64).contains(&micros).then_some(micros as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NoteEdge {
    // Offs sort first so a repeated chord re-attacks cleanly on a shared tick.
    Off,
    On,
}

/// Build an in-memory SMF for a performance.
///
/// Fails when the tempo or a note time cannot be represented in the file.
pub fn performance_to_smf(performance: &Performance) -> Result<Smf<'static>, ExportError> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let tempo_bpm = performance.tempo_bpm();
    let micros = micros_per_quarter(tempo_bpm).ok_or(ExportError::Tempo(tempo_bpm))?;
    smf.tracks.push(vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(micros))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ]);

    let mut edges: Vec<(u32, NoteEdge, u8, u8)> = Vec::new();
    let ticks =
        |seconds: f64| seconds_to_ticks(seconds, tempo_bpm).ok_or(ExportError::TooLong(seconds));
    for event in performance.events() {
        let on = ticks(event.start)?;
        let off = ticks(event.end())?.max(on.saturating_add(1));
        if off > MAX_TICK {
            return Err(ExportError::TooLong(event.end()));
        }
        for &pitch in &event.pitches {
            edges.push((on, NoteEdge::On, pitch.min(127), event.velocity.min(127)));
            edges.push((off, NoteEdge::Off, pitch.min(127), 0));
        }
    }
    // Stable: pitches within a chord keep their order.
    edges.sort_by_key(|&(tick, edge, _, _)| (tick, edge));

    let channel = u4::new(CHANNEL);
    let mut track: Track<'static> = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Chords")),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(PIANO_PROGRAM),
                },
            },
        },
    ];

    let mut last_tick = 0;
    for (tick, edge, key, vel) in edges {
        let message = match edge {
            NoteEdge::On => MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            },
            NoteEdge::Off => MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(vel),
            },
        };
        track.push(TrackEvent {
            delta: u28::new(tick - last_tick),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    Ok(smf)
}

/// Encode a performance as SMF bytes.
pub fn performance_to_bytes(performance: &Performance) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    performance_to_smf(performance)?.write_std(&mut buf)?;
    Ok(buf)
}

/// Writes performances as `.mid` files into a directory.
#[derive(Debug, Clone)]
pub struct MidiExporter {
    dir: PathBuf,
    file_name: String,
}

impl MidiExporter {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
        }
    }

    /// Export to `chord_output.mid` in the system temp directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir(), DEFAULT_FILE_NAME)
    }

    /// Where the next export will be written.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    /// Write the performance, creating the directory if needed.
    pub fn export(&self, performance: &Performance) -> Result<PathBuf, ExportError> {
        if performance.is_empty() {
            return Err(ExportError::Empty);
        }
        let bytes = performance_to_bytes(performance)?;
        let path = self.path();
        write_file(&path, &bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote MIDI file");
        Ok(path)
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

impl OutputStrategy for MidiExporter {
    fn method(&self) -> Method {
        Method::Midi
    }

    fn deliver(&self, performance: &Performance) -> Result<Delivered, OutputError> {
        let path = self.export(performance)?;
        Ok(Delivered::exported(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note_events(smf: &Smf) -> Vec<(u32, bool, u8)> {
        let mut tick = 0;
        let mut out = Vec::new();
        for event in &smf.tracks[1] {
            tick += event.delta.as_int();
            if let TrackEventKind::Midi { message, .. } = event.kind {
                match message {
                    MidiMessage::NoteOn { key, .. } => out.push((tick, true, key.as_int())),
                    MidiMessage::NoteOff { key, .. } => out.push((tick, false, key.as_int())),
                    _ => {}
                }
            }
        }
        out
    }

    #[test]
    fn seconds_to_ticks_at_120() {
        assert_eq!(seconds_to_ticks(0.5, 120.0), Some(480));
        assert_eq!(seconds_to_ticks(2.5, 120.0), Some(2400));
        assert_eq!(seconds_to_ticks(1.0, 60.0), Some(480));
        assert_eq!(seconds_to_ticks(400_000.0, 120.0), None);
        assert_eq!(seconds_to_ticks(f64::INFINITY, 120.0), None);
    }

    #[test]
    fn single_chord_layout() {
        let perf = Performance::chord(vec![60, 64, 67], 2.5, 96, 120.0);
        let smf = performance_to_smf(&perf).unwrap();
        assert_eq!(smf.tracks.len(), 2);
        assert_eq!(
            note_events(&smf),
            vec![
                (0, true, 60),
                (0, true, 64),
                (0, true, 67),
                (2400, false, 60),
                (2400, false, 64),
                (2400, false, 67),
            ]
        );
    }

    #[test]
    fn repeated_chord_releases_before_reattack() {
        let blues = crate::theory::build_12_bar_blues("C");
        let perf = Performance::progression(&blues, 120.0, 90);
        let smf = performance_to_smf(&perf).unwrap();
        let events = note_events(&smf);
        // Bar 2 starts at tick 1920: three offs, then three ons.
        let at_bar_two: Vec<bool> = events
            .iter()
            .filter(|(tick, _, _)| *tick == 1920)
            .map(|(_, on, _)| *on)
            .collect();
        assert_eq!(at_bar_two, vec![false, false, false, true, true, true]);
    }

    #[test]
    fn tempo_meta_matches_performance() {
        let perf = Performance::chord(vec![60], 1.0, 96, 90.0);
        let smf = performance_to_smf(&perf).unwrap();
        let tempo = smf.tracks[0].iter().find_map(|e| match e.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some(t.as_int()),
            _ => None,
        });
        assert_eq!(tempo, Some(666_667));
    }

    #[test]
    fn note_past_the_last_tick_is_an_error() {
        for seconds in [400_000.0, 1e10] {
            let perf = Performance::chord(vec![60], seconds, 96, 120.0);
            assert!(matches!(performance_to_smf(&perf), Err(ExportError::TooLong(_))));
            assert!(performance_to_bytes(&perf).is_err());
        }
    }

    #[test]
    fn tempo_outside_u24_is_an_error() {
        let perf = Performance::chord(vec![60], 2.5, 96, 3.0);
        assert!(matches!(performance_to_smf(&perf), Err(ExportError::Tempo(t)) if t == 3.0));

        let slowest = Performance::chord(vec![60], 2.5, 96, 20.0);
        let smf = performance_to_smf(&slowest).unwrap();
        let tempo = smf.tracks[0].iter().find_map(|e| match e.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some(t.as_int()),
            _ => None,
        });
        assert_eq!(tempo, Some(3_000_000));
    }

    #[test]
    fn bytes_parse_back() {
        let perf = Performance::chord(vec![62, 65, 69], 1.0, 80, 120.0);
        let bytes = performance_to_bytes(&perf).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 2);
        assert_eq!(note_events(&smf).len(), 6);
    }

    #[test]
    fn export_writes_into_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = MidiExporter::new(dir.path().join("out"), "test.mid");
        let perf = Performance::chord(vec![60, 63, 67], 1.0, 96, 120.0);
        let path = exporter.export(&perf).unwrap();
        assert_eq!(path, dir.path().join("out").join("test.mid"));
        assert!(path.exists());
    }

    #[test]
    fn empty_performance_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = MidiExporter::new(dir.path(), "empty.mid");
        let perf = Performance::chord(Vec::new(), 1.0, 96, 120.0);
        assert!(matches!(exporter.export(&perf), Err(ExportError::Empty)));
    }
}
