//! File export: performances written as Standard MIDI Files.

pub mod midi;

use thiserror::Error;

pub use midi::{MidiExporter, DEFAULT_FILE_NAME, TICKS_PER_QUARTER};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("nothing to export: performance has no notes")]
    Empty,
    #[error("tempo {0} BPM does not fit in a MIDI tempo event")]
    Tempo(f64),
    #[error("note at {0:.1} s is past the end of a MIDI track")]
    TooLong(f64),
}
