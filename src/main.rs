//! chordsmith: play a chord or progression, or export it as a MIDI file.
//!
//! Responses are printed to stdout as JSON (Markdown for `sheet`); logs go to
//! stderr. The exit status is 1 when the response reports a failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chordsmith::ai;
use chordsmith::config::AppConfig;
use chordsmith::service::{ChordRequest, ChordService, ProgressionRequest, ScaleRequest};

#[derive(Parser)]
#[command(name = "chordsmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Skip live audio and go straight to MIDI export.
    #[arg(long, global = true)]
    no_audio: bool,

    /// Where to write the MIDI file.
    #[arg(long, global = true, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Note velocity (clamped to 0-127).
    #[arg(long, global = true, allow_negative_numbers = true)]
    velocity: Option<i64>,

    /// Config file (default: ~/.chordsmith/config.yaml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a chord by root and type.
    Chord {
        root: String,
        #[arg(default_value = "major")]
        chord_type: String,
        /// Chord length in seconds.
        #[arg(long)]
        duration: Option<f64>,
    },
    /// Play a chord written as a symbol, e.g. "F#m7" or "Bbmaj7".
    Symbol {
        text: String,
        /// Chord length in seconds.
        #[arg(long)]
        duration: Option<f64>,
    },
    /// Play a progression for a song title, or the 12-bar blues.
    Progression {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        root: Option<String>,
        #[arg(long)]
        tempo: Option<f64>,
    },
    /// Suggest scales for a chord.
    Scales {
        root: String,
        #[arg(default_value = "major")]
        chord_type: String,
    },
    /// Write a Markdown chord sheet for a song title.
    Sheet { title: String },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chordsmith=info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::load(cli.config.as_deref());
    if cli.no_audio {
        config.audio_enabled = false;
    }
    if let Some(out) = &cli.out {
        if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
            config.export_dir = Some(dir.to_path_buf());
        }
        if let Some(name) = out.file_name().and_then(|n| n.to_str()) {
            config.midi_file_name = name.to_string();
        }
    }
    config
}

fn print_json<T: Serialize>(value: &T, success: bool) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failed to serialize response: {e}");
            return ExitCode::FAILURE;
        }
    }
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let config = load_config(&cli);
    tracing::debug!(?config, "configuration loaded");

    let mut service = ChordService::new(config);
    if let Some(text_service) = ai::configured_service() {
        service = service.with_text_service(text_service);
    }

    match &cli.command {
        Command::Chord {
            root,
            chord_type,
            duration,
        } => {
            let request = ChordRequest {
                duration: *duration,
                velocity: cli.velocity,
                ..ChordRequest::new(root.as_str(), chord_type.as_str())
            };
            let response = service.generate_chord(&request);
            print_json(&response, response.success)
        }
        Command::Symbol { text, duration } => {
            let request = ChordRequest {
                duration: *duration,
                velocity: cli.velocity,
                ..ChordRequest::from_symbol(text.as_str())
            };
            let response = service.generate_chord(&request);
            print_json(&response, response.success)
        }
        Command::Progression { title, root, tempo } => {
            let request = ProgressionRequest {
                title: title.clone(),
                root_note: root.clone(),
                tempo_bpm: *tempo,
                velocity: cli.velocity,
            };
            let response = service.generate_progression(&request);
            print_json(&response, response.success)
        }
        Command::Scales { root, chord_type } => {
            let request = ScaleRequest {
                root_note: root.clone(),
                chord_type: chord_type.clone(),
            };
            let response = service.scales(&request);
            print_json(&response, response.success)
        }
        Command::Sheet { title } => {
            let response = service.chord_sheet(title);
            match (&response.markdown, response.success) {
                (Some(markdown), true) => {
                    print!("{markdown}");
                    ExitCode::SUCCESS
                }
                _ => print_json(&response, false),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_belongs_to_chord_commands() {
        assert!(Cli::try_parse_from(["chordsmith", "chord", "C", "--duration", "2"]).is_ok());
        assert!(Cli::try_parse_from(["chordsmith", "symbol", "Fm7", "--duration", "0.5"]).is_ok());
        assert!(Cli::try_parse_from(["chordsmith", "progression", "--duration", "2"]).is_err());
        assert!(Cli::try_parse_from(["chordsmith", "sheet", "Blue", "--duration", "2"]).is_err());
    }

    #[test]
    fn global_flags_reach_the_chord_request() {
        let cli = Cli::try_parse_from([
            "chordsmith", "--velocity", "-3", "chord", "A", "minor", "--duration", "1.5",
        ])
        .unwrap();
        assert_eq!(cli.velocity, Some(-3));
        match cli.command {
            Command::Chord {
                root,
                chord_type,
                duration,
            } => {
                assert_eq!((root.as_str(), chord_type.as_str()), ("A", "minor"));
                assert_eq!(duration, Some(1.5));
            }
            _ => panic!("expected the chord command"),
        }
    }
}
