//! Chord service: wires the theory engine to the output tiers and the text service.
//!
//! Every operation returns a response value, never an error: invalid requests
//! and collaborator failures become `success: false` responses with a message.

pub mod types;

use chrono::Local;
use thiserror::Error;

use crate::ai::{self, TextService};
use crate::audio::AudioPlayer;
use crate::config::AppConfig;
use crate::export::MidiExporter;
use crate::output::{
    deliver_first, Delivered, Method, OutputStrategy, Performance, MAX_CHORD_SECONDS, MAX_TEMPO_BPM,
    MAX_VELOCITY, MIN_TEMPO_BPM,
};
use crate::theory::{build_12_bar_blues, parse_chord_symbol, ChordInstance, PitchClass, Progression};

pub use types::{
    bar_views, BarView, ChordRequest, ChordResponse, Delivery, ProgressionRequest,
    ProgressionResponse, ScaleRequest, ScaleResponse, SheetResponse, SourceView, REQUEST_FAILED,
};

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("duration must be more than 0 and at most 60 seconds, got {0}")]
    InvalidDuration(f64),
    #[error("tempo must be between 20 and 999 BPM, got {0}")]
    InvalidTempo(f64),
    #[error("title must not be empty")]
    EmptyTitle,
}

fn valid_duration(seconds: f64) -> bool {
    seconds > 0.0 && seconds <= MAX_CHORD_SECONDS
}

fn valid_tempo(bpm: f64) -> bool {
    (MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&bpm)
}

fn clamp_velocity(velocity: i64) -> u8 {
    velocity.clamp(0, MAX_VELOCITY as i64) as u8
}

/// Default output tiers for a config: audio (when enabled), then MIDI export.
pub fn default_strategies(config: &AppConfig) -> Vec<Box<dyn OutputStrategy>> {
    let mut strategies: Vec<Box<dyn OutputStrategy>> = Vec::new();
    if config.audio_enabled {
        strategies.push(Box::new(AudioPlayer::new()));
    }
    strategies.push(Box::new(MidiExporter::new(
        config.export_dir(),
        config.midi_file_name.clone(),
    )));
    strategies
}

/// Success message for a delivery, mentioning a failed audio tier.
fn delivered_message(delivered: &Delivered, label: &str) -> String {
    match delivered.method {
        Method::Audio => format!("Successfully played {label}"),
        Method::Midi if delivered.fallbacks.is_empty() => format!("Created MIDI file for {label}"),
        Method::Midi => format!("Audio failed, created MIDI file for {label}"),
    }
}

pub struct ChordService {
    config: AppConfig,
    strategies: Vec<Box<dyn OutputStrategy>>,
    text_service: Option<Box<dyn TextService>>,
}

impl ChordService {
    /// Service with the default output tiers and no text service.
    pub fn new(config: AppConfig) -> Self {
        let strategies = default_strategies(&config);
        Self {
            config,
            strategies,
            text_service: None,
        }
    }

    pub fn with_strategies(mut self, strategies: Vec<Box<dyn OutputStrategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_text_service(mut self, service: Box<dyn TextService>) -> Self {
        self.text_service = Some(service);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn text_service(&self) -> Option<&dyn TextService> {
        self.text_service.as_deref()
    }

    fn velocity(&self, requested: Option<i64>) -> u8 {
        requested.map(clamp_velocity).unwrap_or(self.config.velocity)
    }

    /// Resolve one chord and deliver it through the output tiers.
    pub fn generate_chord(&self, request: &ChordRequest) -> ChordResponse {
        let duration = request.duration.unwrap_or(self.config.duration);
        if !valid_duration(duration) {
            let e = RequestError::InvalidDuration(duration);
            tracing::warn!(error = %e, "rejecting chord request");
            return ChordResponse::rejected(e.to_string());
        }
        let velocity = self.velocity(request.velocity);

        let chord = match request.symbol.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(symbol) => parse_chord_symbol(symbol).to_instance(),
            None => ChordInstance::from_names(&request.root_note, &request.chord_type),
        };
        let chord_notes = chord.pitches();
        let note_names = chord.note_names();
        let label = format!("{chord} chord");
        tracing::info!(chord = %chord, ?chord_notes, duration, velocity, "generating chord");

        let performance = Performance::from_chord(&chord, duration, velocity, self.config.tempo_bpm);
        let (success, message, delivery) = match deliver_first(&self.strategies, &performance) {
            Ok(delivered) => (
                true,
                format!("{}: {}", delivered_message(&delivered, &label), note_names.join(", ")),
                Delivery::from(delivered),
            ),
            Err(failure) => (
                false,
                format!("Failed to generate audio or MIDI for {label}"),
                Delivery::failed(failure.to_string()),
            ),
        };

        ChordResponse {
            success,
            chord_notes,
            note_names,
            chord_type: Some(chord.chord_type),
            root_note: Some(chord.root),
            delivery,
            message,
        }
    }

    /// Suggest (for a title) or build (for a root) a progression and deliver it.
    pub fn generate_progression(&self, request: &ProgressionRequest) -> ProgressionResponse {
        let tempo = request.tempo_bpm.unwrap_or(self.config.tempo_bpm);
        if !valid_tempo(tempo) {
            let e = RequestError::InvalidTempo(tempo);
            tracing::warn!(error = %e, "rejecting progression request");
            return ProgressionResponse::rejected(e.to_string());
        }
        let velocity = self.velocity(request.velocity);

        let (progression, source) = match request.title.as_deref().map(str::trim) {
            Some("") => {
                let e = RequestError::EmptyTitle;
                tracing::warn!(error = %e, "rejecting progression request");
                return ProgressionResponse::rejected(e.to_string());
            }
            Some(title) => {
                let suggested = ai::suggest_progression(self.text_service(), title);
                (suggested.value, Some(SourceView::from(suggested.origin)))
            }
            None => {
                let root = request.root_note.as_deref().unwrap_or("C");
                (build_12_bar_blues(root), None)
            }
        };

        let label = progression_label(&progression);
        tracing::info!(progression = %label, chords = progression.len(), tempo, "generating progression");

        let performance = Performance::progression(&progression, tempo, velocity);
        let (success, message, delivery) = match deliver_first(&self.strategies, &performance) {
            Ok(delivered) => (
                true,
                format!(
                    "{} ({} bars)",
                    delivered_message(&delivered, &label),
                    progression.total_bars()
                ),
                Delivery::from(delivered),
            ),
            Err(failure) => (
                false,
                format!("Failed to generate audio or MIDI for {label}"),
                Delivery::failed(failure.to_string()),
            ),
        };

        ProgressionResponse {
            success,
            key: Some(progression.key().to_string()),
            description: Some(progression.description().to_string()),
            total_bars: Some(progression.total_bars()),
            bars: bar_views(&progression),
            source,
            delivery,
            message,
        }
    }

    /// Scales for a chord: remote when a text service is configured, local table otherwise.
    pub fn scales(&self, request: &ScaleRequest) -> ScaleResponse {
        let root = PitchClass::from_name(&request.root_note);
        let chord_type = request.chord_type.trim().to_lowercase();
        let suggested = ai::suggest_scales(self.text_service(), root.name(), &chord_type);
        let message = format!(
            "Found {} scale{} for {root} {chord_type}",
            suggested.value.len(),
            if suggested.value.len() == 1 { "" } else { "s" }
        );
        ScaleResponse {
            success: true,
            root_note: root,
            chord_type,
            scales: suggested.value,
            source: SourceView::from(suggested.origin),
            message,
        }
    }

    /// A Markdown chord sheet for a song title.
    pub fn chord_sheet(&self, title: &str) -> SheetResponse {
        let title = title.trim();
        if title.is_empty() {
            return SheetResponse::rejected(RequestError::EmptyTitle.to_string());
        }
        let sheet = ai::chord_sheet(self.text_service(), title, Local::now().naive_local());
        SheetResponse {
            success: true,
            title: Some(title.to_string()),
            markdown: Some(sheet.value),
            source: Some(SourceView::from(sheet.origin)),
            error: None,
            message: format!("Created chord sheet for {title}"),
        }
    }
}

fn progression_label(progression: &Progression) -> String {
    if progression.description().is_empty() {
        format!("progression in {}", progression.key())
    } else {
        progression.description().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioError;
    use crate::output::OutputError;
    use std::path::PathBuf;

    struct Fixed(Option<Method>);

    impl OutputStrategy for Fixed {
        fn method(&self) -> Method {
            self.0.unwrap_or(Method::Audio)
        }

        fn deliver(&self, _performance: &Performance) -> Result<Delivered, OutputError> {
            match self.0 {
                Some(Method::Audio) => Ok(Delivered::played("TestHost")),
                Some(Method::Midi) => Ok(Delivered::exported(PathBuf::from("/tmp/test.mid"))),
                None => Err(AudioError::NoOutputDevice.into()),
            }
        }
    }

    fn service(strategies: Vec<Box<dyn OutputStrategy>>) -> ChordService {
        ChordService::new(AppConfig::default()).with_strategies(strategies)
    }

    #[test]
    fn velocity_is_clamped() {
        assert_eq!(clamp_velocity(-5), 0);
        assert_eq!(clamp_velocity(64), 64);
        assert_eq!(clamp_velocity(500), 127);
    }

    #[test]
    fn default_strategies_follow_config() {
        let mut config = AppConfig::default();
        let methods: Vec<Method> = default_strategies(&config).iter().map(|s| s.method()).collect();
        assert_eq!(methods, [Method::Audio, Method::Midi]);

        config.audio_enabled = false;
        let methods: Vec<Method> = default_strategies(&config).iter().map(|s| s.method()).collect();
        assert_eq!(methods, [Method::Midi]);
    }

    #[test]
    fn played_chord_message() {
        let response = service(vec![Box::new(Fixed(Some(Method::Audio)))])
            .generate_chord(&ChordRequest::default());
        assert!(response.success);
        assert_eq!(response.message, "Successfully played C major chord: C4, E4, G4");
        assert_eq!(response.delivery.driver.as_deref(), Some("TestHost"));
    }

    #[test]
    fn midi_only_message_does_not_mention_audio() {
        let response = service(vec![Box::new(Fixed(Some(Method::Midi)))])
            .generate_chord(&ChordRequest::new("A", "minor"));
        assert_eq!(response.message, "Created MIDI file for A minor chord: A4, C5, E5");
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let svc = service(vec![Box::new(Fixed(Some(Method::Audio)))]);
        for duration in [0.0, -1.0, f64::NAN, f64::INFINITY, 400_000.0] {
            let request = ChordRequest {
                duration: Some(duration),
                ..ChordRequest::default()
            };
            let response = svc.generate_chord(&request);
            assert!(!response.success);
            assert_eq!(response.message, REQUEST_FAILED);
        }
    }

    #[test]
    fn duration_limit_is_inclusive() {
        let request = ChordRequest {
            duration: Some(MAX_CHORD_SECONDS),
            ..ChordRequest::default()
        };
        let response = service(vec![Box::new(Fixed(Some(Method::Audio)))]).generate_chord(&request);
        assert!(response.success);
    }

    #[test]
    fn tempo_outside_range_is_rejected() {
        let svc = service(vec![Box::new(Fixed(Some(Method::Audio)))]);
        for tempo in [3.0, 0.0, 1000.0, f64::NAN] {
            let response = svc.generate_progression(&ProgressionRequest {
                tempo_bpm: Some(tempo),
                ..ProgressionRequest::default()
            });
            assert!(!response.success, "{tempo}");
            assert_eq!(response.message, REQUEST_FAILED);
        }
        for tempo in [MIN_TEMPO_BPM, MAX_TEMPO_BPM] {
            let response = svc.generate_progression(&ProgressionRequest {
                tempo_bpm: Some(tempo),
                ..ProgressionRequest::default()
            });
            assert!(response.success, "{tempo}");
        }
    }

    #[test]
    fn symbol_takes_precedence() {
        let request = ChordRequest {
            root_note: "D".to_string(),
            chord_type: "minor".to_string(),
            symbol: Some("Bbmaj7".to_string()),
            ..ChordRequest::default()
        };
        let response = service(vec![Box::new(Fixed(Some(Method::Audio)))]).generate_chord(&request);
        assert_eq!(response.chord_notes, [70, 74, 77, 81]);
        assert_eq!(response.root_note.map(|r| r.name()), Some("A#"));
    }

    #[test]
    fn blues_progression_without_title() {
        let request = ProgressionRequest {
            root_note: Some("F".to_string()),
            ..ProgressionRequest::default()
        };
        let response = service(vec![Box::new(Fixed(Some(Method::Audio)))]).generate_progression(&request);
        assert!(response.success);
        assert_eq!(response.bars.len(), 12);
        assert_eq!(response.key.as_deref(), Some("F"));
        assert!(response.source.is_none());
        assert_eq!(response.message, "Successfully played 12-bar blues in F (12 bars)");
    }

    #[test]
    fn blank_title_is_rejected() {
        let request = ProgressionRequest {
            title: Some("  ".to_string()),
            ..ProgressionRequest::default()
        };
        let response = service(vec![]).generate_progression(&request);
        assert!(!response.success);
        assert_eq!(response.message, REQUEST_FAILED);
        assert!(!service(vec![]).chord_sheet("").success);
    }

    #[test]
    fn local_scales_without_text_service() {
        let response = service(vec![]).scales(&ScaleRequest {
            root_note: "eb".to_string(),
            chord_type: "Minor7".to_string(),
        });
        assert_eq!(response.root_note.name(), "D#");
        assert_eq!(response.chord_type, "minor7");
        assert_eq!(response.scales.len(), 2);
        assert_eq!(response.source.source, "fallback");
        assert_eq!(response.message, "Found 2 scales for D# minor7");
    }
}
