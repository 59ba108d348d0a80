//! Application configuration: playback defaults and export location from ~/.chordsmith/config.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::DEFAULT_FILE_NAME;
use crate::output::{MAX_CHORD_SECONDS, MAX_TEMPO_BPM, MIN_TEMPO_BPM};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Playback and export defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chord length in seconds when a request does not say.
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Note velocity (0-127) when a request does not say.
    #[serde(default = "default_velocity")]
    pub velocity: u8,
    /// Tempo for progressions and MIDI files.
    #[serde(default = "default_tempo")]
    pub tempo_bpm: f64,
    /// Try live audio before falling back to MIDI export.
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
    /// Directory for MIDI files. None = system temp dir.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    /// File name for MIDI exports.
    #[serde(default = "default_file_name")]
    pub midi_file_name: String,
}

fn default_duration() -> f64 {
    2.5
}

fn default_velocity() -> u8 {
    96
}

fn default_tempo() -> f64 {
    120.0
}

fn default_true() -> bool {
    true
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            velocity: default_velocity(),
            tempo_bpm: default_tempo(),
            audio_enabled: true,
            export_dir: None,
            midi_file_name: default_file_name(),
        }
    }
}

impl AppConfig {
    /// Standard path (~/.chordsmith/config.yaml).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".chordsmith").join("config.yaml"))
    }

    /// Load from a YAML file. Missing fields take their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.sanitize();
        Ok(config)
    }

    /// Load from `path` or the standard path. A missing file gives defaults;
    /// a malformed one is logged and ignored.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => return Self::default(),
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::default()
            }
        }
    }

    /// Directory MIDI files go to.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    fn sanitize(&mut self) {
        if !(self.duration > 0.0 && self.duration <= MAX_CHORD_SECONDS) {
            self.duration = default_duration();
        }
        if !(MIN_TEMPO_BPM..=MAX_TEMPO_BPM).contains(&self.tempo_bpm) {
            self.tempo_bpm = default_tempo();
        }
        self.velocity = self.velocity.min(127);
        if self.midi_file_name.trim().is_empty() {
            self.midi_file_name = default_file_name();
        }
    }
}
