//! Audio output: renders a performance and plays it on the default device.
//!
//! Rendering happens up front on the calling thread. The rendered samples are
//! queued in a lock-free ring buffer that the cpal callback drains; the caller
//! blocks until the queue runs dry.

pub mod player;
pub mod render;

use thiserror::Error;

pub use player::AudioPlayer;
pub use render::{AdsrEnvelope, ChordRenderer, Waveform};

/// Audio output errors.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio output device found.
    #[error("no audio output device found")]
    NoOutputDevice,
    /// Failed to query device configuration.
    #[error("device config error: {0}")]
    DeviceConfig(String),
    /// Failed to build the audio stream.
    #[error("stream build error: {0}")]
    StreamBuild(String),
    /// Failed to start the audio stream.
    #[error("stream play error: {0}")]
    StreamPlay(String),
    /// The stream started but playback did not complete.
    #[error("playback failed: {0}")]
    Playback(String),
    /// The performance is longer than the player will render.
    #[error("performance of {0:.1} s is too long to play")]
    TooLong(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_display() {
        assert_eq!(
            AudioError::NoOutputDevice.to_string(),
            "no audio output device found"
        );
        assert_eq!(
            AudioError::DeviceConfig("test".to_string()).to_string(),
            "device config error: test"
        );
        assert_eq!(
            AudioError::Playback("timed out".to_string()).to_string(),
            "playback failed: timed out"
        );
    }
}
