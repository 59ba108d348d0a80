//! Tiered output: try each strategy in order, stop at the first success.
//!
//! The default tiers are live audio then MIDI file export. Failures from the
//! tiers that were tried are kept, so a caller can report both "audio failed,
//! wrote a MIDI file" and the combined reason when every tier failed.

pub mod performance;

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::audio::AudioError;
use crate::export::ExportError;

pub use performance::{
    ChordEvent, Performance, MAX_CHORD_SECONDS, MAX_TEMPO_BPM, MAX_VELOCITY, MIN_TEMPO_BPM,
};

/// How a performance was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Audio,
    Midi,
}

impl Method {
    /// Label used in combined error messages.
    pub fn label(self) -> &'static str {
        match self {
            Method::Audio => "Audio",
            Method::Midi => "MIDI",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a single output tier failed.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Audio(#[from] AudioError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("nothing to play: performance has no notes")]
    EmptyPerformance,
}

/// One failed tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAttempt {
    pub method: Method,
    pub reason: String,
}

/// A successful delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivered {
    pub method: Method,
    /// Audio host driver that played the performance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    /// File written by an export tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// Tiers that failed before this one succeeded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<FailedAttempt>,
}

impl Delivered {
    pub fn played(driver: impl Into<String>) -> Self {
        Self {
            method: Method::Audio,
            driver: Some(driver.into()),
            file_path: None,
            fallbacks: Vec::new(),
        }
    }

    pub fn exported(path: PathBuf) -> Self {
        Self {
            method: Method::Midi,
            driver: None,
            file_path: Some(path),
            fallbacks: Vec::new(),
        }
    }
}

/// Every tier failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub attempts: Vec<FailedAttempt>,
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return f.write_str("no output strategies configured");
        }
        let parts: Vec<String> = self
            .attempts
            .iter()
            .map(|a| format!("{}: {}", a.method, a.reason))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

impl std::error::Error for DeliveryFailure {}

/// One way of getting a performance to the user.
pub trait OutputStrategy: Send + Sync {
    fn method(&self) -> Method;

    fn deliver(&self, performance: &Performance) -> Result<Delivered, OutputError>;
}

/// Try `strategies` in order and return the first success, carrying the
/// failures that preceded it.
pub fn deliver_first(
    strategies: &[Box<dyn OutputStrategy>],
    performance: &Performance,
) -> Result<Delivered, DeliveryFailure> {
    let mut attempts = Vec::new();

    for strategy in strategies {
        let method = strategy.method();
        match strategy.deliver(performance) {
            Ok(mut delivered) => {
                tracing::info!(%method, "performance delivered");
                delivered.fallbacks = attempts;
                return Ok(delivered);
            }
            Err(e) => {
                tracing::warn!(%method, error = %e, "output tier failed");
                attempts.push(FailedAttempt {
                    method,
                    reason: e.to_string(),
                });
            }
        }
    }

    Err(DeliveryFailure { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fake {
        method: Method,
        fail_with: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl Fake {
        fn new(method: Method, fail_with: Option<&'static str>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    method,
                    fail_with,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl OutputStrategy for Fake {
        fn method(&self) -> Method {
            self.method
        }

        fn deliver(&self, _performance: &Performance) -> Result<Delivered, OutputError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(reason) => Err(OutputError::Audio(AudioError::Playback(reason.into()))),
                None => Ok(match self.method {
                    Method::Audio => Delivered::played("FakeHost"),
                    Method::Midi => Delivered::exported(PathBuf::from("/tmp/fake.mid")),
                }),
            }
        }
    }

    fn perf() -> Performance {
        Performance::chord(vec![60, 64, 67], 0.1, 96, 120.0)
    }

    #[test]
    fn first_success_stops_the_chain() {
        let (audio, _) = Fake::new(Method::Audio, None);
        let (midi, midi_calls) = Fake::new(Method::Midi, None);
        let strategies: Vec<Box<dyn OutputStrategy>> = vec![Box::new(audio), Box::new(midi)];

        let delivered = deliver_first(&strategies, &perf()).unwrap();
        assert_eq!(delivered.method, Method::Audio);
        assert_eq!(delivered.driver.as_deref(), Some("FakeHost"));
        assert!(delivered.fallbacks.is_empty());
        assert_eq!(midi_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn falls_through_to_next_tier() {
        let (audio, _) = Fake::new(Method::Audio, Some("no device"));
        let (midi, _) = Fake::new(Method::Midi, None);
        let strategies: Vec<Box<dyn OutputStrategy>> = vec![Box::new(audio), Box::new(midi)];

        let delivered = deliver_first(&strategies, &perf()).unwrap();
        assert_eq!(delivered.method, Method::Midi);
        assert_eq!(delivered.fallbacks.len(), 1);
        assert_eq!(delivered.fallbacks[0].method, Method::Audio);
        assert!(delivered.fallbacks[0].reason.contains("no device"));
    }

    #[test]
    fn combines_all_failures_in_order() {
        let (audio, _) = Fake::new(Method::Audio, Some("no device"));
        let (midi, _) = Fake::new(Method::Midi, Some("disk full"));
        let strategies: Vec<Box<dyn OutputStrategy>> = vec![Box::new(audio), Box::new(midi)];

        let failure = deliver_first(&strategies, &perf()).unwrap_err();
        assert_eq!(failure.attempts.len(), 2);
        assert_eq!(
            failure.to_string(),
            "Audio: playback failed: no device, MIDI: playback failed: disk full"
        );
    }

    #[test]
    fn no_strategies() {
        let failure = deliver_first(&[], &perf()).unwrap_err();
        assert_eq!(failure.to_string(), "no output strategies configured");
    }
}
