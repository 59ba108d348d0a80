//! Generative text service: remote suggestions with deterministic fallbacks.
//!
//! The service itself is a black box behind [`TextService`]. Everything built
//! on top of it treats replies as untrusted and falls back to the local theory
//! tables whenever a call fails or a reply cannot be used.

pub mod advisor;
pub mod config;
#[cfg(feature = "llm")]
pub mod llm;
pub mod payload;
pub mod prompt;

use thiserror::Error;

pub use advisor::{chord_sheet, progression_markdown, suggest_progression, suggest_scales, Origin, Suggested};
pub use config::AiConfig;

#[derive(Debug, Error)]
pub enum TextServiceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Response(String),
}

/// Free-form text generation.
pub trait TextService: Send + Sync {
    /// Answer `prompt` under the given system `instructions`.
    fn generate(&self, instructions: &str, prompt: &str) -> Result<String, TextServiceError>;
}

/// Build the configured text service, if any.
///
/// Without the `llm` feature, or without a usable `ai.yaml`, there is none and
/// every suggestion comes from the local tables.
pub fn configured_service() -> Option<Box<dyn TextService>> {
    #[cfg(feature = "llm")]
    {
        let config = config::load_config()?;
        llm::LlmClient::from_config(&config).map(|c| Box::new(c) as Box<dyn TextService>)
    }
    #[cfg(not(feature = "llm"))]
    {
        None
    }
}
