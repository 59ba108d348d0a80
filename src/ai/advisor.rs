//! Remote-first suggestions: ask the text service, fall back to the local tables.

use std::fmt::Write as _;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::payload::{parse_progression, parse_scales};
use super::prompt;
use super::TextService;
use crate::theory::{self, Progression, ScaleSuggestion};

/// Key used when a progression has to come from the local table.
pub const FALLBACK_KEY: &str = "C";

/// Where a suggested value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Origin {
    Remote,
    Fallback { reason: String },
}

impl Origin {
    fn fallback(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!(%reason, "using local fallback");
        Origin::Fallback { reason }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Origin::Remote)
    }
}

/// A value plus its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggested<T> {
    pub value: T,
    pub origin: Origin,
}

/// Ask the service for something and parse it, or explain why not.
fn ask<T>(
    service: Option<&dyn TextService>,
    instructions: &str,
    prompt: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Result<T, String> {
    let service = service.ok_or_else(|| "no text service configured".to_string())?;
    let reply = service
        .generate(instructions, prompt)
        .map_err(|e| e.to_string())?;
    tracing::debug!(reply_len = reply.len(), "text service replied");
    parse(&reply).ok_or_else(|| "reply did not contain a usable payload".to_string())
}

/// A progression for a song title; the 12-bar blues in C when the service
/// is missing, fails, or returns nothing usable.
pub fn suggest_progression(service: Option<&dyn TextService>, title: &str) -> Suggested<Progression> {
    match ask(
        service,
        prompt::PROGRESSION_INSTRUCTIONS,
        &prompt::progression_prompt(title),
        parse_progression,
    ) {
        Ok(value) => Suggested {
            value,
            origin: Origin::Remote,
        },
        Err(reason) => Suggested {
            value: theory::build_12_bar_blues(FALLBACK_KEY),
            origin: Origin::fallback(reason),
        },
    }
}

/// Scales for a chord; the local table when the service cannot help.
pub fn suggest_scales(
    service: Option<&dyn TextService>,
    root_name: &str,
    chord_type_name: &str,
) -> Suggested<Vec<ScaleSuggestion>> {
    match ask(
        service,
        prompt::SCALE_INSTRUCTIONS,
        &prompt::scale_prompt(root_name, chord_type_name),
        parse_scales,
    ) {
        Ok(value) => Suggested {
            value,
            origin: Origin::Remote,
        },
        Err(reason) => Suggested {
            value: theory::suggest_scales(root_name, chord_type_name),
            origin: Origin::fallback(reason),
        },
    }
}

/// A Markdown chord sheet headed by the title and a generation stamp.
///
/// Without a usable reply the sheet shows the fallback 12-bar blues.
pub fn chord_sheet(
    service: Option<&dyn TextService>,
    title: &str,
    generated_at: NaiveDateTime,
) -> Suggested<String> {
    let non_empty = |reply: &str| {
        let body = reply.trim();
        (!body.is_empty()).then(|| body.to_string())
    };
    let (body, origin) = match ask(
        service,
        prompt::CHORD_SHEET_INSTRUCTIONS,
        &prompt::chord_sheet_prompt(title),
        non_empty,
    ) {
        Ok(body) => (body, Origin::Remote),
        Err(reason) => {
            let blues = theory::build_12_bar_blues(FALLBACK_KEY);
            (progression_markdown(&blues), Origin::fallback(reason))
        }
    };

    let stamp = generated_at.format("%Y-%m-%d %H:%M");
    Suggested {
        value: format!("# {title}\n\n_Generated {stamp}_\n\n{body}\n"),
        origin,
    }
}

/// Render a progression as a Markdown sheet with 4-bar lines.
pub fn progression_markdown(progression: &Progression) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "**Key:** {}  ", progression.key());
    let _ = writeln!(out, "**Time signature:** 4/4  ");
    if !progression.description().is_empty() {
        let _ = writeln!(out, "**Form:** {}  ", progression.description());
    }
    out.push('\n');

    let bars: Vec<String> = (1..=progression.total_bars())
        .map(|bar| {
            let chords: Vec<String> = progression
                .entries()
                .iter()
                .filter(|e| e.bar == bar)
                .map(|e| e.chord.symbol())
                .collect();
            if chords.is_empty() {
                "%".to_string()
            } else {
                chords.join(" ")
            }
        })
        .collect();

    for line in bars.chunks(4) {
        let _ = writeln!(out, "| {} |", line.join(" | "));
    }
    out
}
