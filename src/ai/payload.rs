//! Defensive parsing of structured data embedded in free-form model output.
//!
//! Model replies are untrusted. The JSON may be bare, fenced in a Markdown code
//! block, or surrounded by prose; numbers may arrive as strings; fields may be
//! missing. Anything that cannot be turned into a usable value yields `None`
//! and the caller falls back to the local tables.

use serde::Deserialize;
use serde_json::Value;

use crate::theory::{
    parse_chord_symbol, PitchClass, Progression, ProgressionEntry, ScaleSuggestion,
    SuggestionSource, BEATS_PER_BAR,
};

/// Longest accepted chord in a suggested progression, in beats.
pub const MAX_ENTRY_BEATS: f64 = 64.0;

/// Highest accepted bar number, and the most entries read from one reply.
pub const MAX_BARS: u32 = 256;

#[derive(Debug, Deserialize)]
struct ProgressionPayload {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    progression: Vec<Value>,
    #[serde(default)]
    total_bars: Option<Value>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScalePayload {
    #[serde(default)]
    scales: Vec<Value>,
}

/// Find the JSON object in a model reply.
///
/// Tries, in order: the whole reply, the first fenced code block, and the span
/// from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value @ Value::Object(_)) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(block) = fenced_block(trimmed) {
        if let Ok(value @ Value::Object(_)) = serde_json::from_str(block) {
            return Some(value);
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&trimmed[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    // Skip an info string such as "json".
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// A number, or a string holding one.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// A bar number in `1..=MAX_BARS`.
fn as_bar(value: &Value) -> Option<u32> {
    as_number(value)
        .filter(|b| (1.0..=MAX_BARS as f64).contains(b))
        .map(|b| b as u32)
}

fn as_text(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a progression reply. `None` when no chord could be read.
pub fn parse_progression(text: &str) -> Option<Progression> {
    let value = extract_json(text)?;
    let payload: ProgressionPayload = serde_json::from_value(value).ok()?;

    let entries: Vec<ProgressionEntry> = payload
        .progression
        .iter()
        .take(MAX_BARS as usize)
        .enumerate()
        .filter_map(|(i, item)| {
            let chord = as_text(item.get("chord")?)?;
            let duration = item
                .get("duration")
                .and_then(as_number)
                .filter(|d| *d > 0.0 && *d <= MAX_ENTRY_BEATS)
                .unwrap_or(BEATS_PER_BAR);
            let bar = item
                .get("bar")
                .and_then(as_bar)
                .unwrap_or(i as u32 + 1);
            Some(ProgressionEntry {
                bar,
                chord: parse_chord_symbol(chord).to_instance(),
                duration,
            })
        })
        .collect();

    if entries.is_empty() {
        return None;
    }

    let total_bars = payload.total_bars.as_ref().and_then(as_bar);

    let key = payload
        .key
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| entries[0].chord.root.name().to_string());

    Some(Progression::new(
        key,
        entries,
        total_bars,
        payload.description.unwrap_or_default(),
    ))
}

/// Parse a scale reply. `None` when no scale had any readable note.
pub fn parse_scales(text: &str) -> Option<Vec<ScaleSuggestion>> {
    let value = extract_json(text)?;
    let payload: ScalePayload = serde_json::from_value(value).ok()?;

    let scales: Vec<ScaleSuggestion> = payload
        .scales
        .iter()
        .filter_map(|item| {
            let notes: Vec<PitchClass> = item
                .get("notes")?
                .as_array()?
                .iter()
                .filter_map(as_text)
                .filter_map(PitchClass::lookup)
                .collect();
            if notes.is_empty() {
                return None;
            }
            Some(ScaleSuggestion {
                name: item
                    .get("name")
                    .and_then(as_text)
                    .unwrap_or("Suggested scale")
                    .to_string(),
                notes,
                description: item
                    .get("description")
                    .and_then(as_text)
                    .unwrap_or_default()
                    .to_string(),
                source: SuggestionSource::Remote,
            })
        })
        .collect();

    (!scales.is_empty()).then_some(scales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::ChordType;

    const BARE: &str = r#"{"key": "F major", "progression": [
        {"chord": "Fmaj7", "duration": 4, "bar": 1},
        {"chord": "Gm7", "duration": 2, "bar": 2},
        {"chord": "C7", "duration": 2, "bar": 2}
    ], "total_bars": 2, "description": "ii-V-I"}"#;

    #[test]
    fn bare_json() {
        let progression = parse_progression(BARE).unwrap();
        assert_eq!(progression.key(), "F major");
        assert_eq!(progression.len(), 3);
        assert_eq!(progression.total_bars(), 2);
        assert_eq!(progression.description(), "ii-V-I");
        let first = progression.entries()[0];
        assert_eq!(first.chord.root.name(), "F");
        assert_eq!(first.chord.chord_type, ChordType::Major7);
        assert_eq!(progression.entries()[2].chord.chord_type, ChordType::Dominant7);
        assert_eq!(progression.entries()[1].duration, 2.0);
    }

    #[test]
    fn json_inside_prose() {
        let text = format!("Sure! Here is the progression:\n{BARE}\nEnjoy playing it.");
        assert_eq!(parse_progression(&text).unwrap().len(), 3);
    }

    #[test]
    fn json_in_fenced_block() {
        let text = format!("Here you go:\n```json\n{BARE}\n```\nThe {{braces}} are fun.");
        assert_eq!(parse_progression(&text).unwrap().len(), 3);
    }

    #[test]
    fn numbers_as_strings_and_missing_fields() {
        let text = r#"{"progression": [
            {"chord": "Bbm", "duration": "2"},
            {"chord": "Eb7", "bar": "3"},
            {"chord": "Ab", "duration": -1}
        ]}"#;
        let progression = parse_progression(text).unwrap();
        let entries = progression.entries();
        assert_eq!(entries[0].chord.root.name(), "A#");
        assert_eq!(entries[0].duration, 2.0);
        assert_eq!(entries[0].bar, 1);
        assert_eq!(entries[1].bar, 3);
        assert_eq!(entries[1].duration, 4.0);
        assert_eq!(entries[2].duration, 4.0);
        // Key falls back to the first chord root; total bars to the highest bar.
        assert_eq!(progression.key(), "A#");
        assert_eq!(progression.total_bars(), 3);
    }

    #[test]
    fn absurd_durations_fall_back_to_a_bar() {
        let text = r#"{"progression": [
            {"chord": "C", "duration": 1e10},
            {"chord": "G", "duration": 4},
            {"chord": "F", "duration": 64}
        ]}"#;
        let progression = parse_progression(text).unwrap();
        let durations: Vec<f64> = progression.entries().iter().map(|e| e.duration).collect();
        assert_eq!(durations, [4.0, 4.0, 64.0]);

        let perf = crate::output::Performance::progression(&progression, 120.0, 96);
        assert!(crate::export::midi::performance_to_bytes(&perf).is_ok());
    }

    #[test]
    fn huge_bar_counts_fall_back() {
        let text = r#"{"progression": [
            {"chord": "C", "bar": 1},
            {"chord": "G", "bar": 4294967296}
        ], "total_bars": 1e12}"#;
        let progression = parse_progression(text).unwrap();
        assert_eq!(progression.entries()[1].bar, 2);
        assert_eq!(progression.total_bars(), 2);
    }

    #[test]
    fn long_replies_are_truncated() {
        let entries = vec![r#"{"chord": "C"}"#; 1000].join(",");
        let text = format!(r#"{{"progression": [{entries}]}}"#);
        let progression = parse_progression(&text).unwrap();
        assert_eq!(progression.len(), MAX_BARS as usize);
        assert_eq!(progression.total_bars(), MAX_BARS);
    }

    #[test]
    fn entries_without_chords_are_skipped() {
        let text = r#"{"progression": [{"duration": 4}, {"chord": ""}, {"chord": "D"}]}"#;
        let progression = parse_progression(text).unwrap();
        assert_eq!(progression.len(), 1);
        assert_eq!(progression.entries()[0].bar, 3);
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse_progression("I cannot help with that.").is_none());
        assert!(parse_progression("{not json}").is_none());
        assert!(parse_progression(r#"{"progression": []}"#).is_none());
        assert!(parse_progression(r#"{"progression": "C F G"}"#).is_none());
        assert!(parse_progression("} backwards {").is_none());
    }

    #[test]
    fn scales_payload() {
        let text = r#"```json
{"scales": [
  {"name": "D Dorian", "notes": ["D", "E", "F", "G", "A", "B", "C"], "description": "Classic"},
  {"name": "Broken", "notes": []},
  {"name": "Flats", "notes": ["Bb", "Eb", "xyz"]}
]}
```"#;
        let scales = parse_scales(text).unwrap();
        assert_eq!(scales.len(), 2);
        assert_eq!(scales[0].name, "D Dorian");
        assert_eq!(scales[0].notes.len(), 7);
        assert_eq!(scales[0].source, SuggestionSource::Remote);
        let flats: Vec<&str> = scales[1].notes.iter().map(|n| n.name()).collect();
        assert_eq!(flats, ["A#", "D#"]);
        assert_eq!(scales[1].description, "");
    }

    #[test]
    fn empty_scales_is_none() {
        assert!(parse_scales(r#"{"scales": []}"#).is_none());
        assert!(parse_scales("no scales here").is_none());
    }
}
