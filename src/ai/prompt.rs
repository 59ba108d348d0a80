//! Prompts sent to the text service.

/// Instructions for structured progression requests.
pub const PROGRESSION_INSTRUCTIONS: &str = "\
You are a careful arranger who answers with data, not prose.
Reply with a single JSON object and nothing else, shaped exactly like:
{\"key\": \"C major\", \"progression\": [{\"chord\": \"Cmaj7\", \"duration\": 4, \"bar\": 1}], \"total_bars\": 8, \"description\": \"...\"}
- chord: a standard chord symbol (C, Dm7, G7, Cmaj7, Bbdim, F#m7).
- duration: length in beats, 4/4 time.
- bar: 1-based bar number.
If the song is under copyright or unknown, invent an original progression in its style
and say so in the description.";

/// Instructions for scale suggestions.
pub const SCALE_INSTRUCTIONS: &str = "\
You are a jazz theory teacher who answers with data, not prose.
Reply with a single JSON object and nothing else, shaped exactly like:
{\"scales\": [{\"name\": \"C Ionian\", \"notes\": [\"C\", \"D\", \"E\", \"F\", \"G\", \"A\", \"B\"], \"description\": \"...\"}]}
List two to four scales that sound good over the chord, most idiomatic first.";

/// Instructions for Markdown chord sheets.
pub const CHORD_SHEET_INSTRUCTIONS: &str = "\
You are a meticulous music engraver.
- Output only the chord sheet for the requested song, in Markdown.
- Focus on harmonic form; no melody or lyrics.
- Use concise standard chord symbols (C, Dm7, G7, Cmaj7, F#m7b5).
- Include title, composer (or unknown), key, tempo, time signature and form sections.
- Lay chords out in 4-bar lines with barlines, with section headers.
- If the song is not in the public domain or is ambiguous, write an original progression
  in the same style instead of quoting it.
- End with a transpose table for Concert, Bb and Eb instruments.";

/// Request a structured progression for a song title.
pub fn progression_prompt(title: &str) -> String {
    format!(
        "Song title: {title}\n\
         Preferred key: C major\n\
         Time signature: 4/4\n\
         Return the chord progression of the main form as JSON."
    )
}

/// Request scales for a chord.
pub fn scale_prompt(root: &str, chord_type: &str) -> String {
    format!("Chord: {root} {chord_type}\nWhich scales fit this chord? Return JSON.")
}

/// Request a Markdown chord sheet.
pub fn chord_sheet_prompt(title: &str) -> String {
    format!(
        "Create a chord sheet.\n\n\
         Title: {title}\n\
         Style: jazz standard\n\
         Preferred key: C major\n\
         Time signature: 4/4\n\
         Tempo (BPM): 120\n\n\
         Formatting requirements:\n\
         - Markdown with a metadata header block\n\
         - Form diagram (AABA, ABAC, ...) if applicable\n\
         - Chords in 4-bar groupings with barlines like: | Cmaj7 | Dm7 G7 | Cmaj7 | Cmaj7 |\n\
         - Optional intro and ending where stylistically appropriate\n\
         - A transpose table (Concert, Bb, Eb) for the first 8 bars\n\n\
         If the title is likely a copyrighted song, invent an original progression in the same \
         style and mark it as 'Original progression in the style of jazz standard'."
    )
}
