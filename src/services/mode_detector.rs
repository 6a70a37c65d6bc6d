// src/services/mode_detector.rs
//! Lexical rules deciding whether input text expresses a feeling or names a
//! thing to draw. Any affect marker wins over object phrasing, so mixed
//! inputs like "I feel excited about the lion" render the mood, not the lion.

use crate::errors::{MoodframeError, Result};
use crate::models::InputMode;
use regex::Regex;
use std::sync::LazyLock;

const AFFECT_PHRASES: &[&str] = &["i feel", "i'm", "i am", "feeling like", "makes me feel"];

const AFFECT_WORDS: &[&str] = &[
    "feel", "feeling", "felt", "mood", "emotion", "emotional", "happy", "sad", "angry",
    "anxious", "excited", "calm", "peaceful", "stressed", "love", "hate", "fear", "joy",
    "joyful", "depressed", "hopeful", "worried", "nervous", "content", "miserable", "thrilled",
    "frustrated", "annoyed", "upset", "grateful", "proud", "ashamed", "lonely", "scared",
    "terrified", "delighted", "furious", "hurt",
];

// Stems: anchored at a word start only, so "sadness" and "loved" match.
static AFFECT_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = AFFECT_WORDS.join("|");
    Regex::new(&format!(r"\b(?:{})", alternation)).expect("affect word pattern is valid")
});

static FIRST_PERSON_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:i|we|my|me)\b.*\b(?:feel|am|was|been)\b")
        .expect("first person pattern is valid")
});

pub fn detect(text: &str) -> Result<InputMode> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return Err(MoodframeError::Validation(
            "Input text cannot be empty".to_string(),
        ));
    }

    let mode = if has_affect_marker(&normalized) {
        InputMode::Emotion
    } else {
        InputMode::Object
    };

    log::debug!("Detected {} mode for {:?}", mode, normalized);
    Ok(mode)
}

fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .replace(['\u{2019}', '\u{2018}'], "'")
}

fn has_affect_marker(text: &str) -> bool {
    let padded = format!(" {} ", text);
    AFFECT_PHRASES
        .iter()
        .any(|phrase| contains_phrase(&padded, phrase))
        || AFFECT_WORD_RE.is_match(text)
        || FIRST_PERSON_STATE_RE.is_match(text)
}

// Phrase must not be glued to surrounding letters ("via i'mport" is no match).
fn contains_phrase(padded: &str, phrase: &str) -> bool {
    padded.match_indices(phrase).any(|(start, _)| {
        let before = padded[..start].chars().next_back();
        let after = padded[start + phrase.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
