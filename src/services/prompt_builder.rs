// src/services/prompt_builder.rs
use crate::errors::{MoodframeError, Result};
use crate::models::{EmotionLabel, EmotionResult, GeneratedPrompt, InputMode, StylePreset};

const QUALITY_BASE: &[&str] = &[
    "masterpiece",
    "best quality",
    "ultra high definition",
    "extremely detailed",
    "sharp focus",
    "professional",
    "intricate details",
];

const REALISM_ENHANCERS: &[&str] = &[
    "hyperrealistic",
    "photorealistic",
    "lifelike",
    "volumetric lighting",
    "subsurface scattering",
    "ray tracing",
    "ambient occlusion",
    "8k resolution",
];

const EMOTION_TAIL: &[&str] = &["atmospheric", "evocative", "cinematic"];
const PHOTO_OBJECT_TAIL: &[&str] = &["award-winning photography", "cinematic composition"];
const OBJECT_TAIL: &[&str] = &["highly detailed", "professional quality"];

const ANTI_WATERMARK: &str = "clean image, no watermark, no text, no logo, no signature, no banner";

pub const NEGATIVE_PROMPT: &str = "watermark, logo, text, signature, letters, words, writing, \
     brand, stamp, overlay, banner, copyright, trademark, username, website, url, blurry, \
     low quality, distorted, deformed, ugly, bad anatomy, cropped, out of frame, duplicate, \
     error, jpeg artifacts, lowres";

pub fn scene_for(emotion: EmotionLabel) -> &'static str {
    match emotion {
        EmotionLabel::Joy => {
            "radiant golden sunlit meadow with blooming wildflowers, warm summer day, happiness"
        }
        EmotionLabel::Sadness => {
            "misty rain-soaked forest at twilight, melancholic atmosphere, soft blue tones"
        }
        EmotionLabel::Anger => {
            "dramatic thunderstorm with lightning strikes, intense red and orange sky, powerful"
        }
        EmotionLabel::Fear => {
            "mysterious fog-shrouded landscape, dark shadows, eerie pale moonlight, suspense"
        }
        EmotionLabel::Surprise => {
            "spectacular burst of colorful aurora lights, electric energy, wonder"
        }
        EmotionLabel::Disgust => {
            "abstract organic textures, murky swamp atmosphere, unsettling greens"
        }
        EmotionLabel::Neutral => {
            "peaceful zen garden at dawn, balanced composition, serene tranquility"
        }
    }
}

/// Assembles `{base}, {style modifiers}, {quality keywords}, {anti-watermark}`.
///
/// In emotion mode the base is the scene for the detected emotion, so an
/// [`EmotionResult`] is required; object mode renders the user's text as-is.
pub fn build(
    mode: InputMode,
    text: &str,
    style: StylePreset,
    emotion: Option<&EmotionResult>,
) -> Result<GeneratedPrompt> {
    let subject = clean_subject(text);
    if subject.is_empty() {
        return Err(MoodframeError::Validation(
            "Prompt subject cannot be empty".to_string(),
        ));
    }

    let base = match mode {
        InputMode::Object => subject,
        InputMode::Emotion => {
            let emotion = emotion.ok_or_else(|| {
                MoodframeError::Validation(
                    "Emotion mode requires an emotion analysis result".to_string(),
                )
            })?;
            format!(
                "{}, inspired by the feeling of '{}'",
                scene_for(emotion.primary_emotion),
                subject
            )
        }
    };

    let text = [
        base,
        style.modifiers().join(", "),
        quality_keywords(mode, style).join(", "),
        ANTI_WATERMARK.to_string(),
    ]
    .join(", ");

    Ok(GeneratedPrompt {
        text,
        negative: NEGATIVE_PROMPT.to_string(),
    })
}

/// Emotion scenes and photorealistic objects get the realism set; each
/// mode closes the segment with its own tail.
fn quality_keywords(mode: InputMode, style: StylePreset) -> Vec<&'static str> {
    let mut keywords = QUALITY_BASE.to_vec();
    match (mode, style) {
        (InputMode::Emotion, _) => {
            keywords.extend_from_slice(REALISM_ENHANCERS);
            keywords.extend_from_slice(EMOTION_TAIL);
        }
        (InputMode::Object, StylePreset::Photorealistic) => {
            keywords.extend_from_slice(REALISM_ENHANCERS);
            keywords.extend_from_slice(PHOTO_OBJECT_TAIL);
        }
        (InputMode::Object, _) => keywords.extend_from_slice(OBJECT_TAIL),
    }
    keywords
}

/// Trims, collapses inner whitespace and drops trailing punctuation so the
/// subject joins cleanly with the comma-separated modifiers.
fn clean_subject(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?'))
        .trim_end()
        .to_string()
}
