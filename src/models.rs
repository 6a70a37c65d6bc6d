// src/models.rs
use crate::errors::MoodframeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// The fixed emotion taxonomy produced by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Joy,
    Sadness,
    Anger,
    Fear,
    Surprise,
    Disgust,
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 7] = [
        EmotionLabel::Joy,
        EmotionLabel::Sadness,
        EmotionLabel::Anger,
        EmotionLabel::Fear,
        EmotionLabel::Surprise,
        EmotionLabel::Disgust,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Joy => "joy",
            EmotionLabel::Sadness => "sadness",
            EmotionLabel::Anger => "anger",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Neutral => "neutral",
        }
    }

    /// Returns `(valence, arousal)` for this emotion.
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            EmotionLabel::Joy => (0.8, 0.7),
            EmotionLabel::Sadness => (-0.7, 0.3),
            EmotionLabel::Anger => (-0.6, 0.9),
            EmotionLabel::Fear => (-0.8, 0.8),
            EmotionLabel::Surprise => (0.3, 0.9),
            EmotionLabel::Disgust => (-0.5, 0.5),
            EmotionLabel::Neutral => (0.0, 0.3),
        }
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmotionLabel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        EmotionLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == lowered)
            .ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: EmotionLabel,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionResult {
    pub primary_emotion: EmotionLabel,
    pub confidence: f64,
    pub valence: f64,
    pub arousal: f64,
    /// Every score the classifier returned, highest first.
    pub all_emotions: Vec<EmotionScore>,
}

impl EmotionResult {
    /// Builds a result from raw scores, picking the argmax as the primary emotion.
    /// Returns `None` when `scores` is empty.
    pub fn from_scores(mut scores: Vec<EmotionScore>) -> Option<Self> {
        scores.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let top = *scores.first()?;
        let (valence, arousal) = top.label.dimensions();

        Some(Self {
            primary_emotion: top.label,
            confidence: top.confidence,
            valence,
            arousal,
            all_emotions: scores,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Emotion,
    Object,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Emotion => f.write_str("emotion"),
            InputMode::Object => f.write_str("object"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    Photorealistic,
    #[default]
    Artistic,
    Abstract,
    Nature,
    Dreamscape,
}

impl StylePreset {
    pub const ALL: [StylePreset; 5] = [
        StylePreset::Photorealistic,
        StylePreset::Artistic,
        StylePreset::Abstract,
        StylePreset::Nature,
        StylePreset::Dreamscape,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StylePreset::Photorealistic => "photorealistic",
            StylePreset::Artistic => "artistic",
            StylePreset::Abstract => "abstract",
            StylePreset::Nature => "nature",
            StylePreset::Dreamscape => "dreamscape",
        }
    }

    /// Ordered modifier phrases appended to every prompt in this style.
    pub fn modifiers(self) -> &'static [&'static str] {
        match self {
            StylePreset::Photorealistic => &[
                "hyperrealistic photograph",
                "shot on Canon EOS R5",
                "85mm f/1.4 lens",
                "professional studio lighting",
                "DSLR quality",
                "ultra sharp",
                "lifelike",
                "natural skin texture",
                "ray tracing",
                "ambient occlusion",
                "8k UHD resolution",
            ],
            StylePreset::Artistic => &[
                "masterpiece digital artwork",
                "trending on artstation",
                "highly detailed",
                "concept art by greg rutkowski and alphonse mucha",
                "smooth gradients",
                "vibrant colors",
                "dramatic lighting",
                "illustration",
                "award-winning art",
            ],
            StylePreset::Abstract => &[
                "abstract modern art",
                "geometric shapes",
                "bold contrasting colors",
                "contemporary gallery art",
                "minimalist composition",
                "artistic expression",
                "museum quality",
                "fine art print",
            ],
            StylePreset::Nature => &[
                "professional nature photography",
                "National Geographic quality",
                "golden hour cinematic lighting",
                "ultra detailed landscape",
                "shot on Hasselblad",
                "vivid colors",
                "atmospheric perspective",
                "8k",
            ],
            StylePreset::Dreamscape => &[
                "surreal fantasy dreamscape",
                "ethereal glowing atmosphere",
                "digital art masterpiece",
                "trending on artstation",
                "concept art",
                "imaginative world",
                "volumetric lighting",
                "magical realism",
            ],
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StylePreset {
    type Err = MoodframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        StylePreset::ALL
            .into_iter()
            .find(|style| style.as_str() == lowered)
            .ok_or_else(|| MoodframeError::Validation(format!("Unknown style preset: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Premium,
    Fast,
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelTier::Premium => f.write_str("premium"),
            ModelTier::Fast => f.write_str("fast"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPrompt {
    pub text: String,
    pub negative: String,
}

/// Parameters for a single synthesis call against one model tier.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub model: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub seed: u32,
    pub steps: u32,
    pub guidance_scale: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// PNG-encoded image bytes.
    pub data: Vec<u8>,
    pub seed: u32,
    pub tier: ModelTier,
    pub model: String,
    pub dimensions: (u32, u32),
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub id: Uuid,
    pub image: Vec<u8>,
    pub original_text: String,
    pub prompt_used: String,
    pub negative_prompt: String,
    pub emotion: Option<EmotionResult>,
    pub input_mode: InputMode,
    pub style: StylePreset,
    pub seed: u32,
    pub tier: ModelTier,
    pub model: String,
    pub dimensions: (u32, u32),
    pub saved_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

// HTTP payloads

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub text: String,
    pub style: Option<String>,
    /// `0..=2147483647`; larger values are rejected.
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionShare {
    pub name: EmotionLabel,
    /// Percentage, rounded to one decimal.
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub primary_emotion: EmotionLabel,
    pub confidence: f64,
    pub valence: f64,
    pub arousal: f64,
    pub emotions: Vec<EmotionShare>,
}

impl From<&EmotionResult> for AnalyzeResponse {
    fn from(result: &EmotionResult) -> Self {
        Self {
            primary_emotion: result.primary_emotion,
            confidence: result.confidence,
            valence: result.valence,
            arousal: result.arousal,
            emotions: result
                .all_emotions
                .iter()
                .map(|score| EmotionShare {
                    name: score.label,
                    score: (score.confidence * 1000.0).round() / 10.0,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub id: Uuid,
    /// `data:image/png;base64,...`
    pub image: String,
    pub prompt_used: String,
    pub emotion_result: Option<AnalyzeResponse>,
    pub seed: u32,
    pub input_type: InputMode,
    pub style: StylePreset,
    pub model: String,
    pub original_text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub original_text: String,
    pub prompt_used: String,
    pub input_type: InputMode,
    pub style: StylePreset,
    pub primary_emotion: Option<EmotionLabel>,
    pub seed: u32,
    pub model: String,
    pub saved_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

impl From<&GenerationResult> for HistoryEntry {
    fn from(result: &GenerationResult) -> Self {
        Self {
            id: result.id,
            original_text: result.original_text.clone(),
            prompt_used: result.prompt_used.clone(),
            input_type: result.input_mode,
            style: result.style,
            primary_emotion: result.emotion.as_ref().map(|e| e.primary_emotion),
            seed: result.seed,
            model: result.model.clone(),
            saved_path: result.saved_path.clone(),
            created_at: result.created_at,
        }
    }
}
