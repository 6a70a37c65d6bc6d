// src/services/pipeline.rs
use crate::errors::{MoodframeError, Result};
use crate::models::{EmotionResult, GenerationResult, InputMode, StylePreset};
use crate::services::emotion_analyzer::MAX_TEXT_CHARS;
use crate::services::image_generator::MAX_SEED;
use crate::services::{
    EmotionAnalyzer, GenerationHistory, ImageGenerator, ImageProcessor, mode_detector,
    prompt_builder,
};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Text in, image out: mode detection, optional emotion analysis, prompt
/// construction, synthesis, then history bookkeeping.
pub struct Pipeline {
    analyzer: Arc<EmotionAnalyzer>,
    generator: Arc<ImageGenerator>,
    processor: Arc<ImageProcessor>,
    history: Arc<GenerationHistory>,
    output_dir: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(
        analyzer: Arc<EmotionAnalyzer>,
        generator: Arc<ImageGenerator>,
        processor: Arc<ImageProcessor>,
        history: Arc<GenerationHistory>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            analyzer,
            generator,
            processor,
            history,
            output_dir,
        }
    }

    pub async fn analyze(&self, text: &str) -> Result<EmotionResult> {
        self.analyzer.analyze(text).await
    }

    pub async fn run(
        &self,
        text: &str,
        style: StylePreset,
        seed: Option<u32>,
    ) -> Result<GenerationResult> {
        let text = text.trim();
        validate_request(text, seed)?;
        let mode = mode_detector::detect(text)?;
        log::info!("Input mode: {}, style: {}", mode, style);

        let emotion = match mode {
            InputMode::Emotion => Some(self.analyzer.analyze(text).await?),
            InputMode::Object => None,
        };

        let prompt = prompt_builder::build(mode, text, style, emotion.as_ref())?;
        log::debug!("Final prompt ({} chars): {}", prompt.text.len(), prompt.text);

        let image = self.generator.generate(&prompt, style, seed).await?;

        let id = Uuid::new_v4();
        let saved_path = match &self.output_dir {
            Some(dir) => Some(self.processor.save(dir, id, &image.data).await?),
            None => None,
        };

        let result = GenerationResult {
            id,
            image: image.data,
            original_text: text.to_string(),
            prompt_used: prompt.text,
            negative_prompt: prompt.negative,
            emotion,
            input_mode: mode,
            style,
            seed: image.seed,
            tier: image.tier,
            model: image.model,
            dimensions: image.dimensions,
            saved_path,
            created_at: chrono::Utc::now(),
        };

        self.history.push(result.clone());
        log::info!(
            "Generation {} complete with {} tier ({} in history)",
            result.id,
            result.tier,
            self.history.len()
        );
        Ok(result)
    }

    pub fn history(&self) -> &GenerationHistory {
        &self.history
    }
}

/// Rejects input no tier could accept, before any remote call is made.
fn validate_request(text: &str, seed: Option<u32>) -> Result<()> {
    let chars = text.chars().count();
    if chars > MAX_TEXT_CHARS {
        return Err(MoodframeError::Validation(format!(
            "Input text is {} characters, the limit is {}",
            chars, MAX_TEXT_CHARS
        )));
    }
    if let Some(seed) = seed.filter(|s| *s > MAX_SEED) {
        return Err(MoodframeError::Validation(format!(
            "Seed {} is out of range, the maximum is {}",
            seed, MAX_SEED
        )));
    }
    Ok(())
}
