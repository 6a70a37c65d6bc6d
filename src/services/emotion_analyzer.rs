// src/services/emotion_analyzer.rs
use crate::errors::{MoodframeError, Result};
use crate::models::{EmotionLabel, EmotionResult, EmotionScore};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Longest input accepted for classification, in characters. Longer texts
/// are rejected rather than truncated.
pub const MAX_TEXT_CHARS: usize = 1000;

/// Remote text classifier returning one score per label.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>>;
}

pub struct EmotionAnalyzer {
    classifier: Arc<dyn EmotionClassifier>,
}

impl EmotionAnalyzer {
    pub fn new(classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self { classifier }
    }

    pub async fn analyze(&self, text: &str) -> Result<EmotionResult> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MoodframeError::Validation(
                "Input text cannot be empty".to_string(),
            ));
        }
        let chars = text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(MoodframeError::Validation(format!(
                "Input text is {} characters, the limit is {}",
                chars, MAX_TEXT_CHARS
            )));
        }

        let scores = self.classifier.classify(text).await?;
        let result = EmotionResult::from_scores(scores).ok_or_else(|| {
            MoodframeError::Inference("Classifier returned no known emotion labels".to_string())
        })?;

        log::info!(
            "Primary emotion: {} (confidence {:.3}, valence {}, arousal {})",
            result.primary_emotion,
            result.confidence,
            result.valence,
            result.arousal
        );
        Ok(result)
    }
}

pub struct HuggingFaceClassifier {
    client: Client,
    endpoint: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationPayload {
    Batched(Vec<Vec<RawScore>>),
    Flat(Vec<RawScore>),
}

impl HuggingFaceClassifier {
    pub fn new(api_base: &str, model: &str, token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MoodframeError::Inference(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/models/{}", api_base.trim_end_matches('/'), model),
            token,
        })
    }
}

#[async_trait]
impl EmotionClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<EmotionScore>> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&json!({ "inputs": text }))
            .send()
            .await
            .map_err(|e| MoodframeError::Inference(format!("Classification request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MoodframeError::Inference(format!(
                "Classifier returned {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| {
            MoodframeError::Inference(format!("Failed to read classifier response: {}", e))
        })?;
        let scores = parse_scores(&body)?;

        log::debug!(
            "Classified {} chars in {} ms: {:?}",
            text.len(),
            start.elapsed().as_millis(),
            scores
        );
        Ok(scores)
    }
}

/// Accepts both `[[{label, score}]]` and `[{label, score}]`, dropping labels
/// outside the taxonomy.
fn parse_scores(body: &str) -> Result<Vec<EmotionScore>> {
    let payload: ClassificationPayload = serde_json::from_str(body).map_err(|e| {
        MoodframeError::Inference(format!("Failed to parse classifier response: {}", e))
    })?;

    let raw = match payload {
        ClassificationPayload::Batched(mut batches) => {
            if batches.is_empty() {
                Vec::new()
            } else {
                batches.swap_remove(0)
            }
        }
        ClassificationPayload::Flat(scores) => scores,
    };

    Ok(raw
        .into_iter()
        .filter_map(|r| match r.label.parse::<EmotionLabel>() {
            Ok(label) => Some(EmotionScore {
                label,
                confidence: r.score,
            }),
            Err(()) => {
                log::warn!("Ignoring unknown emotion label {:?}", r.label);
                None
            }
        })
        .collect())
}
