// src/services/image_generator.rs
use crate::errors::{MoodframeError, Result};
use crate::models::{GeneratedImage, GeneratedPrompt, ModelTier, StylePreset, SynthesisRequest};
use crate::services::ImageProcessor;
use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const OUTPUT_WIDTH: u32 = 1024;
pub const OUTPUT_HEIGHT: u32 = 1024;
pub const MAX_SEED: u32 = 2_147_483_647;

/// Remote text-to-image endpoint. Returns the raw image body.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes>;
}

#[derive(Debug, Clone)]
pub struct TierSettings {
    pub model: String,
    pub steps: u32,
    pub guidance_scale: Option<f32>,
}

pub struct ImageGenerator {
    backend: Arc<dyn ImageBackend>,
    processor: Arc<ImageProcessor>,
    premium: TierSettings,
    fast: TierSettings,
}

impl ImageGenerator {
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        processor: Arc<ImageProcessor>,
        premium: TierSettings,
        fast: TierSettings,
    ) -> Self {
        Self {
            backend,
            processor,
            premium,
            fast,
        }
    }

    /// Tries the premium tier, then the fast tier once with the same prompt
    /// and seed. A missing seed is drawn at random and reported back.
    pub async fn generate(
        &self,
        prompt: &GeneratedPrompt,
        style: StylePreset,
        seed: Option<u32>,
    ) -> Result<GeneratedImage> {
        let seed = seed.unwrap_or_else(|| rand::rng().random_range(0..=MAX_SEED));
        log::info!(
            "Generating {}x{} image, style {}, seed {}",
            OUTPUT_WIDTH,
            OUTPUT_HEIGHT,
            style,
            seed
        );

        let premium_err = match self.attempt(ModelTier::Premium, prompt, seed).await {
            Ok(image) => return Ok(image),
            Err(e) => e,
        };
        log::warn!(
            "Premium model {} failed, falling back to {}: {}",
            self.premium.model,
            self.fast.model,
            premium_err
        );

        self.attempt(ModelTier::Fast, prompt, seed)
            .await
            .map_err(|fast_err| {
                log::error!("Both model tiers failed");
                MoodframeError::Generation(format!(
                    "premium model {} failed ({}); fast model {} failed ({})",
                    self.premium.model, premium_err, self.fast.model, fast_err
                ))
            })
    }

    async fn attempt(
        &self,
        tier: ModelTier,
        prompt: &GeneratedPrompt,
        seed: u32,
    ) -> Result<GeneratedImage> {
        let settings = match tier {
            ModelTier::Premium => &self.premium,
            ModelTier::Fast => &self.fast,
        };
        let request = SynthesisRequest {
            model: settings.model.clone(),
            prompt: prompt.text.clone(),
            negative_prompt: prompt.negative.clone(),
            width: OUTPUT_WIDTH,
            height: OUTPUT_HEIGHT,
            seed,
            steps: settings.steps,
            guidance_scale: settings.guidance_scale,
        };

        let start = Instant::now();
        let body = self.backend.synthesize(&request).await?;
        let dimensions = self.processor.validate_image(&body)?;
        let data = self.processor.to_png(&body)?;

        log::info!(
            "{} model {} returned {}x{} in {} ms",
            tier,
            settings.model,
            dimensions.0,
            dimensions.1,
            start.elapsed().as_millis()
        );

        Ok(GeneratedImage {
            data,
            seed,
            tier,
            model: settings.model.clone(),
            dimensions,
        })
    }
}

pub struct HuggingFaceImageClient {
    client: Client,
    api_base: String,
    token: String,
}

impl HuggingFaceImageClient {
    pub fn new(api_base: &str, token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MoodframeError::Generation(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
        })
    }
}

#[async_trait]
impl ImageBackend for HuggingFaceImageClient {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes> {
        let mut parameters = json!({
            "width": request.width,
            "height": request.height,
            "seed": request.seed,
            "num_inference_steps": request.steps,
            "negative_prompt": request.negative_prompt,
        });
        if let Some(scale) = request.guidance_scale {
            parameters["guidance_scale"] = json!(scale);
        }

        let response = self
            .client
            .post(format!("{}/models/{}", self.api_base, request.model))
            .bearer_auth(&self.token)
            .header("Accept", "image/png")
            .json(&json!({
                "inputs": request.prompt,
                "parameters": parameters
            }))
            .send()
            .await
            .map_err(|e| MoodframeError::Generation(format!("Image request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MoodframeError::Generation(format!(
                "{} returned {}: {}",
                request.model, status, error_text
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| MoodframeError::Generation(format!("Failed to read image body: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::image_processor::tests::encoded;
    use image::ImageFormat as ImgFormat;
    use parking_lot::Mutex;

    /// Answers per model id and records every request it receives.
    pub(crate) struct ScriptedBackend {
        pub failing_models: Vec<String>,
        /// Models that answer 200 with a body that is not an image.
        pub garbled_models: Vec<String>,
        pub requests: Mutex<Vec<SynthesisRequest>>,
    }

    impl ScriptedBackend {
        pub(crate) fn failing(models: &[&str]) -> Self {
            Self {
                failing_models: models.iter().map(|m| m.to_string()).collect(),
                garbled_models: Vec::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn garbling(models: &[&str]) -> Self {
            Self {
                garbled_models: models.iter().map(|m| m.to_string()).collect(),
                ..Self::failing(&[])
            }
        }

        pub(crate) fn models_called(&self) -> Vec<String> {
            self.requests.lock().iter().map(|r| r.model.clone()).collect()
        }
    }

    #[async_trait]
    impl ImageBackend for ScriptedBackend {
        async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes> {
            self.requests.lock().push(request.clone());
            if self.failing_models.contains(&request.model) {
                return Err(MoodframeError::Generation("503 quota exceeded".to_string()));
            }
            if self.garbled_models.contains(&request.model) {
                return Ok(Bytes::from_static(b"{\"error\":\"Model is currently loading\"}"));
            }
            Ok(Bytes::from(encoded(8, 8, ImgFormat::Jpeg)))
        }
    }

    pub(crate) fn tiers() -> (TierSettings, TierSettings) {
        (
            TierSettings {
                model: "premium-model".to_string(),
                steps: 30,
                guidance_scale: Some(3.5),
            },
            TierSettings {
                model: "fast-model".to_string(),
                steps: 4,
                guidance_scale: None,
            },
        )
    }

    fn generator(backend: Arc<ScriptedBackend>) -> ImageGenerator {
        let (premium, fast) = tiers();
        ImageGenerator::new(backend, Arc::new(ImageProcessor::new()), premium, fast)
    }

    fn prompt() -> GeneratedPrompt {
        GeneratedPrompt {
            text: "a majestic lion, abstract modern art".to_string(),
            negative: "watermark".to_string(),
        }
    }

    #[actix_web::test]
    async fn premium_success_never_touches_fast_tier() {
        let backend = Arc::new(ScriptedBackend::failing(&[]));
        let image = generator(backend.clone())
            .generate(&prompt(), StylePreset::Abstract, Some(42))
            .await
            .unwrap();

        assert_eq!(backend.models_called(), vec!["premium-model"]);
        assert_eq!(image.tier, ModelTier::Premium);
        assert_eq!(image.seed, 42);
        assert_eq!(image::guess_format(&image.data).unwrap(), ImgFormat::Png);
    }

    #[actix_web::test]
    async fn falls_back_once_with_same_prompt_and_seed() {
        let backend = Arc::new(ScriptedBackend::failing(&["premium-model"]));
        let image = generator(backend.clone())
            .generate(&prompt(), StylePreset::Abstract, Some(7))
            .await
            .unwrap();

        assert_eq!(backend.models_called(), vec!["premium-model", "fast-model"]);
        assert_eq!(image.tier, ModelTier::Fast);
        assert_eq!(image.model, "fast-model");

        let requests = backend.requests.lock();
        assert_eq!(requests[0].prompt, requests[1].prompt);
        assert_eq!(requests[0].seed, 7);
        assert_eq!(requests[1].seed, 7);
        assert_eq!((requests[1].width, requests[1].height), (1024, 1024));
        assert_eq!(requests[1].steps, 4);
    }

    #[actix_web::test]
    async fn undecodable_premium_body_falls_back_to_fast_tier() {
        let backend = Arc::new(ScriptedBackend::garbling(&["premium-model"]));
        let image = generator(backend.clone())
            .generate(&prompt(), StylePreset::Dreamscape, Some(5))
            .await
            .unwrap();

        assert_eq!(backend.models_called(), vec!["premium-model", "fast-model"]);
        assert_eq!(image.tier, ModelTier::Fast);
        assert_eq!(image.seed, 5);
        assert_eq!(image::guess_format(&image.data).unwrap(), ImgFormat::Png);
    }

    #[actix_web::test]
    async fn both_tiers_failing_is_generation_error() {
        let backend = Arc::new(ScriptedBackend::failing(&["premium-model", "fast-model"]));
        let result = generator(backend.clone())
            .generate(&prompt(), StylePreset::Artistic, None)
            .await;

        assert!(matches!(result, Err(MoodframeError::Generation(_))));
        assert_eq!(backend.models_called().len(), 2);
    }

    #[actix_web::test]
    async fn missing_seed_is_drawn_and_recorded() {
        let backend = Arc::new(ScriptedBackend::failing(&[]));
        let image = generator(backend.clone())
            .generate(&prompt(), StylePreset::Nature, None)
            .await
            .unwrap();

        assert!(image.seed <= MAX_SEED);
        assert_eq!(backend.requests.lock()[0].seed, image.seed);
    }
}
