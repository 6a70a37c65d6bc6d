// src/config.rs
use crate::services::TierSettings;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://router.huggingface.co/hf-inference";
const DEFAULT_EMOTION_MODEL: &str = "j-hartmann/emotion-english-distilroberta-base";
const DEFAULT_PREMIUM_MODEL: &str = "black-forest-labs/FLUX.1-dev";
const DEFAULT_FAST_MODEL: &str = "black-forest-labs/FLUX.1-schnell";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub hf_token: String,
    pub api_base: String,
    pub emotion_model: String,
    pub premium: TierSettings,
    pub fast: TierSettings,
    /// Generated images are written here when set.
    pub output_dir: Option<PathBuf>,
    pub classify_timeout: Duration,
    pub generate_timeout: Duration,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let secs = |key: &str, default: u64| -> Result<Duration> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{} must be a whole number of seconds", key)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let hf_token = lookup("HF_TOKEN")
            .filter(|v| !v.trim().is_empty())
            .context("HF_TOKEN must be set")?;

        Ok(Self {
            bind_addr: get("MOODFRAME_BIND", "0.0.0.0:8000"),
            hf_token,
            api_base: get("HF_API_BASE", DEFAULT_API_BASE),
            emotion_model: get("EMOTION_MODEL", DEFAULT_EMOTION_MODEL),
            premium: TierSettings {
                model: get("PREMIUM_IMAGE_MODEL", DEFAULT_PREMIUM_MODEL),
                steps: 30,
                guidance_scale: Some(3.5),
            },
            fast: TierSettings {
                model: get("FAST_IMAGE_MODEL", DEFAULT_FAST_MODEL),
                steps: 4,
                guidance_scale: None,
            },
            output_dir: lookup("MOODFRAME_OUTPUT_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            classify_timeout: secs("CLASSIFY_TIMEOUT_SECS", 30)?,
            generate_timeout: secs("GENERATE_TIMEOUT_SECS", 120)?,
        })
    }
}
