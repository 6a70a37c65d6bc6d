// src/services/mod.rs
pub mod emotion_analyzer;
pub mod history;
pub mod image_generator;
pub mod image_processor;
pub mod mode_detector;
pub mod pipeline;
pub mod prompt_builder;

pub use emotion_analyzer::{EmotionAnalyzer, HuggingFaceClassifier};
pub use history::GenerationHistory;
pub use image_generator::{HuggingFaceImageClient, ImageGenerator, TierSettings};
pub use image_processor::ImageProcessor;
pub use pipeline::Pipeline;
