// src/main.rs
use actix_web::{App, HttpServer, middleware, web};
use anyhow::Context;
use log::info;
use std::sync::Arc;

mod config;
mod errors;
mod handlers;
mod models;
mod services;

use crate::config::Config;
use crate::services::{
    EmotionAnalyzer, GenerationHistory, HuggingFaceClassifier, HuggingFaceImageClient,
    ImageGenerator, ImageProcessor, Pipeline,
};

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Moodframe service...");

    let config = Config::from_env()?;
    if let Some(dir) = &config.output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    // Initialize services
    let classifier = Arc::new(HuggingFaceClassifier::new(
        &config.api_base,
        &config.emotion_model,
        config.hf_token.clone(),
        config.classify_timeout,
    )?);
    let backend = Arc::new(HuggingFaceImageClient::new(
        &config.api_base,
        config.hf_token.clone(),
        config.generate_timeout,
    )?);
    let image_processor = Arc::new(ImageProcessor::new());

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(EmotionAnalyzer::new(classifier)),
        Arc::new(ImageGenerator::new(
            backend,
            image_processor.clone(),
            config.premium.clone(),
            config.fast.clone(),
        )),
        image_processor,
        Arc::new(GenerationHistory::default()),
        config.output_dir.clone(),
    ));

    info!(
        "Emotion model {}, image tiers {} -> {}",
        config.emotion_model, config.premium.model, config.fast.model
    );

    let app_state = AppState { pipeline };
    let output_dir = config.output_dir.clone();

    info!("Starting HTTP server on {}", config.bind_addr);

    HttpServer::new(move || {
        let app = App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(handlers::configure);

        match &output_dir {
            Some(dir) => app.service(actix_files::Files::new("/outputs", dir)),
            None => app,
        }
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run()
    .await?;

    Ok(())
}
