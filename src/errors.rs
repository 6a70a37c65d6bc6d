// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoodframeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Emotion inference error: {0}")]
    Inference(String),

    #[error("Image generation error: {0}")]
    Generation(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MoodframeError>;

impl ResponseError for MoodframeError {
    fn status_code(&self) -> StatusCode {
        match self {
            MoodframeError::Validation(_) => StatusCode::BAD_REQUEST,
            MoodframeError::Inference(_) | MoodframeError::Generation(_) => StatusCode::BAD_GATEWAY,
            MoodframeError::ImageProcessing(_) | MoodframeError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let label = match self {
            MoodframeError::Validation(_) => "Validation error",
            MoodframeError::Inference(_) => "Emotion service error",
            MoodframeError::Generation(_) => "Image service error",
            MoodframeError::ImageProcessing(_) => "Image processing error",
            MoodframeError::Io(_) => "Storage error",
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": label,
            "message": self.to_string()
        }))
    }
}
