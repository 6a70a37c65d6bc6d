// src/services/image_processor.rs
use crate::errors::{MoodframeError, Result};
use image::{GenericImageView, ImageFormat as ImgFormat};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const MAX_DIMENSION: u32 = 4096;

pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Checks that `data` decodes as an image and returns its dimensions.
    pub fn validate_image(&self, data: &[u8]) -> Result<(u32, u32)> {
        let img = image::load_from_memory(data).map_err(|e| {
            MoodframeError::ImageProcessing(format!("Invalid image format: {}", e))
        })?;

        let (width, height) = img.dimensions();

        if width == 0 || height == 0 {
            return Err(MoodframeError::ImageProcessing(
                "Image has zero area".to_string(),
            ));
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(MoodframeError::ImageProcessing(format!(
                "Image dimensions exceed {}x{}",
                MAX_DIMENSION, MAX_DIMENSION
            )));
        }

        Ok((width, height))
    }

    /// Returns PNG bytes, re-encoding when the endpoint answered with another format.
    pub fn to_png(&self, data: &[u8]) -> Result<Vec<u8>> {
        if matches!(image::guess_format(data), Ok(ImgFormat::Png)) {
            return Ok(data.to_vec());
        }

        let img = image::load_from_memory(data)
            .map_err(|e| MoodframeError::ImageProcessing(format!("Failed to load image: {}", e)))?;

        let mut output = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut output), ImgFormat::Png)
            .map_err(|e| {
                MoodframeError::ImageProcessing(format!("Failed to encode PNG: {}", e))
            })?;

        Ok(output)
    }

    pub async fn save(&self, dir: &Path, id: Uuid, png: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.png", id));
        tokio::fs::write(&path, png).await?;
        log::info!("Saved image to {}", path.display());
        Ok(path)
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}
