use std::sync::Arc;

use crate::clients::cloudflare::ImageUploader;
use crate::error::{AppError, Result};
use crate::models::product_image::ImageUpload;

/// Checks uploads by their magic bytes and hands them to image storage.
#[derive(Clone)]
pub struct ImageService {
    uploader: Arc<dyn ImageUploader>,
}

impl ImageService {
    pub fn new(uploader: Arc<dyn ImageUploader>) -> Self {
        Self { uploader }
    }

    /// Rejects anything that is not a recognizable image.
    pub fn validate(image: &ImageUpload) -> Result<()> {
        if image.bytes.is_empty() {
            return Err(AppError::Validation(format!(
                "Image {} is empty",
                image.filename
            )));
        }

        if !infer::is_image(&image.bytes) {
            return Err(AppError::Validation(format!(
                "File {} is not a supported image",
                image.filename
            )));
        }

        Ok(())
    }

    /// Uploads one image and returns its public URL.
    pub async fn upload(&self, image: &ImageUpload) -> Result<String> {
        Ok(self
            .uploader
            .upload_image(image.bytes.clone(), &image.filename)
            .await?)
    }

    pub async fn validate_and_upload(&self, image: &ImageUpload) -> Result<String> {
        Self::validate(image)?;
        let url = self.upload(image).await?;

        tracing::info!("🖼️ Image {} uploaded", image.filename);
        Ok(url)
    }
}
