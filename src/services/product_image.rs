use uuid::Uuid;

use crate::config::RetryPolicy;
use crate::error::{AppError, Result};
use crate::models::product_image::{ImageUpload, ProductImage};
use crate::repositories::product_image::ProductImageRepository;
use crate::services::image::ImageService;
use crate::tasks::BackgroundTask;

/// Handle on one detached product image upload.
pub type ImageUploadTask = BackgroundTask<Result<ProductImage>>;

/// Uploads product images off the request path and records them once stored.
#[derive(Clone)]
pub struct ProductImageService {
    images: ImageService,
    product_images: ProductImageRepository,
    retry: RetryPolicy,
}

impl ProductImageService {
    pub fn new(images: ImageService, product_images: ProductImageRepository, retry: RetryPolicy) -> Self {
        Self {
            images,
            product_images,
            retry,
        }
    }

    /// Starts one detached upload per image.
    pub fn dispatch(&self, product_id: Uuid, uploads: Vec<ImageUpload>) -> Vec<ImageUploadTask> {
        uploads
            .into_iter()
            .map(|upload| {
                let service = self.clone();
                BackgroundTask::spawn("product-image-upload", async move {
                    let outcome = service.upload_with_retry(product_id, &upload).await;
                    if let Err(e) = &outcome {
                        tracing::error!(
                            "❌ Giving up on image {} for product {}: {}",
                            upload.filename,
                            product_id,
                            e
                        );
                    }
                    outcome
                })
            })
            .collect()
    }

    /// Uploads `upload`, retrying with a linearly growing delay, then inserts
    /// the image row. The insert itself is attempted once.
    pub async fn upload_with_retry(&self, product_id: Uuid, upload: &ImageUpload) -> Result<ProductImage> {
        let mut last_error = None;

        for attempt in 1..=self.retry.max_attempts {
            match self.images.upload(upload).await {
                Ok(url) => {
                    let image = ProductImage::new(product_id, url);
                    self.product_images.create(&image).await?;

                    tracing::info!(
                        "🖼️ Image {} stored for product {} (attempt {})",
                        image.id,
                        product_id,
                        attempt
                    );
                    return Ok(image);
                }
                Err(e) => {
                    tracing::warn!(
                        "Upload of {} failed (attempt {}/{}): {}",
                        upload.filename,
                        attempt,
                        self.retry.max_attempts,
                        e
                    );
                    last_error = Some(e);
                    tokio::time::sleep(self.retry.base_delay * attempt).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::Internal("no upload attempts configured".to_string())))
    }
}
