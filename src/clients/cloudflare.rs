use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use crate::config::ImageStorageConfig;

/// Failures talking to the image storage API.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upload rejected with status code {0}")]
    Status(u16),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("image storage reported failure: {0}")]
    Rejected(String),

    #[error("image storage returned no image URL")]
    NoVariants,
}

/// Pushes image bytes to object storage and returns the public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload_image(&self, image: Bytes, filename: &str) -> Result<String, UploadError>;
}

#[derive(Debug, Deserialize)]
struct CloudflareMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CloudflareResult {
    #[serde(default)]
    variants: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CloudflareResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareMessage>,
    result: Option<CloudflareResult>,
}

/// Interprets an upload response: status 200, `success: true` and at least
/// one variant URL, of which the first is returned.
fn parse_upload_response(status: u16, body: &[u8]) -> Result<String, UploadError> {
    if status != 200 {
        return Err(UploadError::Status(status));
    }

    let response: CloudflareResponse =
        sonic_rs::from_slice(body).map_err(|e| UploadError::Decode(e.to_string()))?;

    if !response.success {
        let reasons = response
            .errors
            .iter()
            .map(|e| format!("{} {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(UploadError::Rejected(reasons));
    }

    response
        .result
        .and_then(|result| result.variants.into_iter().next())
        .ok_or(UploadError::NoVariants)
}

/// Cloudflare Images client.
pub struct CloudflareClient {
    http: reqwest::Client,
    url: String,
    token: String,
}

impl CloudflareClient {
    pub fn new(config: &ImageStorageConfig) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            url: config.url.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl ImageUploader for CloudflareClient {
    async fn upload_image(&self, image: Bytes, filename: &str) -> Result<String, UploadError> {
        let part = Part::bytes(image.to_vec()).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;
        let url = parse_upload_response(status, &body)?;

        tracing::debug!("🖼️ Uploaded {} to image storage", filename);
        Ok(url)
    }
}
