use std::collections::HashMap;

use axum::extract::Multipart;
use tokio::time::{Duration, timeout};

use crate::error::{AppError, Result};
use crate::models::product_image::ImageUpload;

const FORM_TIMEOUT: Duration = Duration::from_secs(120);

/// A multipart form split into text fields and file parts.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: Vec<(String, ImageUpload)>,
}

impl MultipartForm {
    /// Drains `multipart`; any part with a filename is treated as a file.
    pub async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = MultipartForm::default();

        loop {
            let field = match timeout(FORM_TIMEOUT, multipart.next_field()).await {
                Ok(Ok(Some(field))) => field,
                Ok(Ok(None)) => break,
                Ok(Err(e)) => return Err(AppError::Multipart(format!("Parse error: {}", e))),
                Err(_) => return Err(AppError::Multipart("Upload timeout exceeded".into())),
            };

            let name = field.name().unwrap_or("").to_string();
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Multipart(format!("{}: {}", name, e)))?;
                    form.files.push((name, ImageUpload { filename, bytes }));
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Multipart(format!("{}: {}", name, e)))?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A text field that must be present and non-blank.
    pub fn required(&self, name: &str) -> Result<&str> {
        self.text(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
    }

    /// Removes and returns every file sent under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<ImageUpload> {
        let (matching, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = rest;
        matching.into_iter().map(|(_, upload)| upload).collect()
    }

    pub fn take_file(&mut self, name: &str) -> Option<ImageUpload> {
        self.take_files(name).into_iter().next()
    }
}
