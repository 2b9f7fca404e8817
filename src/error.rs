use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::clients::cloudflare::UploadError;
use crate::persistence::RepoError;

/// The application's error type.
///
/// Every failure a handler can surface is one of these variants, and the
/// mapping to an HTTP status lives in a single exhaustive match below.
#[derive(Error, Debug)]
pub enum AppError {
    /// A persistence failure that no service translated into a domain error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),

    /// Signing a token failed (bad key material).
    #[error("Token error: {0}")]
    Token(String),

    /// The object storage rejected or failed an upload.
    #[error("Image upload failed: {0}")]
    Upload(#[from] UploadError),

    /// Missing or invalid session token.
    #[error("Unauthorized")]
    Unauthorized,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A multipart error.
    #[error("Multipart error: {0}")]
    Multipart(String),

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Verification code not found")]
    OtpNotFound,

    #[error("Verification code expired")]
    OtpExpired,

    #[error("Verification code invalid")]
    OtpInvalid,

    #[error("Session not found or expired")]
    SessionNotFoundOrExpired,

    #[error("Store not found")]
    StoreNotFound,

    /// The store exists but belongs to another user.
    #[error("Store does not belong to the user")]
    StoreNotOwned,

    #[error("Billboard not found")]
    BillboardNotFound,

    /// The billboard exists but is attached to another store.
    #[error("Billboard does not belong to the store")]
    BillboardNotInStore,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Size not found")]
    SizeNotFound,

    #[error("Color not found")]
    ColorNotFound,

    #[error("Color hex already exists in this store")]
    ColorHexAlreadyExists,

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Whether the session cookie must be dropped alongside this error.
    ///
    /// The verification flow treats a missing or expired challenge as a dead
    /// session: the client has to log in again.
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self,
            AppError::OtpNotFound | AppError::OtpExpired | AppError::SessionNotFoundOrExpired
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Repository(RepoError::NotFound) => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::Repository(RepoError::Conflict(ref msg)) => {
                tracing::warn!("Conflict: {}", msg);
                (StatusCode::CONFLICT, "Resource already exists".to_string())
            }

            AppError::Repository(ref e) => {
                tracing::error!("Repository error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Token(ref msg) => {
                tracing::error!("Token error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }

            AppError::Upload(ref e) => {
                tracing::error!("Image upload error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Image upload failed".to_string())
            }

            AppError::Unauthorized => {
                tracing::warn!("Authentication failed");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::Multipart(ref msg) => {
                tracing::debug!("Multipart error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::OtpInvalid => {
                tracing::warn!("Verification code invalid");
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            AppError::UserNotFound
            | AppError::StoreNotFound
            | AppError::BillboardNotFound
            | AppError::CategoryNotFound
            | AppError::SizeNotFound
            | AppError::ColorNotFound => {
                tracing::debug!("{}", self);
                (StatusCode::NOT_FOUND, self.to_string())
            }

            AppError::UserAlreadyExists | AppError::ColorHexAlreadyExists => {
                tracing::warn!("{}", self);
                (StatusCode::CONFLICT, self.to_string())
            }

            AppError::OtpNotFound | AppError::OtpExpired | AppError::SessionNotFoundOrExpired => {
                tracing::warn!("🔐 {}", self);
                (StatusCode::FORBIDDEN, self.to_string())
            }

            AppError::StoreNotOwned | AppError::BillboardNotInStore => {
                tracing::warn!("Authorization failed: {}", self);
                (StatusCode::FORBIDDEN, "Forbidden".to_string())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (
            status,
            [(http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
