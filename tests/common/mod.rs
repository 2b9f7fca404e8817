#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, StatusCode, header},
};
use bytes::Bytes;
use once_cell::sync::Lazy;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;
use zeroize::Zeroizing;

use flash_buy::clients::cloudflare::{ImageUploader, UploadError};
use flash_buy::clients::smtp::{MailError, Mailer};
use flash_buy::models::token::TokenClaims;
use flash_buy::config::{
    Config, ImageStorageConfig, KeyPair, PostgresConfig, RetryPolicy, SmtpConfig, StorageBackend,
};
use flash_buy::persistence::MemoryDatabase;
use flash_buy::repositories::Repositories;
use flash_buy::state::AppState;

pub const COOKIE_NAME: &str = "XPLife_id";

static KEYS: Lazy<KeyPair> = Lazy::new(|| KeyPair {
    private_pem: Zeroizing::new(include_str!("../fixtures/ecdsa_private.pem").to_string()),
    public_pem: include_str!("../fixtures/ecdsa_public.pem").to_string(),
});

/// PNG signature followed by filler; enough for magic-byte sniffing.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl SentEmail {
    /// Pulls the verification code out of the rendered template.
    pub fn code(&self) -> String {
        let marker = "text-align: center;\">";
        let start = self.body.find(marker).expect("code marker in email") + marker.len();
        let end = start + self.body[start..].find("</p>").expect("closing tag");
        self.body[start..end].trim().to_string()
    }
}

/// Records every delivered email; `fail_next` makes the next sends fail.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
    failures: AtomicU32,
    attempts: AtomicU32,
}

impl RecordingMailer {
    pub fn fail_next(&self, failures: u32) {
        self.failures.store(failures, Ordering::SeqCst);
    }

    /// Sends attempted so far, failed ones included.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn wait_for_attempts(&self, expected: u32) {
        for _ in 0..200 {
            if self.attempts() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {expected} send attempts, saw {}", self.attempts());
    }

    /// Waits until at least `count` emails went out and returns them all.
    pub async fn wait_for(&self, count: usize) -> Vec<SentEmail> {
        for _ in 0..200 {
            {
                let sent = self.sent.lock().await;
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} emails");
    }

    pub async fn last_code_for(&self, email: &str) -> String {
        for _ in 0..200 {
            {
                let sent = self.sent.lock().await;
                if let Some(mail) = sent.iter().rev().find(|m| m.to == email) {
                    return mail.code();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no email sent to {email}");
    }

    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(MailError::Transport("connection refused".to_string()));
        }

        self.sent.lock().await.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}

/// Fails the first `failures` uploads, then hands out numbered URLs.
#[derive(Default)]
pub struct ScriptedUploader {
    failures: AtomicU32,
    calls: AtomicU32,
}

impl ScriptedUploader {
    pub fn fail_next(&self, failures: u32) {
        self.failures.store(failures, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn wait_for_calls(&self, expected: u32) {
        for _ in 0..300 {
            if self.calls() >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {expected} upload calls, saw {}", self.calls());
    }
}

#[async_trait]
impl ImageUploader for ScriptedUploader {
    async fn upload_image(&self, _image: Bytes, filename: &str) -> Result<String, UploadError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();

        if failed {
            return Err(UploadError::Status(502));
        }
        Ok(format!("https://images.test/{call}/{filename}/public"))
    }
}

pub fn test_config() -> Config {
    Config {
        env: "dev".to_string(),
        log_level: "debug".to_string(),
        api_port: 0,
        keys: KEYS.clone(),
        storage: StorageBackend::Memory,
        postgres: PostgresConfig {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "secret-password".to_string(),
            dbname: "flash_buy_test".to_string(),
            max_connections: 1,
            timeout: Duration::from_secs(1),
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            user: "noreply@flashbuy.test".to_string(),
            password: "smtp-secret".to_string(),
        },
        cookie_name: COOKIE_NAME.to_string(),
        image_storage: ImageStorageConfig {
            token: "image-token".to_string(),
            url: "http://images.invalid/upload".to_string(),
            timeout: Duration::from_secs(1),
        },
        image_retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        },
        rate_limit_enabled: false,
        cors_origins: vec!["http://localhost:3000".to_string()],
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: MemoryDatabase,
    pub mailer: Arc<RecordingMailer>,
    pub uploader: Arc<ScriptedUploader>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(test_config(), ScriptedUploader::default())
    }

    pub fn with(config: Config, uploader: ScriptedUploader) -> Self {
        let db = MemoryDatabase::new();
        let mailer = Arc::new(RecordingMailer::default());
        let uploader = Arc::new(uploader);

        let state = AppState::build(
            config,
            Repositories::new(&db),
            uploader.clone(),
            mailer.clone(),
        )
        .expect("state builds from fixture keys");

        Self {
            router: flash_buy::router(state.clone()),
            state,
            db,
            mailer,
            uploader,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, cookie: Option<&str>, body: Value) -> Response<Body> {
        self.send(json_request("POST", uri, cookie, body)).await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Registers `email` and returns the pending session cookie.
    pub async fn register(&self, name: &str, email: &str) -> String {
        let response = self
            .post_json(
                "/v1/register",
                None,
                serde_json::json!({ "name": name, "email": email }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        session_cookie(&response).expect("register sets the session cookie")
    }

    /// Registers and verifies `email`, returning the verified session cookie.
    pub async fn verified_user(&self, email: &str) -> String {
        let pending = self.register("Test User", email).await;
        let code = self.mailer.last_code_for(email).await;

        let response = self
            .post_json(
                "/v1/verify-code",
                Some(&pending),
                serde_json::json!({ "code": code }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response).expect("verification sets a new cookie")
    }

    /// Creates a store for the cookie holder and returns its id.
    pub async fn create_store(&self, cookie: &str, name: &str) -> String {
        let response = self
            .post_json("/v1/stores", Some(cookie), serde_json::json!({ "name": name }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["storeId"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Polls until `table` holds `expected` rows.
    pub async fn wait_for_rows(&self, table: &str, expected: usize) {
        for _ in 0..300 {
            if self.db.count(table).await == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "{table} has {} rows, expected {expected}",
            self.db.count(table).await
        );
    }
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

const BOUNDARY: &str = "flashbuy-test-boundary";

pub fn multipart_request(method: &str, uri: &str, cookie: &str, parts: &[Part]) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// The raw `Set-Cookie` header for the session cookie, if any.
pub fn set_cookie_header(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{COOKIE_NAME}=")))
        .map(str::to_string)
}

/// `name=value` of the session cookie, ready for a `Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookie_header(response)
        .and_then(|header| header.split(';').next().map(str::to_string))
        .filter(|pair| pair.len() > COOKIE_NAME.len() + 1)
}

pub fn cookie_was_cleared(response: &Response<Body>) -> bool {
    set_cookie_header(response)
        .map(|header| header.starts_with(&format!("{COOKIE_NAME}=;")))
        .unwrap_or(false)
}

/// The claims of the token carried by a `name=value` cookie pair.
pub fn token_claims(app: &TestApp, cookie: &str) -> TokenClaims {
    let token = cookie.split_once('=').unwrap().1;
    app.state.tokens.verify(token).unwrap()
}
