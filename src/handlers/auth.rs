use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension, Json,
};
use tower_cookies::Cookies;

use crate::{
    error::Result,
    handlers::cookie::{clear_session_cookie, session_cookie},
    handlers::response::{json, AuthResponse},
    middleware_layer::auth::PendingIdentity,
    models::otp::VerifyOtpPayload,
    models::session::SessionSecurityInfo,
    models::user::{CreateUserPayload, LoginPayload},
    state::AppState,
    validation::auth::{normalize_email, validate_payload},
};

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Extension(info): Extension<SessionSecurityInfo>,
    cookies: Cookies,
    Json(mut payload): Json<CreateUserPayload>,
) -> Result<Response> {
    payload.email = normalize_email(&payload.email);
    validate_payload(&payload)?;
    tracing::info!("📝 Register attempt for {}", payload.email);

    let started = state.register.register(&payload.name, &payload.email, info).await?;
    started.email_delivery.detach();
    cookies.add(session_cookie(&state.config.cookie_name, &started.session));

    json(
        StatusCode::CREATED,
        &AuthResponse::ok("Registration successful. Check your email for the verification code"),
    )
}

/// Handles user login: opens a pending session and emails a code.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Extension(info): Extension<SessionSecurityInfo>,
    cookies: Cookies,
    Json(mut payload): Json<LoginPayload>,
) -> Result<Response> {
    payload.email = normalize_email(&payload.email);
    validate_payload(&payload)?;
    tracing::info!("🔐 Login attempt for {}", payload.email);

    let started = state.auth.login(&payload.email, info).await?;
    started.email_delivery.detach();
    cookies.add(session_cookie(&state.config.cookie_name, &started.session));

    json(
        StatusCode::OK,
        &AuthResponse::ok("Verification code sent"),
    )
}

/// Confirms the emailed code and swaps the cookie for a verified session.
#[axum::debug_handler]
pub async fn verify_code(
    State(state): State<AppState>,
    Extension(identity): Extension<PendingIdentity>,
    cookies: Cookies,
    Json(payload): Json<VerifyOtpPayload>,
) -> Result<Response> {
    validate_payload(&payload)?;

    let session = match state.auth.verify_code(&payload.code, &identity.token).await {
        Ok(session) => session,
        Err(e) => {
            if e.invalidates_session() {
                clear_session_cookie(&cookies, &state.config.cookie_name);
            }
            return Err(e);
        }
    };

    cookies.add(session_cookie(&state.config.cookie_name, &session));
    tracing::info!("✅ User {} verified", session.user_id);

    json(StatusCode::OK, &AuthResponse::ok("Verification successful"))
}

/// Regenerates the code of the pending session and emails it again.
#[axum::debug_handler]
pub async fn resend_code(
    State(state): State<AppState>,
    Extension(identity): Extension<PendingIdentity>,
    cookies: Cookies,
) -> Result<Response> {
    match state.auth.resend_code(&identity.email, &identity.token).await {
        Ok(delivery) => delivery.detach(),
        Err(e) => {
            if e.invalidates_session() {
                clear_session_cookie(&cookies, &state.config.cookie_name);
            }
            return Err(e);
        }
    }

    tracing::info!("📧 Verification code resent to {}", identity.email);
    json(StatusCode::OK, &AuthResponse::ok("Verification code resent"))
}

/// Lets the client check that it still holds a usable pending session.
pub async fn check_code(Extension(identity): Extension<PendingIdentity>) -> Result<Response> {
    tracing::debug!("Pending session check for {}", identity.email);
    json(StatusCode::OK, &AuthResponse::ok("Session is valid"))
}
