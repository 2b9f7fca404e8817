use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    error::AppError,
    handlers::cookie::clear_session_cookie,
    models::token::TokenClaims,
    state::AppState,
};

/// Identity of a caller holding any valid token, verified or not.
#[derive(Clone, Debug)]
pub struct PendingIdentity {
    pub token: String,
    pub email: String,
}

/// Identity of a caller whose session has been verified.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

/// Extracts the session token from the request cookies.
fn extract_session_token(cookies: &Cookies, name: &str) -> Option<String> {
    cookies
        .get(name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Reads and verifies the token; a token that fails verification also
/// loses its cookie.
fn authenticate(state: &AppState, cookies: &Cookies) -> Result<(String, TokenClaims), AppError> {
    let cookie_name = state.config.cookie_name.as_str();
    let token = extract_session_token(cookies, cookie_name).ok_or_else(|| {
        tracing::warn!("❌ No session cookie found");
        AppError::Unauthorized
    })?;

    match state.tokens.verify(&token) {
        Ok(claims) => Ok((token, claims)),
        Err(e) => {
            tracing::warn!("❌ Session token rejected: {}", e);
            clear_session_cookie(cookies, cookie_name);
            Err(AppError::Unauthorized)
        }
    }
}

fn parse_claim(claim: Option<&str>) -> Option<Uuid> {
    claim.and_then(|value| Uuid::parse_str(value).ok())
}

/// A middleware that accepts any valid token, including pre-verification ones.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `cookies` - The request cookies.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// A `Response` or an `AppError::Unauthorized`.
pub async fn require_pending_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking pending authentication...");
    let (token, claims) = authenticate(&state, &cookies)?;

    request.extensions_mut().insert(PendingIdentity {
        email: claims.email,
        token,
    });

    Ok(next.run(request).await)
}

/// A middleware that requires a verified session: the token must carry both
/// the subject and the session id.
pub async fn require_auth(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");
    let (_, claims) = authenticate(&state, &cookies)?;

    let user_id = parse_claim(claims.sub.as_deref());
    let session_id = parse_claim(claims.sid.as_deref());

    let (Some(user_id), Some(session_id)) = (user_id, session_id) else {
        tracing::warn!("❌ Unverified session used on a protected route");
        clear_session_cookie(&cookies, &state.config.cookie_name);
        return Err(AppError::Unauthorized);
    };

    tracing::debug!("✅ User {} authenticated on session {}", user_id, session_id);
    request.extensions_mut().insert(CurrentUser {
        user_id,
        session_id,
    });

    Ok(next.run(request).await)
}
