use tower_cookies::cookie::time::{Duration, OffsetDateTime};
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::models::session::Session;

/// Builds the session cookie; it lives exactly as long as the session.
pub fn session_cookie(name: &str, session: &Session) -> Cookie<'static> {
    let expires = OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH);
    let max_age = (session.expires_at - chrono::Utc::now()).num_seconds().max(0);

    Cookie::build((name.to_string(), session.token.clone()))
        .path("/")
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Strict)
        .max_age(Duration::seconds(max_age))
        .expires(expires)
        .build()
}

/// Overwrites the session cookie with an empty, already expired one.
pub fn clear_session_cookie(cookies: &Cookies, name: &str) {
    let cookie = Cookie::build((name.to_string(), String::new()))
        .path("/")
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Strict)
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build();

    cookies.add(cookie);
    tracing::debug!("🔐 Session cookie cleared");
}
