use std::net::{IpAddr, SocketAddr};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::models::session::SessionSecurityInfo;

/// Extracts the client IP: the first `X-Forwarded-For` hop, else the peer
/// address, else "unknown".
fn extract_real_ip(req: &Request<Body>) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|value| value.parse::<IpAddr>().ok());

    forwarded
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip())
        })
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// A middleware that records the caller's IP and user agent for session
/// creation.
pub async fn capture_client_info(mut req: Request<Body>, next: Next) -> Response {
    let info = SessionSecurityInfo {
        ip: extract_real_ip(&req),
        user_agent: req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("unknown")
            .to_string(),
    };

    req.extensions_mut().insert(info);
    next.run(req).await
}
