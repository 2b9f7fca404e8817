use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use http::{HeaderValue, Method, header};
use tower_cookies::CookieManagerLayer;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod db;
pub mod error;
pub mod state;
pub mod tasks;

pub mod clients {
    pub mod cloudflare;
    pub mod smtp;
}

pub mod models {
    pub mod billboard;
    pub mod category;
    pub mod color;
    pub mod otp;
    pub mod pagination;
    pub mod product;
    pub mod product_image;
    pub mod session;
    pub mod size;
    pub mod store;
    pub mod token;
    pub mod user;
}

pub mod notifications {
    pub mod email;
}

pub mod persistence;
pub mod repositories;

pub mod services {
    pub mod auth;
    pub mod billboard;
    pub mod category;
    pub mod color;
    pub mod image;
    pub mod otp;
    pub mod product;
    pub mod product_image;
    pub mod register;
    pub mod session;
    pub mod size;
    pub mod store;
    pub mod token;
    pub mod user;
}

pub mod handlers {
    pub mod auth;
    pub mod billboard;
    pub mod category;
    pub mod color;
    pub mod cookie;
    pub mod environment;
    pub mod form;
    pub mod product;
    pub mod query;
    pub mod response;
    pub mod size;
    pub mod store;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod client;
}

pub mod validation {
    pub mod auth;
    pub mod catalog;
}

use state::AppState;

/// Largest request body accepted, sized for multipart image uploads.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::COOKIE,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}

/// Builds the `/v1` API router.
pub fn router(state: AppState) -> Router {
    let mut public_routes = Router::new()
        .route("/v1/register", post(handlers::auth::register))
        .route("/v1/login", post(handlers::auth::login));

    if state.config.rate_limit_enabled {
        // one request every 12 seconds per client, bursts of 5
        let governor_conf = GovernorConfigBuilder::default()
            .per_second(12)
            .burst_size(5)
            .key_extractor(SmartIpKeyExtractor)
            .finish();

        match governor_conf {
            Some(conf) => {
                public_routes = public_routes.layer(GovernorLayer::new(Arc::new(conf)));
            }
            None => tracing::error!("❌ Invalid rate limit configuration; login is not rate limited"),
        }
    }

    let public_routes = public_routes
        .route("/v1/env", get(handlers::environment::show_env))
        .with_state(state.clone());

    let pending_routes = Router::new()
        .route("/v1/verify-code", post(handlers::auth::verify_code))
        .route("/v1/resend-code", post(handlers::auth::resend_code))
        .route("/v1/check-code", get(handlers::auth::check_code))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_pending_auth,
        ))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/v1/stores", post(handlers::store::create_store))
        .route("/v1/me/stores", get(handlers::store::list_stores))
        .route("/v1/me/stores/first", get(handlers::store::get_first_store))
        .route(
            "/v1/stores/{store_id}",
            get(handlers::store::get_store)
                .put(handlers::store::update_store)
                .delete(handlers::store::delete_store),
        )
        .route(
            "/v1/stores/{store_id}/billboards",
            post(handlers::billboard::create_billboard).get(handlers::billboard::list_billboards),
        )
        .route(
            "/v1/stores/{store_id}/billboards/{billboard_id}",
            get(handlers::billboard::get_billboard)
                .put(handlers::billboard::update_billboard)
                .delete(handlers::billboard::delete_billboard),
        )
        .route(
            "/v1/stores/{store_id}/categories",
            post(handlers::category::create_category).get(handlers::category::list_categories),
        )
        .route(
            "/v1/stores/{store_id}/categories/{category_id}",
            get(handlers::category::get_category)
                .put(handlers::category::update_category)
                .delete(handlers::category::delete_category),
        )
        .route(
            "/v1/stores/{store_id}/sizes",
            post(handlers::size::create_size).get(handlers::size::list_sizes),
        )
        .route(
            "/v1/stores/{store_id}/sizes/{size_id}",
            get(handlers::size::get_size)
                .put(handlers::size::update_size)
                .delete(handlers::size::delete_size),
        )
        .route(
            "/v1/stores/{store_id}/colors",
            post(handlers::color::create_color).get(handlers::color::list_colors),
        )
        .route(
            "/v1/stores/{store_id}/colors/{color_id}",
            get(handlers::color::get_color)
                .put(handlers::color::update_color)
                .delete(handlers::color::delete_color),
        )
        .route(
            "/v1/stores/{store_id}/products",
            post(handlers::product::create_product),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(public_routes)
        .merge(pending_routes)
        .merge(protected_routes)
        .layer(from_fn(middleware_layer::client::capture_client_info))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false))
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(CookieManagerLayer::new())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors_layer(&state.config.cors_origins))
}
