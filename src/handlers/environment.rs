use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{error::Result, handlers::response::json, state::AppState};

/// Dumps the loaded configuration, secrets excluded. Only served in `dev`.
pub async fn show_env(State(state): State<AppState>) -> Result<Response> {
    if !state.config.is_dev() {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    json(StatusCode::OK, state.config.as_ref())
}
