use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::response::json,
    handlers::query::NameFilterQuery,
    middleware_layer::auth::CurrentUser,
    models::pagination::Pagination,
    models::color::{ColorPayload, ColorResponse},
    state::AppState,
    validation::auth::validate_payload,
    validation::catalog::non_empty,
};

#[axum::debug_handler]
pub async fn create_color(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<ColorPayload>,
) -> Result<Response> {
    validate_payload(&payload)?;
    let color = state
        .colors
        .create(store_id, user.user_id, &payload.name, &payload.hex)
        .await?;

    json(StatusCode::CREATED, &ColorResponse::from(color))
}

pub async fn list_colors(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    Query(query): Query<NameFilterQuery>,
) -> Result<Response> {
    let pagination = Pagination::from_query(query.page.as_deref(), query.limit.as_deref());
    let page = state
        .colors
        .paged_list(
            store_id,
            user.user_id,
            pagination,
            non_empty(query.name.as_deref()),
        )
        .await?
        .map(ColorResponse::from);

    json(StatusCode::OK, &page)
}

pub async fn get_color(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, color_id)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    let color = state.colors.get(store_id, user.user_id, color_id).await?;
    json(StatusCode::OK, &ColorResponse::from(color))
}

#[axum::debug_handler]
pub async fn update_color(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, color_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ColorPayload>,
) -> Result<Response> {
    validate_payload(&payload)?;
    let color = state
        .colors
        .update(store_id, user.user_id, color_id, &payload.name, &payload.hex)
        .await?;

    json(StatusCode::OK, &ColorResponse::from(color))
}

pub async fn delete_color(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, color_id)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    state.colors.delete(store_id, user.user_id, color_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
