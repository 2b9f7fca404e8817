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
    models::size::{SizePayload, SizeResponse},
    state::AppState,
    validation::auth::validate_payload,
    validation::catalog::non_empty,
};

#[axum::debug_handler]
pub async fn create_size(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<SizePayload>,
) -> Result<Response> {
    validate_payload(&payload)?;
    let size = state
        .sizes
        .create(store_id, user.user_id, &payload.name, &payload.value)
        .await?;

    json(StatusCode::CREATED, &SizeResponse::from(size))
}

pub async fn list_sizes(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    Query(query): Query<NameFilterQuery>,
) -> Result<Response> {
    let pagination = Pagination::from_query(query.page.as_deref(), query.limit.as_deref());
    let page = state
        .sizes
        .paged_list(
            store_id,
            user.user_id,
            pagination,
            non_empty(query.name.as_deref()),
        )
        .await?
        .map(SizeResponse::from);

    json(StatusCode::OK, &page)
}

pub async fn get_size(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, size_id)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    let size = state.sizes.get(store_id, user.user_id, size_id).await?;
    json(StatusCode::OK, &SizeResponse::from(size))
}

#[axum::debug_handler]
pub async fn update_size(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, size_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<SizePayload>,
) -> Result<Response> {
    validate_payload(&payload)?;
    let size = state
        .sizes
        .update(store_id, user.user_id, size_id, &payload.name, &payload.value)
        .await?;

    json(StatusCode::OK, &SizeResponse::from(size))
}

pub async fn delete_size(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, size_id)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    state.sizes.delete(store_id, user.user_id, size_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
