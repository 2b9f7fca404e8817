use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::response::json,
    middleware_layer::auth::CurrentUser,
    models::store::{CreateStoreResponse, StorePayload, StoreResponse},
    state::AppState,
    validation::auth::validate_payload,
};

#[axum::debug_handler]
pub async fn create_store(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<StorePayload>,
) -> Result<Response> {
    validate_payload(&payload)?;
    let store = state.stores.create_store(&payload.name, user.user_id).await?;

    json(
        StatusCode::CREATED,
        &CreateStoreResponse { store_id: store.id },
    )
}

/// The caller's oldest store, used by the dashboard to pick a landing store.
pub async fn get_first_store(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response> {
    let store = state.stores.get_user_first_store(user.user_id).await?;
    json(StatusCode::OK, &StoreResponse::from(store))
}

pub async fn list_stores(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Response> {
    let stores: Vec<StoreResponse> = state
        .stores
        .list_user_stores(user.user_id)
        .await?
        .into_iter()
        .map(StoreResponse::from)
        .collect();

    json(StatusCode::OK, &stores)
}

pub async fn get_store(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
) -> Result<Response> {
    let store = state.stores.owned_store(store_id, user.user_id).await?;
    json(StatusCode::OK, &StoreResponse::from(store))
}

#[axum::debug_handler]
pub async fn update_store(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<StorePayload>,
) -> Result<Response> {
    validate_payload(&payload)?;
    let store = state
        .stores
        .update_store(store_id, user.user_id, &payload.name)
        .await?;

    json(StatusCode::OK, &StoreResponse::from(store))
}

pub async fn delete_store(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
) -> Result<Response> {
    state.stores.delete_store(store_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
