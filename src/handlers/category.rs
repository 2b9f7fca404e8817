use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Result,
    handlers::response::json,
    middleware_layer::auth::CurrentUser,
    models::category::{CategoryPayload, CategoryResponse},
    models::pagination::Pagination,
    state::AppState,
    validation::auth::validate_payload,
    validation::catalog::{non_empty, parse_uuid},
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListCategoriesQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub name: Option<String>,
    pub billboard_id: Option<String>,
}

#[axum::debug_handler]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Response> {
    validate_payload(&payload)?;
    let category = state
        .categories
        .create(store_id, user.user_id, &payload.name, payload.billboard_id)
        .await?;

    json(StatusCode::CREATED, &CategoryResponse::from(category))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Response> {
    let pagination = Pagination::from_query(query.page.as_deref(), query.limit.as_deref());
    let billboard_id = non_empty(query.billboard_id.as_deref())
        .map(|id| parse_uuid("billboardId", id))
        .transpose()?;

    let page = state
        .categories
        .paged_list(
            store_id,
            user.user_id,
            pagination,
            non_empty(query.name.as_deref()),
            billboard_id,
        )
        .await?
        .map(CategoryResponse::from);

    json(StatusCode::OK, &page)
}

pub async fn get_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    let category = state
        .categories
        .get(store_id, user.user_id, category_id)
        .await?;

    json(StatusCode::OK, &CategoryResponse::from(category))
}

#[axum::debug_handler]
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, category_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Response> {
    validate_payload(&payload)?;
    let category = state
        .categories
        .update(
            store_id,
            user.user_id,
            category_id,
            &payload.name,
            payload.billboard_id,
        )
        .await?;

    json(StatusCode::OK, &CategoryResponse::from(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, category_id)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    state
        .categories
        .delete(store_id, user.user_id, category_id)
        .await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
