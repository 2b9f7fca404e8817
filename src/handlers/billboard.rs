use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    handlers::form::MultipartForm,
    handlers::response::json,
    middleware_layer::auth::CurrentUser,
    models::billboard::BillboardResponse,
    models::pagination::Pagination,
    state::AppState,
    validation::catalog::non_empty,
};

const MAX_LABEL_LEN: usize = 255;

#[derive(Deserialize, Debug)]
pub struct ListBillboardsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub label: Option<String>,
}

fn label_from(form: &MultipartForm) -> Result<String> {
    let label = form.required("label")?;
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(AppError::Validation(format!(
            "label must be at most {} characters",
            MAX_LABEL_LEN
        )));
    }
    Ok(label.to_string())
}

/// Creates a billboard from a `label` field and an `image` file.
pub async fn create_billboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = MultipartForm::read(multipart).await?;
    let label = label_from(&form)?;
    let image = form
        .take_file("image")
        .ok_or_else(|| AppError::Validation("image is required".to_string()))?;

    let billboard = state
        .billboards
        .create(store_id, user.user_id, &label, &image)
        .await?;

    json(StatusCode::CREATED, &BillboardResponse::from(billboard))
}

pub async fn list_billboards(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    Query(query): Query<ListBillboardsQuery>,
) -> Result<Response> {
    let pagination = Pagination::from_query(query.page.as_deref(), query.limit.as_deref());
    let page = state
        .billboards
        .paged_list(
            store_id,
            user.user_id,
            pagination,
            non_empty(query.label.as_deref()),
        )
        .await?
        .map(BillboardResponse::from);

    json(StatusCode::OK, &page)
}

pub async fn get_billboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, billboard_id)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    let billboard = state
        .billboards
        .get(store_id, user.user_id, billboard_id)
        .await?;

    json(StatusCode::OK, &BillboardResponse::from(billboard))
}

/// Replaces the label and, if an `image` file is sent, the image.
pub async fn update_billboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, billboard_id)): Path<(Uuid, Uuid)>,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = MultipartForm::read(multipart).await?;
    let label = label_from(&form)?;
    let image = form.take_file("image");

    let billboard = state
        .billboards
        .update(store_id, user.user_id, billboard_id, &label, image.as_ref())
        .await?;

    json(StatusCode::OK, &BillboardResponse::from(billboard))
}

pub async fn delete_billboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((store_id, billboard_id)): Path<(Uuid, Uuid)>,
) -> Result<Response> {
    state
        .billboards
        .delete(store_id, user.user_id, billboard_id)
        .await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
