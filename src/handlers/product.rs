use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Response,
    Extension,
};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    handlers::form::MultipartForm,
    handlers::response::json,
    middleware_layer::auth::CurrentUser,
    models::product::{CreateProductResponse, NewProduct},
    state::AppState,
    validation::catalog::{parse_flag, parse_price_in_cents, parse_uuid},
};

const MAX_NAME_LEN: usize = 255;

fn new_product_from(form: &MultipartForm) -> Result<NewProduct> {
    let name = form.required("name")?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }

    Ok(NewProduct {
        name: name.to_string(),
        price_in_cents: parse_price_in_cents(form.required("price")?)?,
        is_featured: form
            .text("isFeatured")
            .map(|v| parse_flag("isFeatured", v))
            .transpose()?
            .unwrap_or(false),
        is_archived: form
            .text("isArchived")
            .map(|v| parse_flag("isArchived", v))
            .transpose()?
            .unwrap_or(false),
        category_id: parse_uuid("categoryId", form.required("categoryId")?)?,
        color_id: parse_uuid("colorId", form.required("colorId")?)?,
        size_id: parse_uuid("sizeId", form.required("sizeId")?)?,
    })
}

/// Creates a product from a multipart form with one or more `images`.
///
/// Responds once the row is committed; image uploads continue in the
/// background.
pub async fn create_product(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(store_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = MultipartForm::read(multipart).await?;
    let new_product = new_product_from(&form)?;
    let images = form.take_files("images");

    let creation = state
        .products
        .create_product(store_id, user.user_id, new_product, images)
        .await?;

    tracing::info!(
        "🖼️ {} image upload(s) started for product {}",
        creation.image_uploads.len(),
        creation.product.id
    );
    creation
        .image_uploads
        .into_iter()
        .for_each(|task| task.detach());

    json(
        StatusCode::CREATED,
        &CreateProductResponse {
            product_id: creation.product.id,
        },
    )
}
