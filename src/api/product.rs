//! Catalog handlers.
//!
//! # Handlers
//!
//! - `GET /api/products`: list every product
//! - `GET /api/products/search?q=`: case-insensitive name search
//! - `GET /api/products/{id}`: fetch one product
//! - `POST /api/products`: create from a multipart form (admin)
//! - `PUT /api/products/{id}`: partial update from a multipart form (admin)
//! - `DELETE /api/products/{id}`: remove a product (admin)

use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartRejection,
        rejection::QueryRejection,
    },
    http::StatusCode,
};
use bytes::Bytes;
use rust_decimal::Decimal;

use super::dto::{MessageResponse, ProductResponse, SearchQuery};
use super::error::ApiErrorResponse;
use super::identity::AdminCaller;
use super::state::AppState;
use crate::domain::{DomainError, Product, ProductId, ProductPatch};
use crate::infrastructure::PRODUCT_IMAGE_FOLDER;

// =============================================================================
// Read Handlers
// =============================================================================

/// Lists every product in the catalog.
///
/// # Errors
///
/// Returns 500 when the store cannot be read.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductResponse>>, ApiErrorResponse> {
    let products = state.product_repository.find_all().await?;
    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}

/// Searches products whose name contains `q`, ignoring case.
///
/// # Errors
///
/// - 400 when `q` is missing or blank
/// - 500 when the store cannot be read
pub async fn search_products(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<ProductResponse>>, ApiErrorResponse> {
    let Query(query) = query?;
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .ok_or_else(|| {
            ApiErrorResponse::bad_request("VALIDATION_ERROR", "Search query is required")
        })?;

    let products = state.product_repository.search_by_name(term).await?;
    tracing::debug!(query = term, results = products.len(), "Product search");

    Ok(Json(products.iter().map(ProductResponse::from).collect()))
}

/// Fetches a single product.
///
/// # Errors
///
/// - 400 when `id` is not a 24-character hex identifier
/// - 404 when no such product exists
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiErrorResponse> {
    let product_id = ProductId::parse(&id)?;
    let product = load_product(&state, &product_id).await?;
    Ok(Json(ProductResponse::from(&product)))
}

// =============================================================================
// Write Handlers
// =============================================================================

/// Creates a product from a multipart form.
///
/// # Form fields
///
/// `name`, `price` and `stock` are required. `description` is optional, and
/// an `image` file part is uploaded to the media host before the product is
/// stored.
///
/// # Errors
///
/// - 400 when a required field is missing or malformed
/// - 400 when the upload or the store write fails
pub async fn create_product(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiErrorResponse> {
    let ProductForm {
        name,
        price,
        description,
        stock,
        image,
    } = ProductForm::read(multipart?).await?;

    let (Some(name), Some(price), Some(stock)) = (name, price, stock) else {
        return Err(missing_required_fields().into());
    };
    let product = Product::new(
        ProductId::generate(),
        name,
        parse_price(&price)?,
        parse_stock(&stock)?,
    )?
    .with_description(description);

    let image = upload_image(&state, image).await?;
    let product = product.with_image(image);

    state
        .product_repository
        .save(&product)
        .await
        .map_err(|error| ApiErrorResponse::from(error).into_bad_request())?;

    tracing::info!(
        product_id = %product.product_id,
        admin = %caller.user_id,
        "Product created"
    );
    Ok((StatusCode::CREATED, Json(ProductResponse::from(&product))))
}

/// Applies a partial update from a multipart form.
///
/// Only non-empty fields replace stored values. A new `image` file replaces
/// the stored URL. After merging, name, price and stock must still be set.
///
/// # Errors
///
/// - 400 when `id` is malformed or the merged product is incomplete
/// - 404 when no such product exists
/// - 400 when the upload or the store write fails
pub async fn update_product(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProductResponse>, ApiErrorResponse> {
    let product_id = ProductId::parse(&id)?;
    let existing = load_product(&state, &product_id).await?;
    let form = ProductForm::read(multipart?).await?;

    let patch = ProductPatch {
        name: form.name,
        price: form.price.as_deref().map(parse_price).transpose()?,
        description: form.description,
        image: None,
        stock: form.stock.as_deref().map(parse_stock).transpose()?,
    };
    if patch.is_empty() && form.image.is_none() {
        tracing::debug!(%product_id, "Product update carries no fields");
    }

    let merged = existing.apply(patch)?;
    let product = match upload_image(&state, form.image).await? {
        Some(url) => merged.with_image(Some(url)),
        None => merged,
    };

    state
        .product_repository
        .save(&product)
        .await
        .map_err(|error| ApiErrorResponse::from(error).into_bad_request())?;

    tracing::info!(%product_id, admin = %caller.user_id, "Product updated");
    Ok(Json(ProductResponse::from(&product)))
}

/// Removes a product.
///
/// # Errors
///
/// - 400 when `id` is malformed
/// - 404 when no such product exists
pub async fn delete_product(
    State(state): State<AppState>,
    AdminCaller(caller): AdminCaller,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiErrorResponse> {
    let product_id = ProductId::parse(&id)?;
    if !state.product_repository.delete(&product_id).await? {
        return Err(ApiErrorResponse::not_found("Product not found"));
    }

    tracing::info!(%product_id, admin = %caller.user_id, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted")))
}

// =============================================================================
// Helper Types and Functions
// =============================================================================

/// Fields of a product multipart form. Blank text fields and empty files
/// are treated as absent.
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    price: Option<String>,
    description: Option<String>,
    stock: Option<String>,
    image: Option<Bytes>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiErrorResponse> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(field_name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };
            match field_name.as_str() {
                "image" => {
                    let content = field.bytes().await?;
                    form.image = Some(content).filter(|content| !content.is_empty());
                }
                "name" => form.name = non_blank(field.text().await?),
                "price" => form.price = non_blank(field.text().await?),
                "description" => form.description = non_blank(field.text().await?),
                "stock" => form.stock = non_blank(field.text().await?),
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

const fn missing_required_fields() -> DomainError {
    DomainError::MissingField("name, price, stock")
}

fn parse_price(value: &str) -> Result<Decimal, DomainError> {
    let trimmed = value.trim();
    trimmed
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| DomainError::invalid_field("price", "must be a number"))
}

fn parse_stock(value: &str) -> Result<u32, DomainError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| DomainError::invalid_field("stock", "must be a non-negative integer"))
}

async fn load_product(state: &AppState, product_id: &ProductId) -> Result<Product, ApiErrorResponse> {
    state
        .product_repository
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| ApiErrorResponse::not_found("Product not found"))
}

async fn upload_image(
    state: &AppState,
    image: Option<Bytes>,
) -> Result<Option<String>, ApiErrorResponse> {
    let Some(content) = image else {
        return Ok(None);
    };
    let size = content.len();
    let url = state
        .media_uploader
        .upload(content, PRODUCT_IMAGE_FOLDER)
        .await?;
    tracing::debug!(
        provider = state.media_uploader.provider_name(),
        size,
        %url,
        "Product image uploaded"
    );
    Ok(Some(url))
}
