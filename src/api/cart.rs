//! Cart handlers.
//!
//! Every route acts on the caller's own cart. A cart is created empty the
//! first time it is touched.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use super::dto::{AddToCartRequest, CartResponse};
use super::error::ApiErrorResponse;
use super::identity::Caller;
use super::populate::ProductLookup;
use super::state::AppState;
use crate::domain::{Cart, CartItem, DomainError, ProductId, UserId};

/// Returns the caller's cart with products inlined.
///
/// # Errors
///
/// Returns 500 when the store cannot be read or written.
pub async fn get_cart(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<CartResponse>, ApiErrorResponse> {
    let cart = load_or_create_cart(&state, &caller.user_id).await?;
    let lookup = ProductLookup::load(state.product_repository.as_ref(), &cart.product_ids()).await?;
    Ok(Json(CartResponse::from_cart(&cart, &lookup)))
}

/// Adds units of a product to the caller's cart.
///
/// A product already in the cart has its quantity increased; otherwise a new
/// line is appended.
///
/// # Errors
///
/// - 400 when `productId` is missing or malformed
/// - 400 when `quantity` is missing or below 1
/// - 400 when the merged quantity overflows
pub async fn add_to_cart(
    State(state): State<AppState>,
    caller: Caller,
    body: Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<Json<CartResponse>, ApiErrorResponse> {
    let Json(request) = body?;
    let item = cart_item_from_request(&request)?;

    let cart = load_or_create_cart(&state, &caller.user_id)
        .await?
        .add_item(item)?;
    state.cart_repository.save(&cart).await?;

    tracing::debug!(
        user_id = %caller.user_id,
        product_id = %item.product_id,
        quantity = item.quantity,
        "Item added to cart"
    );
    Ok(Json(CartResponse::from_cart(&cart, &ProductLookup::empty())))
}

/// Removes every line of a product from the caller's cart.
///
/// Removing a product that is not in the cart leaves the cart unchanged.
///
/// # Errors
///
/// Returns 500 when the store cannot be read or written.
pub async fn remove_from_cart(
    State(state): State<AppState>,
    caller: Caller,
    Path(product_id): Path<String>,
) -> Result<Json<CartResponse>, ApiErrorResponse> {
    let cart = load_or_create_cart(&state, &caller.user_id).await?;

    // A malformed id cannot match any line.
    let cart = match ProductId::parse(&product_id) {
        Ok(product_id) => {
            let updated = cart.remove_product(&product_id);
            state.cart_repository.save(&updated).await?;
            updated
        }
        Err(_) => cart,
    };

    Ok(Json(CartResponse::from_cart(&cart, &ProductLookup::empty())))
}

fn cart_item_from_request(request: &AddToCartRequest) -> Result<CartItem, DomainError> {
    let product_id = request
        .product_id
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .ok_or(DomainError::MissingField("productId"))?;
    let product_id = ProductId::parse(product_id.trim())?;

    let quantity = request.quantity.ok_or(DomainError::MissingField("quantity"))?;
    let quantity = u32::try_from(quantity)
        .map_err(|_| DomainError::invalid_field("quantity", "must be at least 1"))?;

    CartItem::new(product_id, quantity)
}

/// Loads the user's cart, storing an empty one if none exists yet.
pub(crate) async fn load_or_create_cart(
    state: &AppState,
    user_id: &UserId,
) -> Result<Cart, ApiErrorResponse> {
    if let Some(cart) = state.cart_repository.find_by_user(user_id).await? {
        return Ok(cart);
    }

    let cart = Cart::empty(user_id.clone());
    state.cart_repository.save(&cart).await?;
    tracing::debug!(%user_id, "Created empty cart");
    Ok(cart)
}
