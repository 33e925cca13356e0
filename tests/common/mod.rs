//! Common test helpers for integration tests.
//!
//! Builds an in-memory `AppState`, drives the router with
//! `tower::ServiceExt::oneshot`, and assembles JSON and multipart requests.
//!
//! # Note
//!
//! Each integration test file compiles this module into its own crate, so
//! helpers used by only one of them would otherwise warn as dead code.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use futures::FutureExt;
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use storefront_api::api::{AppState, Role, StaticTokenAuthenticator, create_router};
use storefront_api::domain::{Cart, PricingPolicy, Product, ProductId, UserId};
use storefront_api::infrastructure::{
    CartRepository, InMemoryCartRepository, InMemoryUploader, MediaUploader, ProductRepository,
    Repositories, RepositoryError, RepositoryFuture, UploadError,
};

pub const USER_TOKEN: &str = "user-token";
pub const OTHER_USER_TOKEN: &str = "other-user-token";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const USER_ID: &str = "user-1";
pub const OTHER_USER_ID: &str = "user-2";
pub const ADMIN_ID: &str = "admin-1";

const BOUNDARY: &str = "storefront-test-boundary";

// =============================================================================
// AppState Creation Helpers
// =============================================================================

fn test_authenticator() -> StaticTokenAuthenticator {
    StaticTokenAuthenticator::new()
        .with_token(USER_TOKEN, UserId::new(USER_ID), Role::User)
        .with_token(OTHER_USER_TOKEN, UserId::new(OTHER_USER_ID), Role::User)
        .with_token(ADMIN_TOKEN, UserId::new(ADMIN_ID), Role::Admin)
}

/// Test state plus a handle on the in-memory media host.
pub struct TestContext {
    pub state: AppState,
    pub uploader: InMemoryUploader,
}

/// Creates a test `AppState` with in-memory repositories and media host.
pub fn create_test_context() -> TestContext {
    let uploader = InMemoryUploader::new();
    let state = AppState::new(
        Repositories::in_memory(),
        Arc::new(uploader.clone()),
        Arc::new(test_authenticator()),
    );
    TestContext { state, uploader }
}

/// Creates a test `AppState` that prices orders with the given policy.
pub fn create_test_context_with_pricing(pricing_policy: PricingPolicy) -> TestContext {
    let TestContext { state, uploader } = create_test_context();
    TestContext {
        state: state.with_pricing_policy(pricing_policy),
        uploader,
    }
}

/// Creates a test `AppState` whose media host rejects every upload.
pub fn create_test_state_with_failing_uploader() -> AppState {
    AppState::new(
        Repositories::in_memory(),
        Arc::new(FailingUploader),
        Arc::new(test_authenticator()),
    )
}

/// Creates a test `AppState` whose cart store accepts reads but fails
/// every write. `seeded` carts are readable.
pub async fn create_test_state_with_failing_cart_writes(seeded: &[Cart]) -> AppState {
    let inner = InMemoryCartRepository::new();
    for cart in seeded {
        inner.save(cart).await.unwrap();
    }
    let repositories = Repositories {
        cart_repository: Arc::new(WriteFailingCartRepository { inner }),
        ..Repositories::in_memory()
    };
    AppState::new(
        repositories,
        Arc::new(InMemoryUploader::new()),
        Arc::new(test_authenticator()),
    )
}

// =============================================================================
// Fail Injection
// =============================================================================

struct FailingUploader;

impl MediaUploader for FailingUploader {
    fn upload(&self, _content: bytes::Bytes, _folder: &str) -> BoxFuture<'static, Result<String, UploadError>> {
        async { Err(UploadError::Provider("Invalid image file".to_string())) }.boxed()
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

struct WriteFailingCartRepository {
    inner: InMemoryCartRepository,
}

impl CartRepository for WriteFailingCartRepository {
    fn find_by_user(&self, user_id: &UserId) -> RepositoryFuture<Option<Cart>> {
        self.inner.find_by_user(user_id)
    }

    fn save(&self, _cart: &Cart) -> RepositoryFuture<()> {
        async { Err(RepositoryError::DatabaseError("cart store unavailable".to_string())) }.boxed()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Stores a product directly through the repository.
pub async fn save_product(state: &AppState, name: &str, price: Decimal, stock: u32) -> Product {
    let product = Product::new(ProductId::generate(), name, price, stock).unwrap();
    state.product_repository.save(&product).await.unwrap();
    product
}

// =============================================================================
// Request Helpers
// =============================================================================

/// Sends `request` through a fresh router and returns the status and the
/// JSON body (`Value::Null` when the body is empty).
pub async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn with_token(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

/// A request without a body.
pub fn empty_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    with_token(Request::builder().method(method).uri(uri), token)
        .body(Body::empty())
        .unwrap()
}

/// A request with a JSON body.
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    with_token(Request::builder().method(method).uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A `multipart/form-data` request with text fields and an optional
/// `image` file part.
pub fn multipart_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    image: Option<&[u8]>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"image.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    with_token(Request::builder().method(method).uri(uri), token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
