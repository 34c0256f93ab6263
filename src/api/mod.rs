//! HTTP surface (axum).

pub mod cart;
pub mod dto;
pub mod error;
pub mod extract;

use axum::http::header::{HeaderName, InvalidHeaderValue, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::service::CartService;

pub use error::{ApiError, ApiResult};
pub use extract::{AuthenticatedUser, MaybeUser, USER_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub carts: CartService,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "sweetbites-storefront"})) }))
        .route("/api/cart", get(cart::get_cart).post(cart::add_item).put(cart::update_item).delete(cart::remove_item))
        .route("/api/cart/merge", post(cart::merge))
        .route("/api/cart/clear", post(cart::clear))
        .with_state(state)
}

/// CORS for the storefront SPA: a single allowed origin with credentials,
/// or permissive when none is configured.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, InvalidHeaderValue> {
    let Some(origin) = origin else { return Ok(CorsLayer::permissive()) };
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)])
        .allow_credentials(true))
}
