//! Cart endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::dto::{AddItemRequest, CartSnapshot, ClearCartRequest, GetCartParams, MergeRequest, RemoveItemRequest, UpdateItemRequest};
use super::error::{ApiError, ApiResult};
use super::extract::{AuthenticatedUser, MaybeUser, ValidatedJson};
use super::AppState;
use crate::domain::value_objects::{GuestId, OwnerKey, ProductId, WeightSpecifier};

/// A signed-in user takes precedence over any guest id the client sends.
fn resolve_owner(MaybeUser(user): MaybeUser, guest_id: Option<String>) -> ApiResult<Option<OwnerKey>> {
    if let Some(id) = user {
        return Ok(Some(OwnerKey::from(id)));
    }
    guest_id.map(|id| GuestId::new(id).map(OwnerKey::from)).transpose().map_err(ApiError::from)
}

fn require_owner(user: MaybeUser, guest_id: Option<String>) -> ApiResult<OwnerKey> {
    resolve_owner(user, guest_id)?.ok_or_else(|| ApiError::invalid("guestId is required when not signed in"))
}

/// GET /api/cart
pub async fn get_cart(
    State(s): State<AppState>,
    user: MaybeUser,
    Query(params): Query<GetCartParams>,
) -> ApiResult<Json<CartSnapshot>> {
    let Some(owner) = resolve_owner(user, params.guest_id)? else {
        return Ok(Json(CartSnapshot::empty(None)));
    };
    let snapshot = match s.carts.get_cart(&owner).await? {
        Some(cart) => CartSnapshot::from(&cart),
        None => CartSnapshot::empty(Some(&owner)),
    };
    Ok(Json(snapshot))
}

/// POST /api/cart
pub async fn add_item(
    State(s): State<AppState>,
    user: MaybeUser,
    ValidatedJson(r): ValidatedJson<AddItemRequest>,
) -> ApiResult<(StatusCode, Json<CartSnapshot>)> {
    let owner = resolve_owner(user, r.guest_id)?.unwrap_or_else(|| OwnerKey::from(GuestId::generate()));
    let outcome = s.carts.add_item(owner, ProductId::new(r.product_id)?, WeightSpecifier::new(r.weight_specifier)?, r.quantity).await?;
    let status = if outcome.created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(CartSnapshot::from(&outcome.cart))))
}

/// PUT /api/cart
pub async fn update_item(
    State(s): State<AppState>,
    user: MaybeUser,
    ValidatedJson(r): ValidatedJson<UpdateItemRequest>,
) -> ApiResult<Json<CartSnapshot>> {
    let owner = require_owner(user, r.guest_id)?;
    let product_id = ProductId::new(r.product_id)?;
    let weight = WeightSpecifier::new(r.weight_specifier)?;
    let cart = s.carts.update_item_quantity(&owner, &product_id, &weight, r.quantity).await?;
    Ok(Json(CartSnapshot::from(&cart)))
}

/// DELETE /api/cart
pub async fn remove_item(
    State(s): State<AppState>,
    user: MaybeUser,
    ValidatedJson(r): ValidatedJson<RemoveItemRequest>,
) -> ApiResult<Json<CartSnapshot>> {
    let owner = require_owner(user, r.guest_id)?;
    let product_id = ProductId::new(r.product_id)?;
    let weight = WeightSpecifier::new(r.weight_specifier)?;
    let cart = s.carts.remove_item(&owner, &product_id, &weight).await?;
    Ok(Json(CartSnapshot::from(&cart)))
}

/// POST /api/cart/merge
pub async fn merge(
    State(s): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    ValidatedJson(r): ValidatedJson<MergeRequest>,
) -> ApiResult<Json<CartSnapshot>> {
    let cart = s.carts.merge_guest_into_user(GuestId::new(r.guest_id)?, user_id).await?;
    Ok(Json(CartSnapshot::from(&cart)))
}

/// POST /api/cart/clear
pub async fn clear(
    State(s): State<AppState>,
    user: MaybeUser,
    ValidatedJson(r): ValidatedJson<ClearCartRequest>,
) -> ApiResult<StatusCode> {
    let owner = require_owner(user, r.guest_id)?;
    s.carts.clear_cart(&owner).await?;
    Ok(StatusCode::NO_CONTENT)
}
