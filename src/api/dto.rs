//! Wire types for the cart endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::aggregates::{Cart, CartLine};
use crate::domain::value_objects::OwnerKey;

/// Unknown query keys are ignored; an identity passed here is never trusted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCartParams {
    pub guest_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddItemRequest {
    #[validate(length(min = 1, max = 128))]
    pub product_id: String,
    #[serde(alias = "weights")]
    #[validate(length(min = 1, max = 32))]
    pub weight_specifier: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(length(min = 1, max = 128))]
    pub guest_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 128))]
    pub product_id: String,
    #[serde(alias = "weights")]
    #[validate(length(min = 1, max = 32))]
    pub weight_specifier: String,
    /// Absolute quantity; zero or below removes the line.
    pub quantity: i64,
    #[validate(length(min = 1, max = 128))]
    pub guest_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoveItemRequest {
    #[validate(length(min = 1, max = 128))]
    pub product_id: String,
    #[serde(alias = "weights")]
    #[validate(length(min = 1, max = 32))]
    pub weight_specifier: String,
    #[validate(length(min = 1, max = 128))]
    pub guest_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MergeRequest {
    #[validate(length(min = 1, max = 128))]
    pub guest_id: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClearCartRequest {
    #[validate(length(min = 1, max = 128))]
    pub guest_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSnapshot {
    pub product_id: String,
    pub name: String,
    pub image_url: String,
    pub weight_specifier: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub computed_line_price: Decimal,
    pub quantity: u32,
}

impl From<&CartLine> for LineSnapshot {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            weight_specifier: line.weight_specifier.to_string(),
            computed_line_price: line.computed_line_price,
            quantity: line.quantity,
        }
    }
}

/// The cart as clients see it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_kind: Option<&'static str>,
    pub lines: Vec<LineSnapshot>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl CartSnapshot {
    /// Shape returned when the owner has no cart yet.
    pub fn empty(owner: Option<&OwnerKey>) -> Self {
        Self {
            owner_key: owner.map(|o| o.id().to_string()),
            owner_kind: owner.map(OwnerKey::kind),
            lines: vec![],
            total_price: Decimal::ZERO,
        }
    }
}

impl From<&Cart> for CartSnapshot {
    fn from(cart: &Cart) -> Self {
        Self {
            owner_key: Some(cart.owner().id().to_string()),
            owner_kind: Some(cart.owner().kind()),
            lines: cart.lines().iter().map(LineSnapshot::from).collect(),
            total_price: cart.total_price(),
        }
    }
}
