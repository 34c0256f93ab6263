//! Domain events
use crate::domain::value_objects::{GuestId, OwnerKey, ProductId, UserId, WeightSpecifier};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { owner: OwnerKey, product_id: ProductId, weight: WeightSpecifier, quantity: u32 },
    QuantityUpdated { owner: OwnerKey, product_id: ProductId, weight: WeightSpecifier, quantity: u32 },
    ItemRemoved { owner: OwnerKey, product_id: ProductId, weight: WeightSpecifier },
    GuestCartMerged { guest_id: GuestId, user_id: UserId, lines_merged: usize },
    CartCleared { owner: OwnerKey },
}

impl CartEvent {
    /// Subject suffix the event is published under.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ItemAdded { .. } => "item_added",
            Self::QuantityUpdated { .. } => "quantity_updated",
            Self::ItemRemoved { .. } => "item_removed",
            Self::GuestCartMerged { .. } => "guest_cart_merged",
            Self::CartCleared { .. } => "cart_cleared",
        }
    }
}
