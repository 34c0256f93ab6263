//! Ports the cart service drives: cart storage, catalog lookup and event
//! publishing. Adapters live in [`crate::infrastructure`].

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::aggregates::Cart;
use crate::domain::events::CartEvent;
use crate::domain::value_objects::{OwnerKey, ProductId};

/// Errors raised by storage and catalog adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store query failed: {0}")]
    Query(String),

    #[error("stored document could not be decoded: {0}")]
    Serialization(String),
}

/// Document store holding one cart per owner.
///
/// Each call is atomic for the single document it touches. Nothing here
/// spans documents, so merge is save-then-delete rather than a transaction.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Fetch the cart owned by `owner`, if one has been written.
    async fn find(&self, owner: &OwnerKey) -> Result<Option<Cart>, StoreError>;

    /// Insert or overwrite the cart under its current owner. Last write wins.
    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError>;

    /// Move the document stored under `from` to the cart's current owner and
    /// write its contents, in one step.
    async fn reassign(&self, from: &OwnerKey, cart: &Cart) -> Result<(), StoreError>;

    /// Remove the cart owned by `owner`. Removing a missing cart is a no-op.
    async fn delete(&self, owner: &OwnerKey) -> Result<(), StoreError>;
}

/// Catalog entry as the cart needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub image_url: String,
    /// Raw stored price per kilogram; may be missing or corrupt.
    pub base_price: Option<f64>,
    pub weight_options: Vec<String>,
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, StoreError>;
}

/// Best-effort sink for cart events. Failures are the adapter's to log.
#[async_trait]
pub trait CartEventPublisher: Send + Sync {
    async fn publish(&self, event: &CartEvent);
}

/// Publisher used when no message bus is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

#[async_trait]
impl CartEventPublisher for NoopPublisher {
    async fn publish(&self, _event: &CartEvent) {}
}
