//! In-process adapters backing the unit and HTTP tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::aggregates::Cart;
use crate::domain::events::CartEvent;
use crate::domain::ports::{CartEventPublisher, CartStore, CatalogProduct, ProductCatalog, StoreError};
use crate::domain::value_objects::{OwnerKey, ProductId};

/// Carts held as detached copies, so a loaded cart never aliases the stored one.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<OwnerKey, Cart>>,
}

fn detached(cart: &Cart) -> Cart {
    Cart::restore(cart.id(), cart.owner().clone(), cart.lines().to_vec(), cart.created_at(), cart.updated_at())
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn find(&self, owner: &OwnerKey) -> Result<Option<Cart>, StoreError> {
        Ok(self.carts.read().await.get(owner).map(detached))
    }

    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError> {
        self.carts.write().await.insert(cart.owner().clone(), detached(cart));
        Ok(())
    }

    async fn reassign(&self, from: &OwnerKey, cart: &Cart) -> Result<(), StoreError> {
        let mut carts = self.carts.write().await;
        carts.remove(from);
        carts.insert(cart.owner().clone(), detached(cart));
        Ok(())
    }

    async fn delete(&self, owner: &OwnerKey) -> Result<(), StoreError> {
        self.carts.write().await.remove(owner);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: HashMap<ProductId, CatalogProduct>,
}

impl InMemoryCatalog {
    pub fn insert(&mut self, product: CatalogProduct) {
        self.products.insert(product.id.clone(), product);
    }
}

impl FromIterator<CatalogProduct> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogProduct>>(iter: I) -> Self {
        let mut catalog = Self::default();
        iter.into_iter().for_each(|p| catalog.insert(p));
        catalog
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn find_product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, StoreError> {
        Ok(self.products.get(id).cloned())
    }
}

/// Keeps every published event for inspection.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<CartEvent>>,
}

impl RecordingPublisher {
    pub fn recorded(&self) -> Vec<CartEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CartEventPublisher for RecordingPublisher {
    async fn publish(&self, event: &CartEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CartLine;
    use crate::domain::value_objects::{GuestId, UserId, WeightSpecifier};
    use rust_decimal::Decimal;

    fn guest_cart() -> Cart {
        let mut cart = Cart::new(OwnerKey::Guest(GuestId::new("guest_1").unwrap()));
        cart.add_line(CartLine::new(ProductId::new("P1").unwrap(), "Ladoo", "", Decimal::from(400), WeightSpecifier::new("500g").unwrap(), 1));
        cart
    }

    #[tokio::test]
    async fn loaded_cart_does_not_alias_stored_cart() {
        let store = InMemoryCartStore::default();
        let cart = guest_cart();
        store.upsert(&cart).await.unwrap();

        let mut loaded = store.find(cart.owner()).await.unwrap().unwrap();
        loaded.clear();
        assert_eq!(store.find(cart.owner()).await.unwrap().unwrap().line_count(), 1);
    }

    #[tokio::test]
    async fn reassign_moves_the_document() {
        let store = InMemoryCartStore::default();
        let mut cart = guest_cart();
        let from = cart.owner().clone();
        store.upsert(&cart).await.unwrap();

        cart.reassign(UserId::new("u1").unwrap()).unwrap();
        store.reassign(&from, &cart).await.unwrap();
        assert!(store.find(&from).await.unwrap().is_none());
        assert_eq!(store.find(cart.owner()).await.unwrap().unwrap().id(), cart.id());
    }

    #[tokio::test]
    async fn delete_of_missing_cart_is_ok() {
        let store = InMemoryCartStore::default();
        assert!(store.delete(&OwnerKey::User(UserId::new("nobody").unwrap())).await.is_ok());
    }
}
