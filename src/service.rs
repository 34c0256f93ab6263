//! Cart service
//!
//! Runs each cart operation as load, mutate in memory, save. Every check
//! happens before the store is written, so a failed call leaves the stored
//! cart as it was. Concurrent writers on the same owner are not serialised
//! here; the last save wins.

use std::sync::Arc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

use crate::domain::aggregates::{Cart, CartLine};
use crate::domain::ports::{CartEventPublisher, CartStore, ProductCatalog};
use crate::domain::value_objects::{GuestId, OwnerKey, ProductId, UserId, WeightSpecifier};
use crate::{Error, Result};

/// Result of an add-to-cart call.
#[derive(Debug)]
pub struct AddOutcome {
    pub cart: Cart,
    /// The cart did not exist before this call.
    pub created: bool,
}

#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn CartStore>,
    catalog: Arc<dyn ProductCatalog>,
    events: Arc<dyn CartEventPublisher>,
}

impl CartService {
    pub fn new(store: Arc<dyn CartStore>, catalog: Arc<dyn ProductCatalog>, events: Arc<dyn CartEventPublisher>) -> Self {
        Self { store, catalog, events }
    }

    /// The owner's cart, or `None` when nothing has been added yet.
    #[instrument(skip_all, fields(owner = %owner))]
    pub async fn get_cart(&self, owner: &OwnerKey) -> Result<Option<Cart>> {
        Ok(self.store.find(owner).await?)
    }

    #[instrument(skip_all, fields(owner = %owner, product = %product_id, weight = %weight))]
    pub async fn add_item(&self, owner: OwnerKey, product_id: ProductId, weight: WeightSpecifier, quantity: u32) -> Result<AddOutcome> {
        if quantity == 0 {
            return Err(Error::Validation("quantity must be at least 1".to_string()));
        }

        let product = self.catalog.find_product(&product_id).await?.ok_or(Error::ProductNotFound)?;
        let base_price = product.base_price
            .filter(|p| p.is_finite())
            .and_then(Decimal::from_f64)
            .ok_or(Error::InvalidProductPrice)?;
        if !product.weight_options.iter().any(|o| o == weight.as_str()) {
            return Err(Error::InvalidWeightOption(weight.to_string()));
        }

        let existing = self.store.find(&owner).await?;
        let created = existing.is_none();
        let mut cart = existing.unwrap_or_else(|| Cart::new(owner));
        cart.add_line(CartLine::new(product_id, product.name, product.image_url, base_price, weight, quantity));

        self.store.upsert(&cart).await?;
        info!(created, lines = cart.line_count(), total = %cart.total_price(), "item added to cart");
        self.publish(&mut cart).await;
        Ok(AddOutcome { cart, created })
    }

    /// Set a line's quantity; zero or below removes it.
    #[instrument(skip_all, fields(owner = %owner, product = %product_id, weight = %weight))]
    pub async fn update_item_quantity(&self, owner: &OwnerKey, product_id: &ProductId, weight: &WeightSpecifier, quantity: i64) -> Result<Cart> {
        let mut cart = self.store.find(owner).await?.ok_or(Error::CartNotFound)?;
        cart.update_quantity(product_id, weight, quantity)?;

        self.store.upsert(&cart).await?;
        info!(quantity, lines = cart.line_count(), total = %cart.total_price(), "cart quantity updated");
        self.publish(&mut cart).await;
        Ok(cart)
    }

    #[instrument(skip_all, fields(owner = %owner, product = %product_id, weight = %weight))]
    pub async fn remove_item(&self, owner: &OwnerKey, product_id: &ProductId, weight: &WeightSpecifier) -> Result<Cart> {
        let mut cart = self.store.find(owner).await?.ok_or(Error::CartNotFound)?;
        cart.remove_line(product_id, weight)?;

        self.store.upsert(&cart).await?;
        info!(lines = cart.line_count(), total = %cart.total_price(), "item removed from cart");
        self.publish(&mut cart).await;
        Ok(cart)
    }

    /// Fold the guest's cart into the user's after login.
    ///
    /// Without a user cart the guest cart is re-keyed to the user. Otherwise
    /// the merged user cart is saved first and the guest cart deleted after.
    /// Once the user cart is saved the merge has happened: a failed delete is
    /// logged and the merged cart still returned, so a client never retries
    /// into a second merge. The leftover guest cart is removed by deleting
    /// it again.
    #[instrument(skip_all, fields(guest = %guest_id, user = %user_id))]
    pub async fn merge_guest_into_user(&self, guest_id: GuestId, user_id: UserId) -> Result<Cart> {
        let guest_key = OwnerKey::from(guest_id);
        let mut guest_cart = self.store.find(&guest_key).await?.ok_or(Error::GuestCartNotFound)?;
        let user_key = OwnerKey::from(user_id.clone());

        let mut cart = match self.store.find(&user_key).await? {
            None => {
                guest_cart.reassign(user_id)?;
                self.store.reassign(&guest_key, &guest_cart).await?;
                debug!("guest cart re-keyed to user");
                guest_cart
            }
            Some(mut user_cart) => {
                user_cart.absorb(guest_cart)?;
                self.store.upsert(&user_cart).await?;
                if let Err(e) = self.store.delete(&guest_key).await {
                    warn!(guest = %guest_key, error = %e, "guest cart left behind after merge");
                }
                user_cart
            }
        };

        info!(lines = cart.line_count(), total = %cart.total_price(), "guest cart merged");
        self.publish(&mut cart).await;
        Ok(cart)
    }

    /// Drop the owner's cart entirely. Succeeds when there is none.
    #[instrument(skip_all, fields(owner = %owner))]
    pub async fn clear_cart(&self, owner: &OwnerKey) -> Result<()> {
        let Some(mut cart) = self.store.find(owner).await? else { return Ok(()) };
        self.store.delete(owner).await?;
        cart.clear();
        info!("cart cleared");
        self.publish(&mut cart).await;
        Ok(())
    }

    async fn publish(&self, cart: &mut Cart) {
        for event in cart.take_events() {
            self.events.publish(&event).await;
        }
    }
}
