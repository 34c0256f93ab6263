//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::events::CartEvent;
use crate::domain::pricing::price_for_weight;
use crate::domain::value_objects::{OwnerKey, ProductId, UserId, WeightSpecifier};
use crate::{Error, Result};

/// One `(product, weight)` entry in a cart.
///
/// `name` and `image_url` are a snapshot of the catalog at add time and are
/// never re-synced, so the cart keeps showing what the shopper picked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: String,
    pub unit_base_price: Decimal,
    pub weight_specifier: WeightSpecifier,
    pub computed_line_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product_id: ProductId, name: impl Into<String>, image_url: impl Into<String>, unit_base_price: Decimal, weight_specifier: WeightSpecifier, quantity: u32) -> Self {
        let computed_line_price = price_for_weight(unit_base_price, weight_specifier.as_str());
        Self { product_id, name: name.into(), image_url: image_url.into(), unit_base_price, weight_specifier, computed_line_price, quantity }
    }

    pub fn line_total(&self) -> Decimal { self.computed_line_price.saturating_mul(Decimal::from(self.quantity)) }

    fn is(&self, product_id: &ProductId, weight: &WeightSpecifier) -> bool {
        &self.product_id == product_id && &self.weight_specifier == weight
    }
}

#[derive(Clone, Debug)]
pub struct Cart {
    id: Uuid,
    owner: OwnerKey,
    lines: Vec<CartLine>,
    total_price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<CartEvent>,
}

impl Cart {
    pub fn new(owner: OwnerKey) -> Self {
        let now = Utc::now();
        Self { id: Uuid::now_v7(), owner, lines: vec![], total_price: Decimal::ZERO, created_at: now, updated_at: now, events: vec![] }
    }

    /// Rebuild a persisted cart. The total is derived from the lines.
    pub fn restore(id: Uuid, owner: OwnerKey, lines: Vec<CartLine>, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        let mut cart = Self { id, owner, lines, total_price: Decimal::ZERO, created_at, updated_at, events: vec![] };
        cart.total_price = cart.sum_lines();
        cart
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn owner(&self) -> &OwnerKey { &self.owner }
    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn total_price(&self) -> Decimal { self.total_price }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }
    pub fn line_count(&self) -> usize { self.lines.len() }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn line(&self, product_id: &ProductId, weight: &WeightSpecifier) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.is(product_id, weight))
    }

    /// Add a line, or accumulate its quantity onto the existing line for the
    /// same product and weight.
    pub fn add_line(&mut self, line: CartLine) {
        let event = CartEvent::ItemAdded {
            owner: self.owner.clone(), product_id: line.product_id.clone(),
            weight: line.weight_specifier.clone(), quantity: line.quantity,
        };
        if let Some(existing) = self.lines.iter_mut().find(|l| l.is(&line.product_id, &line.weight_specifier)) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.lines.push(line);
        }
        self.recalculate();
        self.raise_event(event);
    }

    /// Set a line's quantity. Zero or negative removes the line.
    pub fn update_quantity(&mut self, product_id: &ProductId, weight: &WeightSpecifier, quantity: i64) -> Result<()> {
        let index = self.position(product_id, weight)?;
        if quantity <= 0 {
            return self.remove_at(index);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.get_mut(index) { line.quantity = quantity; }
        self.recalculate();
        self.raise_event(CartEvent::QuantityUpdated { owner: self.owner.clone(), product_id: product_id.clone(), weight: weight.clone(), quantity });
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: &ProductId, weight: &WeightSpecifier) -> Result<()> {
        let index = self.position(product_id, weight)?;
        self.remove_at(index)
    }

    /// Fold a guest cart's lines into this user cart.
    ///
    /// Matching lines keep this cart's price and gain the guest quantity;
    /// the rest are appended as they are.
    pub fn absorb(&mut self, guest: Cart) -> Result<()> {
        let (OwnerKey::User(user_id), OwnerKey::Guest(guest_id)) = (&self.owner, &guest.owner) else {
            return Err(Error::Validation("only a guest cart can be merged into a user cart".to_string()));
        };
        let event = CartEvent::GuestCartMerged { guest_id: guest_id.clone(), user_id: user_id.clone(), lines_merged: guest.lines.len() };

        for incoming in guest.lines {
            match self.lines.iter_mut().find(|l| l.is(&incoming.product_id, &incoming.weight_specifier)) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(incoming.quantity),
                None => self.lines.push(incoming),
            }
        }
        self.recalculate();
        self.raise_event(event);
        Ok(())
    }

    /// Hand a guest cart over to `user` as-is.
    pub fn reassign(&mut self, user: UserId) -> Result<()> {
        let OwnerKey::Guest(guest_id) = &self.owner else {
            return Err(Error::Validation("only a guest cart can be reassigned".to_string()));
        };
        let event = CartEvent::GuestCartMerged { guest_id: guest_id.clone(), user_id: user.clone(), lines_merged: self.lines.len() };
        self.owner = OwnerKey::User(user);
        self.touch();
        self.raise_event(event);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.recalculate();
        self.raise_event(CartEvent::CartCleared { owner: self.owner.clone() });
    }

    pub fn take_events(&mut self) -> Vec<CartEvent> { std::mem::take(&mut self.events) }

    fn position(&self, product_id: &ProductId, weight: &WeightSpecifier) -> Result<usize> {
        self.lines.iter().position(|l| l.is(product_id, weight)).ok_or(Error::LineNotFound)
    }

    fn remove_at(&mut self, index: usize) -> Result<()> {
        if index >= self.lines.len() { return Err(Error::LineNotFound); }
        let removed = self.lines.remove(index);
        self.recalculate();
        self.raise_event(CartEvent::ItemRemoved { owner: self.owner.clone(), product_id: removed.product_id, weight: removed.weight_specifier });
        Ok(())
    }

    fn sum_lines(&self) -> Decimal {
        self.lines.iter().fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.line_total()))
    }

    fn recalculate(&mut self) {
        self.total_price = self.sum_lines();
        self.touch();
    }

    fn raise_event(&mut self, e: CartEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::GuestId;

    fn guest(id: &str) -> OwnerKey { OwnerKey::Guest(GuestId::new(id).unwrap()) }
    fn user(id: &str) -> OwnerKey { OwnerKey::User(UserId::new(id).unwrap()) }
    fn pid(id: &str) -> ProductId { ProductId::new(id).unwrap() }
    fn w(token: &str) -> WeightSpecifier { WeightSpecifier::new(token).unwrap() }
    fn line(product: &str, weight: &str, base: i64, qty: u32) -> CartLine {
        CartLine::new(pid(product), format!("Sweet {product}"), "", Decimal::from(base), w(weight), qty)
    }

    fn assert_invariants(cart: &Cart) {
        let expected = cart.lines().iter().fold(Decimal::ZERO, |acc, l| acc + l.computed_line_price * Decimal::from(l.quantity));
        assert_eq!(cart.total_price(), expected);
        for (i, a) in cart.lines().iter().enumerate() {
            assert!(a.quantity >= 1);
            for b in cart.lines().iter().skip(i + 1) {
                assert!(!(a.product_id == b.product_id && a.weight_specifier == b.weight_specifier));
            }
        }
    }

    #[test]
    fn new_line_is_priced_by_weight() {
        let mut cart = Cart::new(guest("guest_1"));
        cart.add_line(line("P1", "500g", 400, 2));
        assert_eq!(cart.lines()[0].computed_line_price, Decimal::from(200));
        assert_eq!(cart.total_price(), Decimal::from(400));
        assert_invariants(&cart);
    }

    #[test]
    fn same_product_and_weight_accumulates() {
        let mut cart = Cart::new(guest("guest_1"));
        cart.add_line(line("P1", "500g", 400, 2));
        cart.add_line(line("P1", "500g", 400, 1));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.total_price(), Decimal::from(600));
    }

    #[test]
    fn different_weight_is_a_separate_line() {
        let mut cart = Cart::new(guest("guest_1"));
        cart.add_line(line("P1", "500g", 400, 1));
        cart.add_line(line("P1", "1kg", 400, 1));
        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.total_price(), Decimal::from(600));
        assert_invariants(&cart);
    }

    #[test]
    fn update_sets_absolute_quantity() {
        let mut cart = Cart::new(guest("guest_1"));
        cart.add_line(line("P1", "500g", 400, 2));
        cart.update_quantity(&pid("P1"), &w("500g"), 5).unwrap();
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.total_price(), Decimal::from(1000));
    }

    #[test]
    fn non_positive_update_removes_line() {
        for quantity in [0, -3] {
            let mut cart = Cart::new(guest("guest_1"));
            cart.add_line(line("P1", "500g", 400, 3));
            cart.add_line(line("P2", "1kg", 300, 1));
            cart.update_quantity(&pid("P1"), &w("500g"), quantity).unwrap();
            assert_eq!(cart.line_count(), 1);
            assert_eq!(cart.total_price(), Decimal::from(300));
            assert_invariants(&cart);
        }
    }

    #[test]
    fn missing_line_leaves_cart_untouched() {
        let mut cart = Cart::new(guest("guest_1"));
        cart.add_line(line("P1", "500g", 400, 2));
        let before = cart.lines().to_vec();
        assert!(matches!(cart.update_quantity(&pid("P1"), &w("1kg"), 4), Err(Error::LineNotFound)));
        assert!(matches!(cart.remove_line(&pid("P9"), &w("500g")), Err(Error::LineNotFound)));
        assert_eq!(cart.lines(), before.as_slice());
        assert_invariants(&cart);
    }

    #[test]
    fn remove_then_add_reproduces_line() {
        let mut cart = Cart::new(guest("guest_1"));
        cart.add_line(line("P1", "500g", 400, 2));
        let original = cart.lines()[0].clone();
        cart.remove_line(&pid("P1"), &w("500g")).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), Decimal::ZERO);
        cart.add_line(line("P1", "500g", 400, 2));
        assert_eq!(cart.lines()[0], original);
    }

    #[test]
    fn absorb_accumulates_matches_and_appends_the_rest() {
        let mut user_cart = Cart::new(user("u1"));
        user_cart.add_line(line("P2", "1kg", 300, 2));
        let mut guest_cart = Cart::new(guest("guest_1"));
        guest_cart.add_line(line("P2", "1kg", 300, 1));
        guest_cart.add_line(line("P3", "250g", 800, 1));

        user_cart.absorb(guest_cart).unwrap();
        assert_eq!(user_cart.line_count(), 2);
        assert_eq!(user_cart.line(&pid("P2"), &w("1kg")).unwrap().quantity, 3);
        assert_eq!(user_cart.line(&pid("P3"), &w("250g")).unwrap().computed_line_price, Decimal::from(200));
        assert_eq!(user_cart.total_price(), Decimal::from(1100));
        assert_invariants(&user_cart);
    }

    #[test]
    fn absorb_keeps_the_user_line_price() {
        let mut user_cart = Cart::new(user("u1"));
        user_cart.add_line(line("P2", "1kg", 300, 1));
        let mut guest_cart = Cart::new(guest("guest_1"));
        guest_cart.add_line(line("P2", "1kg", 250, 1));

        user_cart.absorb(guest_cart).unwrap();
        assert_eq!(user_cart.lines()[0].computed_line_price, Decimal::from(300));
        assert_eq!(user_cart.total_price(), Decimal::from(600));
    }

    #[test]
    fn absorb_requires_guest_into_user() {
        let mut a = Cart::new(user("u1"));
        let b = Cart::new(user("u2"));
        assert!(matches!(a.absorb(b), Err(Error::Validation(_))));
    }

    #[test]
    fn reassign_moves_guest_cart_to_user() {
        let mut cart = Cart::new(guest("guest_1"));
        cart.add_line(line("P1", "500g", 400, 1));
        cart.reassign(UserId::new("u1").unwrap()).unwrap();
        assert_eq!(cart.owner(), &user("u1"));
        assert!(cart.reassign(UserId::new("u2").unwrap()).is_err());
    }

    #[test]
    fn mutations_raise_events() {
        let mut cart = Cart::new(guest("guest_1"));
        cart.add_line(line("P1", "500g", 400, 1));
        cart.update_quantity(&pid("P1"), &w("500g"), 0).unwrap();
        let events = cart.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name(), "item_added");
        assert_eq!(events[1].name(), "item_removed");
        assert!(cart.take_events().is_empty());
    }

    #[test]
    fn restore_derives_total_from_lines() {
        let lines = vec![line("P1", "500g", 400, 2), line("P2", "1kg", 300, 1)];
        let cart = Cart::restore(Uuid::now_v7(), guest("guest_1"), lines, Utc::now(), Utc::now());
        assert_eq!(cart.total_price(), Decimal::from(700));
    }
}
