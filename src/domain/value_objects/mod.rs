//! Value Objects for the cart domain

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::Error;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, Error> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() { return Err(Error::Validation(concat!($label, " must not be empty").to_string())); }
                Ok(Self(trimmed.to_string()))
            }
            pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }
    };
}

string_id!(
    /// Catalog product reference
    ProductId, "productId"
);
string_id!(
    /// Authenticated user identity, resolved upstream
    UserId, "userId"
);
string_id!(
    /// Anonymous shopper identity
    GuestId, "guestId"
);

impl GuestId {
    /// Mint a guest id for an anonymous shopper who arrived without one.
    pub fn generate() -> Self { Self(format!("guest_{}", Uuid::new_v4().simple())) }
}

/// Purchasable package size as offered by the catalog, e.g. "500g".
///
/// Line identity compares the token exactly; only pricing reads it
/// case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightSpecifier(String);

impl WeightSpecifier {
    pub fn new(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        if value.trim().is_empty() { return Err(Error::Validation("weightSpecifier must not be empty".to_string())); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for WeightSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Who a cart belongs to. A cart is owned by a user or a guest, never both.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum OwnerKey {
    User(UserId),
    Guest(GuestId),
}

impl OwnerKey {
    pub fn kind(&self) -> &'static str {
        match self { Self::User(_) => "user", Self::Guest(_) => "guest" }
    }

    pub fn id(&self) -> &str {
        match self { Self::User(id) => id.as_str(), Self::Guest(id) => id.as_str() }
    }

    /// Rebuild a key from its stored `(kind, id)` pair.
    pub fn from_parts(kind: &str, id: &str) -> Result<Self, Error> {
        match kind {
            "user" => Ok(Self::User(UserId::new(id)?)),
            "guest" => Ok(Self::Guest(GuestId::new(id)?)),
            other => Err(Error::Validation(format!("unknown owner kind: {other}"))),
        }
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}:{}", self.kind(), self.id()) }
}

impl From<UserId> for OwnerKey {
    fn from(id: UserId) -> Self { Self::User(id) }
}

impl From<GuestId> for OwnerKey {
    fn from(id: GuestId) -> Self { Self::Guest(id) }
}
