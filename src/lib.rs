//! Sweet Bites Storefront - cart service
//!
//! Backend for the sweets storefront cart.
//!
//! ## Features
//! - Weight-based line pricing ("500g", "1kg")
//! - Guest and user carts
//! - Guest-to-user cart merge on login
//! - Postgres document storage
//! - Cart events over NATS

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod service;

use thiserror::Error;

pub use domain::ports::StoreError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("Product not found")]
    ProductNotFound,

    #[error("Invalid weight option: {0}")]
    InvalidWeightOption(String),

    #[error("Product price is invalid or missing")]
    InvalidProductPrice,

    #[error("Cart not found")]
    CartNotFound,

    #[error("Product not found in cart")]
    LineNotFound,

    #[error("Guest cart not found")]
    GuestCartNotFound,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;
