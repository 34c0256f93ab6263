//! Postgres adapters over `sqlx`.
//!
//! Carts are stored one row per owner with the lines as a JSONB document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::domain::aggregates::{Cart, CartLine};
use crate::domain::ports::{CartStore, CatalogProduct, ProductCatalog, StoreError};
use crate::domain::value_objects::{OwnerKey, ProductId};

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => Self::Connection(e.to_string()),
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => Self::Serialization(e.to_string()),
            other => Self::Query(other.to_string()),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    owner_kind: String,
    owner_id: String,
    lines: Json<Vec<CartLine>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = StoreError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let owner = OwnerKey::from_parts(&row.owner_kind, &row.owner_id).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Cart::restore(row.id, owner, row.lines.0, row.created_at, row.updated_at))
    }
}

const UPSERT_CART: &str = "INSERT INTO carts (id, owner_kind, owner_id, lines, total_price, created_at, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) \
     ON CONFLICT (owner_kind, owner_id) DO UPDATE SET lines = EXCLUDED.lines, total_price = EXCLUDED.total_price, updated_at = EXCLUDED.updated_at";

#[derive(Clone, Debug)]
pub struct PgCartStore {
    db: PgPool,
}

impl PgCartStore {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn find(&self, owner: &OwnerKey) -> Result<Option<Cart>, StoreError> {
        sqlx::query_as::<_, CartRow>("SELECT id, owner_kind, owner_id, lines, created_at, updated_at FROM carts WHERE owner_kind = $1 AND owner_id = $2")
            .bind(owner.kind()).bind(owner.id())
            .fetch_optional(&self.db).await?
            .map(Cart::try_from)
            .transpose()
    }

    async fn upsert(&self, cart: &Cart) -> Result<(), StoreError> {
        sqlx::query(UPSERT_CART)
            .bind(cart.id()).bind(cart.owner().kind()).bind(cart.owner().id())
            .bind(Json(cart.lines())).bind(cart.total_price())
            .bind(cart.created_at()).bind(cart.updated_at())
            .execute(&self.db).await?;
        Ok(())
    }

    async fn reassign(&self, from: &OwnerKey, cart: &Cart) -> Result<(), StoreError> {
        let moved = sqlx::query("UPDATE carts SET owner_kind = $3, owner_id = $4, lines = $5, total_price = $6, updated_at = $7 WHERE owner_kind = $1 AND owner_id = $2")
            .bind(from.kind()).bind(from.id())
            .bind(cart.owner().kind()).bind(cart.owner().id())
            .bind(Json(cart.lines())).bind(cart.total_price()).bind(cart.updated_at())
            .execute(&self.db).await?
            .rows_affected();
        if moved == 0 {
            warn!(from = %from, to = %cart.owner(), "source cart vanished before re-key, writing fresh");
            self.upsert(cart).await?;
        }
        Ok(())
    }

    async fn delete(&self, owner: &OwnerKey) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM carts WHERE owner_kind = $1 AND owner_id = $2")
            .bind(owner.kind()).bind(owner.id())
            .execute(&self.db).await?;
        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    image_url: Option<String>,
    base_price: Option<f64>,
    weights: Vec<String>,
}

/// Read-only view of the `products` table.
#[derive(Clone, Debug)]
pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self { Self { db } }
}

#[async_trait]
impl ProductCatalog for PgCatalog {
    async fn find_product(&self, id: &ProductId) -> Result<Option<CatalogProduct>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>("SELECT id, name, images[1] AS image_url, COALESCE(base_price, price) AS base_price, weights FROM products WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(&self.db).await?;
        row.map(|r| {
            let id = ProductId::new(r.id).map_err(|e| StoreError::Serialization(e.to_string()))?;
            Ok(CatalogProduct { id, name: r.name, image_url: r.image_url.unwrap_or_default(), base_price: r.base_price, weight_options: r.weights })
        })
        .transpose()
    }
}
