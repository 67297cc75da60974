//! Cart snapshot persistence.
//!
//! `MemorySnapshotStore` keeps snapshots for the process lifetime (restart
//! means every cart looks new again). `PostgresSnapshotStore` survives
//! restarts and is shared by every instance pointed at the same database.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::domains::carts::{CartSnapshot, ItemState};
use crate::kernel::BaseSnapshotStore;

// =============================================================================
// In-memory
// =============================================================================

#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    snapshots: Arc<RwLock<HashMap<String, CartSnapshot>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }
}

#[async_trait]
impl BaseSnapshotStore for MemorySnapshotStore {
    async fn get(&self, cart_id: &str) -> Result<Option<CartSnapshot>> {
        Ok(self.snapshots.read().await.get(cart_id).cloned())
    }

    async fn put(&self, cart_id: &str, snapshot: &CartSnapshot) -> Result<()> {
        self.snapshots
            .write()
            .await
            .insert(cart_id.to_string(), snapshot.clone());
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// Postgres
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SnapshotRow {
    has_shipping_address: bool,
    has_email: bool,
    items: Json<Vec<ItemState>>,
}

impl From<SnapshotRow> for CartSnapshot {
    fn from(row: SnapshotRow) -> Self {
        let items = row.items.0;
        Self {
            item_count: items.len(),
            has_shipping_address: row.has_shipping_address,
            has_email: row.has_email,
            items,
        }
    }
}

#[derive(Clone)]
pub struct PostgresSnapshotStore {
    pool: PgPool,
}

impl PostgresSnapshotStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseSnapshotStore for PostgresSnapshotStore {
    async fn get(&self, cart_id: &str) -> Result<Option<CartSnapshot>> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            "SELECT has_shipping_address, has_email, items
             FROM cart_snapshots
             WHERE cart_id = $1",
        )
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("Failed to load snapshot for cart {}", cart_id))?;

        Ok(row.map(CartSnapshot::from))
    }

    async fn put(&self, cart_id: &str, snapshot: &CartSnapshot) -> Result<()> {
        sqlx::query(
            "INSERT INTO cart_snapshots (cart_id, item_count, has_shipping_address, has_email, items, updated_at)
             VALUES ($1, $2, $3, $4, $5, NOW())
             ON CONFLICT (cart_id) DO UPDATE SET
                item_count = EXCLUDED.item_count,
                has_shipping_address = EXCLUDED.has_shipping_address,
                has_email = EXCLUDED.has_email,
                items = EXCLUDED.items,
                updated_at = NOW()",
        )
        .bind(cart_id)
        .bind(snapshot.items.len() as i32)
        .bind(snapshot.has_shipping_address)
        .bind(snapshot.has_email)
        .bind(Json(&snapshot.items))
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to store snapshot for cart {}", cart_id))?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(quantity: u32) -> CartSnapshot {
        CartSnapshot {
            item_count: 1,
            has_shipping_address: false,
            has_email: true,
            items: vec![ItemState {
                id: "i1".into(),
                quantity,
                variant_id: Some("v1".into()),
            }],
        }
    }

    #[tokio::test]
    async fn memory_store_returns_none_for_unseen_cart() {
        let store = MemorySnapshotStore::new();

        assert!(store.get("cart_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_store_put_overwrites() {
        let store = MemorySnapshotStore::new();

        store.put("cart_1", &snapshot(1)).await.unwrap();
        store.put("cart_1", &snapshot(3)).await.unwrap();

        assert_eq!(store.get("cart_1").await.unwrap(), Some(snapshot(3)));
        assert_eq!(store.len().await, 1);
    }
}
