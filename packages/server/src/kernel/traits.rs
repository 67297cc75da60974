// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Deciding which events a cart change implies, or which metric an order
// notification maps to, lives in the domains and calls through these.
//
// Naming convention: Base* for trait names (e.g., BaseCommerceGateway)

use anyhow::Result;
use async_trait::async_trait;
use klaviyo_client::{ProfileAttributes, ProfileSubscription};
use medusa_client::{Cart, Customer, Order, OrderReturn, Product};

use crate::domains::carts::CartSnapshot;
use crate::domains::marketing::MarketingEvent;

// =============================================================================
// Commerce Host (read side)
// =============================================================================

/// Read access to the commerce platform.
///
/// Lookups return `Ok(None)` when the entity no longer exists; `Err` is
/// reserved for the platform being unreachable or answering garbage.
#[async_trait]
pub trait BaseCommerceGateway: Send + Sync {
    async fn fetch_cart(&self, cart_id: &str) -> Result<Option<Cart>>;

    async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>>;

    async fn fetch_return(&self, return_id: &str) -> Result<Option<OrderReturn>>;

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>>;

    /// Every published product, priced in `currency_code`
    async fn list_products(&self, currency_code: &str) -> Result<Vec<Product>>;
}

// =============================================================================
// Marketing Platform (write side)
// =============================================================================

#[async_trait]
pub trait BaseMarketingService: Send + Sync {
    /// Record one event against the profile identified by the event's email
    async fn send_event(&self, event: &MarketingEvent) -> Result<()>;

    /// Create or update a profile, returning the platform's profile id
    async fn upsert_profile(&self, profile: &ProfileAttributes) -> Result<String>;

    /// Grant channel consent for an existing profile
    async fn subscribe_profile(&self, subscription: &ProfileSubscription) -> Result<()>;
}

// =============================================================================
// Snapshot Store
// =============================================================================

/// Last-known state per cart id.
///
/// `put` overwrites whatever was stored. Entries are never deleted.
#[async_trait]
pub trait BaseSnapshotStore: Send + Sync {
    async fn get(&self, cart_id: &str) -> Result<Option<CartSnapshot>>;

    async fn put(&self, cart_id: &str, snapshot: &CartSnapshot) -> Result<()>;

    /// Short name for logs ("memory", "postgres")
    fn backend(&self) -> &'static str;
}
