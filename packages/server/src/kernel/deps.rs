//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container handed to every
//! notification handler. All external services sit behind Base* traits so
//! tests can swap in the mocks from `test_dependencies`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use klaviyo_client::{KlaviyoClient, ProfileAttributes, ProfileSubscription, SubscriptionJob};
use medusa_client::{Cart, Customer, MedusaClient, Order, OrderReturn, Product};

use crate::domains::carts::DetectorPolicy;
use crate::domains::marketing::MarketingEvent;
use crate::kernel::{BaseCommerceGateway, BaseMarketingService, BaseSnapshotStore, KeyedLocks};

/// Source tag Klaviyo shows on consent records created by this service
const SUBSCRIPTION_SOURCE: &str = "medusa-klaviyo-integration";

// =============================================================================
// MedusaClient Adapter (implements BaseCommerceGateway trait)
// =============================================================================

pub struct MedusaGateway(pub Arc<MedusaClient>);

impl MedusaGateway {
    pub fn new(client: Arc<MedusaClient>) -> Self {
        Self(client)
    }
}

#[async_trait]
impl BaseCommerceGateway for MedusaGateway {
    async fn fetch_cart(&self, cart_id: &str) -> Result<Option<Cart>> {
        Ok(self.0.retrieve_cart(cart_id).await?)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>> {
        Ok(self.0.retrieve_order(order_id).await?)
    }

    async fn fetch_return(&self, return_id: &str) -> Result<Option<OrderReturn>> {
        Ok(self.0.retrieve_return(return_id).await?)
    }

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        Ok(self.0.retrieve_customer(customer_id).await?)
    }

    async fn list_products(&self, currency_code: &str) -> Result<Vec<Product>> {
        Ok(self.0.list_products(currency_code).await?)
    }
}

// =============================================================================
// KlaviyoClient Adapter (implements BaseMarketingService trait)
// =============================================================================

pub struct KlaviyoAdapter {
    client: Arc<KlaviyoClient>,
    /// List new subscribers are added to, when configured
    list_id: Option<String>,
}

impl KlaviyoAdapter {
    pub fn new(client: Arc<KlaviyoClient>, list_id: Option<String>) -> Self {
        Self { client, list_id }
    }
}

#[async_trait]
impl BaseMarketingService for KlaviyoAdapter {
    async fn send_event(&self, event: &MarketingEvent) -> Result<()> {
        Ok(self.client.create_event(&event.to_klaviyo()).await?)
    }

    async fn upsert_profile(&self, profile: &ProfileAttributes) -> Result<String> {
        Ok(self.client.upsert_profile(profile).await?)
    }

    async fn subscribe_profile(&self, subscription: &ProfileSubscription) -> Result<()> {
        let job = SubscriptionJob {
            profiles: vec![subscription.clone()],
            custom_source: SUBSCRIPTION_SOURCE.to_string(),
            list_id: self.list_id.clone(),
        };
        Ok(self.client.bulk_subscribe(&job).await?)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Dependencies shared by every notification handler
#[derive(Clone)]
pub struct ServerDeps {
    pub commerce: Arc<dyn BaseCommerceGateway>,
    pub marketing: Arc<dyn BaseMarketingService>,
    pub snapshots: Arc<dyn BaseSnapshotStore>,
    /// Serializes cart.updated processing per cart id
    pub cart_locks: KeyedLocks,
    pub detector_policy: DetectorPolicy,
    /// Upper bound on any single call to the commerce or marketing platform
    pub call_timeout: Duration,
    /// Base URL product links in the feed point at
    pub storefront_url: String,
}

impl ServerDeps {
    pub fn new(
        commerce: Arc<dyn BaseCommerceGateway>,
        marketing: Arc<dyn BaseMarketingService>,
        snapshots: Arc<dyn BaseSnapshotStore>,
        detector_policy: DetectorPolicy,
        call_timeout: Duration,
        storefront_url: String,
    ) -> Self {
        Self {
            commerce,
            marketing,
            snapshots,
            cart_locks: KeyedLocks::new(),
            detector_policy,
            call_timeout,
            storefront_url: storefront_url.trim_end_matches('/').to_string(),
        }
    }
}
