// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use klaviyo_client::{ProfileAttributes, ProfileSubscription};
use medusa_client::{Cart, Customer, Order, OrderReturn, Product};

use super::{
    BaseCommerceGateway, BaseMarketingService, BaseSnapshotStore, MemorySnapshotStore, ServerDeps,
};
use crate::domains::carts::{CartSnapshot, DetectorPolicy};
use crate::domains::marketing::{MarketingEvent, Metric};

// =============================================================================
// Mock Commerce Gateway
// =============================================================================

/// In-memory commerce host. Entities not registered resolve to `None`.
#[derive(Default)]
pub struct MockCommerceGateway {
    carts: Mutex<HashMap<String, Cart>>,
    orders: Mutex<HashMap<String, Order>>,
    returns: Mutex<HashMap<String, OrderReturn>>,
    customers: Mutex<HashMap<String, Customer>>,
    products: Mutex<Vec<Product>>,
    failing: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockCommerceGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cart(self, cart: Cart) -> Self {
        self.set_cart(cart);
        self
    }

    /// Replace a cart in place, for driving a sequence of cart.updated
    /// notifications through the same gateway
    pub fn set_cart(&self, cart: Cart) {
        self.carts.lock().unwrap().insert(cart.id.clone(), cart);
    }

    pub fn with_order(self, order: Order) -> Self {
        self.orders.lock().unwrap().insert(order.id.clone(), order);
        self
    }

    pub fn with_return(self, order_return: OrderReturn) -> Self {
        self.returns
            .lock()
            .unwrap()
            .insert(order_return.id.clone(), order_return);
        self
    }

    pub fn with_customer(self, customer: Customer) -> Self {
        self.customers
            .lock()
            .unwrap()
            .insert(customer.id.clone(), customer);
        self
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        *self.products.lock().unwrap() = products;
        self
    }

    /// Every lookup fails as if the host were down
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Lookups made so far, as "kind:id"
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &str, id: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("{}:{}", kind, id));
        if self.failing.load(Ordering::SeqCst) {
            bail!("commerce host unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl BaseCommerceGateway for MockCommerceGateway {
    async fn fetch_cart(&self, cart_id: &str) -> Result<Option<Cart>> {
        self.record("cart", cart_id)?;
        Ok(self.carts.lock().unwrap().get(cart_id).cloned())
    }

    async fn fetch_order(&self, order_id: &str) -> Result<Option<Order>> {
        self.record("order", order_id)?;
        Ok(self.orders.lock().unwrap().get(order_id).cloned())
    }

    async fn fetch_return(&self, return_id: &str) -> Result<Option<OrderReturn>> {
        self.record("return", return_id)?;
        Ok(self.returns.lock().unwrap().get(return_id).cloned())
    }

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        self.record("customer", customer_id)?;
        Ok(self.customers.lock().unwrap().get(customer_id).cloned())
    }

    async fn list_products(&self, currency_code: &str) -> Result<Vec<Product>> {
        self.record("products", currency_code)?;
        Ok(self.products.lock().unwrap().clone())
    }
}

// =============================================================================
// Mock Marketing Service
// =============================================================================

#[derive(Default)]
pub struct MockMarketingService {
    events: Mutex<Vec<MarketingEvent>>,
    send_attempts: AtomicUsize,
    failing_metrics: Mutex<Vec<Metric>>,
    send_delay: Option<Duration>,
    profiles: Mutex<Vec<ProfileAttributes>>,
    subscriptions: Mutex<Vec<ProfileSubscription>>,
    fail_profiles: bool,
    fail_subscriptions: bool,
}

impl MockMarketingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every event with this metric
    pub fn failing_metric(self, metric: Metric) -> Self {
        self.failing_metrics.lock().unwrap().push(metric);
        self
    }

    /// Sleep this long inside every send before recording it
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    pub fn failing_profiles(mut self) -> Self {
        self.fail_profiles = true;
        self
    }

    pub fn failing_subscriptions(mut self) -> Self {
        self.fail_subscriptions = true;
        self
    }

    /// Events accepted so far, in send order
    pub fn events(&self) -> Vec<MarketingEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn sent_metrics(&self) -> Vec<Metric> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.metric)
            .collect()
    }

    /// Sends attempted, accepted or not
    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }

    pub fn profiles(&self) -> Vec<ProfileAttributes> {
        self.profiles.lock().unwrap().clone()
    }

    pub fn subscriptions(&self) -> Vec<ProfileSubscription> {
        self.subscriptions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseMarketingService for MockMarketingService {
    async fn send_event(&self, event: &MarketingEvent) -> Result<()> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_metrics.lock().unwrap().contains(&event.metric) {
            bail!("marketing API rejected {}", event.metric);
        }

        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn upsert_profile(&self, profile: &ProfileAttributes) -> Result<String> {
        if self.fail_profiles {
            bail!("profile import rejected");
        }

        let mut profiles = self.profiles.lock().unwrap();
        profiles.push(profile.clone());
        Ok(format!("profile_{}", profiles.len()))
    }

    async fn subscribe_profile(&self, subscription: &ProfileSubscription) -> Result<()> {
        if self.fail_subscriptions {
            bail!("subscription job rejected");
        }

        self.subscriptions
            .lock()
            .unwrap()
            .push(subscription.clone());
        Ok(())
    }
}

// =============================================================================
// Mock Snapshot Store
// =============================================================================

/// Memory-backed store whose reads or writes can be made to fail
#[derive(Default)]
pub struct MockSnapshotStore {
    inner: MemorySnapshotStore,
    fail_get: bool,
    fail_put: bool,
}

impl MockSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_get(mut self) -> Self {
        self.fail_get = true;
        self
    }

    pub fn failing_put(mut self) -> Self {
        self.fail_put = true;
        self
    }
}

#[async_trait]
impl BaseSnapshotStore for MockSnapshotStore {
    async fn get(&self, cart_id: &str) -> Result<Option<CartSnapshot>> {
        if self.fail_get {
            bail!("snapshot store unavailable");
        }
        self.inner.get(cart_id).await
    }

    async fn put(&self, cart_id: &str, snapshot: &CartSnapshot) -> Result<()> {
        if self.fail_put {
            bail!("snapshot store unavailable");
        }
        self.inner.put(cart_id, snapshot).await
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

pub struct TestDependencies {
    pub commerce: Arc<MockCommerceGateway>,
    pub marketing: Arc<MockMarketingService>,
    pub snapshots: Arc<MockSnapshotStore>,
    pub detector_policy: DetectorPolicy,
    pub call_timeout: Duration,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            commerce: Arc::new(MockCommerceGateway::new()),
            marketing: Arc::new(MockMarketingService::new()),
            snapshots: Arc::new(MockSnapshotStore::new()),
            detector_policy: DetectorPolicy::default(),
            call_timeout: Duration::from_secs(5),
        }
    }

    /// Set a mock commerce gateway
    pub fn mock_commerce(mut self, commerce: MockCommerceGateway) -> Self {
        self.commerce = Arc::new(commerce);
        self
    }

    /// Set a mock marketing service
    pub fn mock_marketing(mut self, marketing: MockMarketingService) -> Self {
        self.marketing = Arc::new(marketing);
        self
    }

    /// Set a mock snapshot store
    pub fn mock_snapshots(mut self, snapshots: MockSnapshotStore) -> Self {
        self.snapshots = Arc::new(snapshots);
        self
    }

    pub fn detector_policy(mut self, policy: DetectorPolicy) -> Self {
        self.detector_policy = policy;
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Build the ServerDeps handlers run against. The mocks stay reachable
    /// through `self` for assertions.
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.commerce.clone(),
            self.marketing.clone(),
            self.snapshots.clone(),
            self.detector_policy,
            self.call_timeout,
            "https://shop.example.com".to_string(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Builders for host entities with plausible defaults.
pub mod fixtures {
    use chrono::{TimeZone, Utc};
    use medusa_client::{
        Address, CalculatedPrice, Cart, Customer, Fulfillment, FulfillmentLabel, LineItem, Order,
        OrderCustomer, OrderReturn, Product, ProductVariant, ReturnItem,
    };
    use serde_json::Value;

    pub fn line_item(id: &str, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            title: format!("Product {}", id),
            quantity,
            variant_id: Some(format!("variant_{}", id)),
            product_id: Some(format!("prod_{}", id)),
            unit_price: 25.0,
            thumbnail: Some(format!("https://cdn.example.com/{}.png", id)),
        }
    }

    pub fn cart(id: &str, email: Option<&str>, items: Vec<LineItem>) -> Cart {
        let total = items
            .iter()
            .map(|item| item.unit_price * item.quantity as f64)
            .sum();
        Cart {
            id: id.to_string(),
            email: email.map(str::to_string),
            currency_code: "usd".to_string(),
            total: Some(total),
            shipping_address: None,
            items,
        }
    }

    pub fn with_shipping_address(mut cart: Cart) -> Cart {
        cart.shipping_address = Some(Address {
            address_1: Some("1 Main St".to_string()),
            city: Some("Minneapolis".to_string()),
            country_code: Some("us".to_string()),
            postal_code: Some("55401".to_string()),
        });
        cart
    }

    pub fn order(id: &str, email: Option<&str>) -> Order {
        Order {
            id: id.to_string(),
            display_id: Some(1001),
            email: email.map(str::to_string),
            currency_code: "usd".to_string(),
            total: Some(50.0),
            original_total: Some(50.0),
            canceled_at: None,
            items: vec![line_item("oi1", 2)],
            customer: None,
            fulfillments: vec![],
        }
    }

    pub fn with_customer_email(mut order: Order, email: &str) -> Order {
        order.customer = Some(OrderCustomer {
            id: Some("cus_1".to_string()),
            email: Some(email.to_string()),
        });
        order
    }

    pub fn fulfillment(id: &str, tracking: Option<(&str, &str)>) -> Fulfillment {
        Fulfillment {
            id: id.to_string(),
            provider_id: Some("manual".to_string()),
            shipped_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            labels: tracking
                .map(|(number, url)| {
                    vec![FulfillmentLabel {
                        tracking_number: Some(number.to_string()),
                        tracking_url: Some(url.to_string()),
                    }]
                })
                .unwrap_or_default(),
        }
    }

    pub fn order_return(id: &str, order_id: &str) -> OrderReturn {
        OrderReturn {
            id: id.to_string(),
            order_id: Some(order_id.to_string()),
            status: Some("requested".to_string()),
            refund_amount: Some(25.0),
            items: vec![ReturnItem {
                id: format!("{}_item", id),
                item_id: "oi1".to_string(),
                quantity: 1,
                reason_id: Some("damaged".to_string()),
                note: None,
            }],
        }
    }

    pub fn customer(id: &str, email: Option<&str>, klaviyo: Option<Value>) -> Customer {
        let metadata = klaviyo.map(|value| {
            let mut metadata = serde_json::Map::new();
            metadata.insert("klaviyo".to_string(), value);
            metadata
        });
        Customer {
            id: id.to_string(),
            email: email.map(str::to_string),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            phone: None,
            created_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()),
            metadata,
        }
    }

    pub fn product(id: &str, handle: &str, prices: &[f64]) -> Product {
        Product {
            id: id.to_string(),
            title: format!("Product {}", id),
            description: Some("A product".to_string()),
            handle: handle.to_string(),
            thumbnail: Some(format!("https://cdn.example.com/{}.png", handle)),
            images: vec![],
            variants: prices
                .iter()
                .enumerate()
                .map(|(i, amount)| ProductVariant {
                    id: format!("{}_v{}", id, i),
                    calculated_price: Some(CalculatedPrice {
                        calculated_amount: Some(*amount),
                    }),
                })
                .collect(),
            categories: vec![],
        }
    }
}
