//! Pure Medusa v2 REST API client.
//!
//! Reads the entities a marketing integration needs: carts (store API, scoped
//! by a publishable key), orders, returns and customers (admin API, secret
//! key), and the priced product catalogue.
//!
//! Lookups by id return `Ok(None)` on 404 so callers can tell a vanished
//! entity apart from a failing backend.

pub mod error;
pub mod types;

pub use error::{MedusaError, Result};
pub use types::{
    Address, CalculatedPrice, Cart, Customer, Fulfillment, FulfillmentLabel, LineItem, Order,
    OrderCustomer, OrderReturn, Product, ProductCategory, ProductImage, ProductVariant, ReturnItem,
};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use types::ProductPage;

const CART_FIELDS: &str = "*items,*shipping_address";
const ORDER_FIELDS: &str = "*items,*customer,*fulfillments,*fulfillments.labels";
const RETURN_FIELDS: &str = "*items";
const PRODUCT_FIELDS: &str = "*variants,*variants.calculated_price,*images,*categories";
const PRODUCT_PAGE_SIZE: u64 = 100;

/// Which credential a request is sent with.
#[derive(Debug, Clone, Copy)]
enum Scope {
    Admin,
    Store,
}

#[derive(Debug, Clone)]
pub struct MedusaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    publishable_key: String,
}

impl MedusaClient {
    pub fn new(base_url: impl Into<String>, api_key: String, publishable_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            publishable_key,
        }
    }

    /// Retrieve a cart with its line items and shipping address.
    pub async fn retrieve_cart(&self, cart_id: &str) -> Result<Option<Cart>> {
        self.get_one(
            Scope::Store,
            &format!("/store/carts/{}", cart_id),
            &[("fields", CART_FIELDS)],
            "cart",
        )
        .await
    }

    /// Retrieve an order with items, customer and fulfillments.
    pub async fn retrieve_order(&self, order_id: &str) -> Result<Option<Order>> {
        self.get_one(
            Scope::Admin,
            &format!("/admin/orders/{}", order_id),
            &[("fields", ORDER_FIELDS)],
            "order",
        )
        .await
    }

    pub async fn retrieve_return(&self, return_id: &str) -> Result<Option<OrderReturn>> {
        self.get_one(
            Scope::Admin,
            &format!("/admin/returns/{}", return_id),
            &[("fields", RETURN_FIELDS)],
            "return",
        )
        .await
    }

    pub async fn retrieve_customer(&self, customer_id: &str) -> Result<Option<Customer>> {
        self.get_one(
            Scope::Admin,
            &format!("/admin/customers/{}", customer_id),
            &[],
            "customer",
        )
        .await
    }

    /// List every product with variant prices calculated in `currency_code`.
    pub async fn list_products(&self, currency_code: &str) -> Result<Vec<Product>> {
        let mut products = Vec::new();
        let mut offset = 0u64;

        loop {
            let limit = PRODUCT_PAGE_SIZE.to_string();
            let offset_param = offset.to_string();
            let resp = self
                .request(Scope::Store, "/store/products")
                .query(&[
                    ("fields", PRODUCT_FIELDS),
                    ("currency_code", currency_code),
                    ("limit", limit.as_str()),
                    ("offset", offset_param.as_str()),
                ])
                .send()
                .await?;
            let page: ProductPage = parse(check_status(resp).await?).await?;

            let fetched = page.products.len() as u64;
            products.extend(page.products);
            offset += fetched;

            tracing::debug!(fetched, offset, total = page.count, "Fetched product page");
            if fetched == 0 || offset >= page.count {
                break;
            }
        }

        Ok(products)
    }

    fn request(&self, scope: Scope, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.get(url);
        match scope {
            Scope::Admin => builder.basic_auth(&self.api_key, None::<&str>),
            Scope::Store => builder.header("x-publishable-api-key", &self.publishable_key),
        }
    }

    async fn get_one<T: DeserializeOwned>(
        &self,
        scope: Scope,
        path: &str,
        query: &[(&str, &str)],
        key: &str,
    ) -> Result<Option<T>> {
        let resp = self.request(scope, path).query(query).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!(path, "Medusa entity not found");
            return Ok(None);
        }

        let body: Value = parse(check_status(resp).await?).await?;
        unwrap_envelope(body, key).map(Some)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(MedusaError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}

async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let text = resp.text().await?;
    serde_json::from_str(&text).map_err(|e| MedusaError::Parse(e.to_string()))
}

/// Medusa wraps single entities as `{ "<key>": { ... } }`.
fn unwrap_envelope<T: DeserializeOwned>(mut body: Value, key: &str) -> Result<T> {
    let inner = body
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| MedusaError::Parse(format!("response has no `{}` field", key)))?;
    serde_json::from_value(inner).map_err(|e| MedusaError::Parse(e.to_string()))
}
