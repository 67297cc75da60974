use std::fmt;

use chrono::{DateTime, Utc};
use klaviyo_client::NewEvent;
use serde_json::{Map, Value};
use uuid::Uuid;

pub type Properties = Map<String, Value>;

/// Metric names recorded in Klaviyo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AddedToCart,
    StartedCheckout,
    PlacedOrder,
    OrderShipped,
    OrderCanceled,
    OrderDelivered,
    ReturnRequested,
    ReturnReceived,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddedToCart => "Added to Cart",
            Self::StartedCheckout => "Started Checkout",
            Self::PlacedOrder => "Placed Order",
            Self::OrderShipped => "Order Shipped",
            Self::OrderCanceled => "Order Canceled",
            Self::OrderDelivered => "Order Delivered",
            Self::ReturnRequested => "Return Requested",
            Self::ReturnReceived => "Return Received",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One event bound for the marketing API.
///
/// Each instance gets a fresh idempotency key at construction, so two events
/// never share one even when built from the same inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketingEvent {
    pub metric: Metric,
    pub profile_email: String,
    pub properties: Properties,
    pub idempotency_key: String,
    /// Monetary value Klaviyo attributes revenue to
    pub value: Option<f64>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl MarketingEvent {
    pub fn new(metric: Metric, profile_email: impl Into<String>, properties: Properties) -> Self {
        Self {
            metric,
            profile_email: profile_email.into(),
            properties,
            idempotency_key: Uuid::new_v4().to_string(),
            value: None,
            occurred_at: None,
        }
    }

    pub fn with_value(mut self, value: Option<f64>) -> Self {
        self.value = value;
        self
    }

    pub fn with_time(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(at);
        self
    }

    /// Wire form for the Klaviyo client.
    pub fn to_klaviyo(&self) -> NewEvent {
        NewEvent {
            metric: self.metric.name().to_string(),
            email: self.profile_email.clone(),
            properties: self.properties.clone(),
            unique_id: self.idempotency_key.clone(),
            value: self.value,
            time: self.occurred_at,
        }
    }
}
