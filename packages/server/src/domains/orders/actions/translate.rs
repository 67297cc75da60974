//! Pure order → event mapping. `now` is passed in so results are
//! deterministic under test.

use chrono::{DateTime, Utc};
use medusa_client::{Fulfillment, Order, OrderReturn};
use serde_json::{json, Value};

use crate::domains::marketing::{line_item_summary, MarketingEvent, Metric, Properties};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnStage {
    Requested,
    Received,
}

impl ReturnStage {
    fn metric(self) -> Metric {
        match self {
            Self::Requested => Metric::ReturnRequested,
            Self::Received => Metric::ReturnReceived,
        }
    }
}

/// Order email, falling back to the customer's.
pub fn order_email(order: &Order) -> Option<&str> {
    non_blank(order.email.as_deref()).or_else(|| {
        non_blank(
            order
                .customer
                .as_ref()
                .and_then(|customer| customer.email.as_deref()),
        )
    })
}

fn non_blank(email: Option<&str>) -> Option<&str> {
    email.map(str::trim).filter(|e| !e.is_empty())
}

pub fn placed_order(order: &Order, email: &str) -> MarketingEvent {
    let mut properties = order_properties(order);
    properties.insert("total".into(), json!(order.total));
    properties.insert("currency".into(), json!(order.currency_code));

    MarketingEvent::new(Metric::PlacedOrder, email, properties).with_value(order.total)
}

pub fn order_shipped(
    order: &Order,
    fulfillment: &Fulfillment,
    email: &str,
    now: DateTime<Utc>,
) -> MarketingEvent {
    let mut properties = order_properties(order);
    properties.insert("fulfillmentId".into(), json!(fulfillment.id));

    let label = fulfillment.labels.first();
    insert_present(
        &mut properties,
        "trackingNumber",
        label.and_then(|l| l.tracking_number.as_deref()),
    );
    insert_present(
        &mut properties,
        "trackingUrl",
        label.and_then(|l| l.tracking_url.as_deref()),
    );
    insert_present(&mut properties, "carrier", fulfillment.provider_id.as_deref());

    let shipped_at = fulfillment.shipped_at.unwrap_or(now);
    properties.insert("shippedAt".into(), json!(shipped_at.to_rfc3339()));

    MarketingEvent::new(Metric::OrderShipped, email, properties).with_time(shipped_at)
}

pub fn order_canceled(order: &Order, email: &str, now: DateTime<Utc>) -> MarketingEvent {
    let mut properties = order_properties(order);
    let canceled_at = order.canceled_at.unwrap_or(now);
    properties.insert("canceledAt".into(), json!(canceled_at.to_rfc3339()));
    properties.insert(
        "refundAmount".into(),
        json!(order.original_total.or(order.total)),
    );
    properties.insert("currency".into(), json!(order.currency_code));

    MarketingEvent::new(Metric::OrderCanceled, email, properties).with_time(canceled_at)
}

/// Completion is reported as delivery.
pub fn order_delivered(order: &Order, email: &str, now: DateTime<Utc>) -> MarketingEvent {
    let mut properties = order_properties(order);
    properties.insert("completedAt".into(), json!(now.to_rfc3339()));
    properties.insert("total".into(), json!(order.total));
    properties.insert("currency".into(), json!(order.currency_code));

    MarketingEvent::new(Metric::OrderDelivered, email, properties).with_value(order.total)
}

pub fn return_event(
    order: &Order,
    order_return: &OrderReturn,
    stage: ReturnStage,
    email: &str,
) -> MarketingEvent {
    let mut properties = Properties::new();
    properties.insert("orderId".into(), json!(order.id));
    properties.insert("orderNumber".into(), order_number(order));
    properties.insert("returnId".into(), json!(order_return.id));
    insert_present(&mut properties, "status", order_return.status.as_deref());
    properties.insert("refundAmount".into(), json!(order_return.refund_amount));
    properties.insert("currency".into(), json!(order.currency_code));

    let items: Vec<Value> = order_return
        .items
        .iter()
        .map(|item| {
            json!({
                "id": item.item_id,
                "quantity": item.quantity,
                "reason": item.reason_id.as_deref().or(item.note.as_deref()),
            })
        })
        .collect();
    properties.insert("items".into(), Value::Array(items));

    MarketingEvent::new(stage.metric(), email, properties)
}

/// Properties every order event carries.
fn order_properties(order: &Order) -> Properties {
    let mut properties = Properties::new();
    properties.insert("orderId".into(), json!(order.id));
    properties.insert("orderNumber".into(), order_number(order));
    let items: Vec<Value> = order.items.iter().map(line_item_summary).collect();
    properties.insert("items".into(), Value::Array(items));
    properties
}

/// Human-facing number, or the id for drafts without one
fn order_number(order: &Order) -> Value {
    match order.display_id {
        Some(display_id) => json!(display_id),
        None => json!(order.id),
    }
}

fn insert_present(properties: &mut Properties, key: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        properties.insert(key.to_string(), json!(value));
    }
}
