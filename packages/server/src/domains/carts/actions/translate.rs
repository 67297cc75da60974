use medusa_client::Cart;
use serde_json::{json, Value};

use crate::domains::carts::machines::InferredAction;
use crate::domains::carts::models::cart_email;
use crate::domains::marketing::{line_item_summary, MarketingEvent, Metric, Properties};

/// A cart that has someone to attribute events to.
#[derive(Debug, Clone, Copy)]
pub struct CartContext<'a> {
    pub cart: &'a Cart,
    pub email: &'a str,
}

impl<'a> CartContext<'a> {
    /// `None` for anonymous carts.
    pub fn new(cart: &'a Cart) -> Option<Self> {
        cart_email(cart).map(|email| Self { cart, email })
    }

    fn base_properties(&self) -> Properties {
        let mut properties = Properties::new();
        properties.insert("cartId".into(), json!(self.cart.id));
        properties.insert("cartTotal".into(), json!(self.cart.total));
        properties.insert("itemCount".into(), json!(self.cart.items.len()));
        properties.insert("currency".into(), json!(self.cart.currency_code));
        properties
    }
}

pub fn translate(action: &InferredAction, context: &CartContext<'_>) -> MarketingEvent {
    let mut properties = context.base_properties();

    let metric = match action {
        InferredAction::ItemAdded {
            item,
            quantity_delta,
        } => {
            properties.insert("productId".into(), json!(item.product_id));
            properties.insert("variantId".into(), json!(item.variant_id));
            properties.insert("productName".into(), json!(item.title));
            properties.insert("quantity".into(), json!(quantity_delta));
            properties.insert("price".into(), json!(item.unit_price));
            properties.insert("thumbnail".into(), json!(item.thumbnail));
            Metric::AddedToCart
        }
        InferredAction::CheckoutStarted => {
            // The whole cart, not just what changed
            let items: Vec<Value> = context.cart.items.iter().map(line_item_summary).collect();
            properties.insert("items".into(), Value::Array(items));
            Metric::StartedCheckout
        }
    };

    MarketingEvent::new(metric, context.email, properties)
}
