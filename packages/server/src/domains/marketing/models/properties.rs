use medusa_client::LineItem;
use serde_json::{json, Value};

/// Item entry used in every `items` list sent to Klaviyo.
pub fn line_item_summary(item: &LineItem) -> Value {
    json!({
        "id": item.variant_id,
        "title": item.title,
        "quantity": item.quantity,
        "price": item.unit_price,
        "productId": item.product_id,
        "thumbnail": item.thumbnail,
    })
}
