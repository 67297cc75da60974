//! Test fixtures for host entities and webhook envelopes.

use serde_json::{json, Value};

pub use server_core::kernel::test_dependencies::fixtures::*;

pub fn envelope(event: &str, data: Value) -> Value {
    json!({ "event": event, "data": data })
}

pub fn cart_updated(cart_id: &str) -> Value {
    envelope("cart.updated", json!({ "id": cart_id }))
}
