//! Routes each host fact to the domain entry point that handles it.

use crate::common::NotificationOutcome;
use crate::domains::carts::on_cart_changed;
use crate::domains::customers::on_customer_upserted;
use crate::domains::notifications::events::CommerceEvent;
use crate::domains::orders::{
    on_order_canceled, on_order_completed, on_order_placed, on_order_shipped,
    on_return_received, on_return_requested,
};
use crate::kernel::ServerDeps;

/// Run the handler for `event` to completion. Never fails; the outcome says
/// what happened.
pub async fn handle_event(event: &CommerceEvent, deps: &ServerDeps) -> NotificationOutcome {
    match event {
        CommerceEvent::CartUpdated { cart_id } => on_cart_changed(cart_id, deps).await,
        CommerceEvent::OrderPlaced { order_id } => on_order_placed(order_id, deps).await,
        CommerceEvent::OrderFulfillmentCreated {
            order_id,
            fulfillment_id,
        } => on_order_shipped(order_id, fulfillment_id, deps).await,
        CommerceEvent::OrderCanceled { order_id } => on_order_canceled(order_id, deps).await,
        CommerceEvent::OrderCompleted { order_id } => on_order_completed(order_id, deps).await,
        CommerceEvent::ReturnRequested {
            order_id,
            return_id,
        } => on_return_requested(order_id, return_id, deps).await,
        CommerceEvent::ReturnReceived {
            order_id,
            return_id,
        } => on_return_received(order_id, return_id, deps).await,
        CommerceEvent::CustomerCreated { customer_id }
        | CommerceEvent::CustomerUpdated { customer_id } => {
            on_customer_upserted(customer_id, deps).await
        }
    }
}
