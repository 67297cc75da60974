use tracing::debug;

use crate::common::{DispatchReport, NotificationOutcome};
use crate::domains::carts::actions::translate::{translate, CartContext};
use crate::domains::carts::machines::detect_actions;
use crate::domains::carts::models::CartSnapshot;
use crate::domains::marketing::{dispatch_events, MarketingEvent};
use crate::kernel::{with_timeout, ServerDeps};

/// Handle one `cart.updated` notification.
///
/// Runs fetch → detect → dispatch → store under the cart's lock, so two
/// notifications for one cart never compare against the same snapshot. The
/// snapshot is written even when sends fail; it is not written when the cart
/// could not be read.
pub async fn on_cart_changed(cart_id: &str, deps: &ServerDeps) -> NotificationOutcome {
    let _guard = deps.cart_locks.lock(cart_id).await;

    let cart = match with_timeout(
        deps.call_timeout,
        "fetch cart",
        deps.commerce.fetch_cart(cart_id),
    )
    .await
    {
        Ok(Some(cart)) => cart,
        Ok(None) => return NotificationOutcome::not_found("cart", cart_id),
        Err(e) => return NotificationOutcome::failed(&e),
    };

    let previous = match deps.snapshots.get(cart_id).await {
        Ok(previous) => previous,
        Err(e) => return NotificationOutcome::failed(&e),
    };

    let actions = detect_actions(previous.as_ref(), &cart, deps.detector_policy);
    debug!(
        cart_id,
        first_sighting = previous.is_none(),
        actions = actions.len(),
        "Cart delta detected"
    );

    let report = match CartContext::new(&cart) {
        Some(context) => {
            let events: Vec<MarketingEvent> =
                actions.iter().map(|a| translate(a, &context)).collect();
            dispatch_events(&events, deps.marketing.as_ref(), deps.call_timeout).await
        }
        None => DispatchReport::default(),
    };

    let snapshot = CartSnapshot::observe(&cart);
    if let Err(e) = deps.snapshots.put(cart_id, &snapshot).await {
        return NotificationOutcome::failed(&e);
    }

    debug!(
        cart_id,
        backend = deps.snapshots.backend(),
        item_count = snapshot.item_count,
        "Cart snapshot stored"
    );

    NotificationOutcome::Completed(report)
}
