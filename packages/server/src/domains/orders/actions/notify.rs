//! Order and return notification entry points.

use chrono::Utc;
use medusa_client::Order;

use crate::common::NotificationOutcome;
use crate::domains::marketing::{dispatch_events, MarketingEvent};
use crate::domains::orders::actions::translate::{
    order_canceled, order_delivered, order_email, order_shipped, placed_order, return_event,
    ReturnStage,
};
use crate::kernel::{with_timeout, ServerDeps};

/// An order that resolved and has someone to send to.
struct ResolvedOrder {
    order: Order,
    email: String,
}

async fn load_order(order_id: &str, deps: &ServerDeps) -> Result<ResolvedOrder, NotificationOutcome> {
    let order = match with_timeout(
        deps.call_timeout,
        "fetch order",
        deps.commerce.fetch_order(order_id),
    )
    .await
    {
        Ok(Some(order)) => order,
        Ok(None) => return Err(NotificationOutcome::not_found("order", order_id)),
        Err(e) => return Err(NotificationOutcome::failed(&e)),
    };

    let email = order_email(&order)
        .ok_or_else(|| NotificationOutcome::missing_identity("order", order_id))?
        .to_string();

    Ok(ResolvedOrder { order, email })
}

async fn send_one(event: MarketingEvent, deps: &ServerDeps) -> NotificationOutcome {
    let report = dispatch_events(&[event], deps.marketing.as_ref(), deps.call_timeout).await;
    NotificationOutcome::Completed(report)
}

pub async fn on_order_placed(order_id: &str, deps: &ServerDeps) -> NotificationOutcome {
    match load_order(order_id, deps).await {
        Ok(resolved) => send_one(placed_order(&resolved.order, &resolved.email), deps).await,
        Err(outcome) => outcome,
    }
}

pub async fn on_order_shipped(
    order_id: &str,
    fulfillment_id: &str,
    deps: &ServerDeps,
) -> NotificationOutcome {
    let resolved = match load_order(order_id, deps).await {
        Ok(resolved) => resolved,
        Err(outcome) => return outcome,
    };

    let Some(fulfillment) = resolved
        .order
        .fulfillments
        .iter()
        .find(|f| f.id == fulfillment_id)
    else {
        return NotificationOutcome::not_found("fulfillment", fulfillment_id);
    };

    let event = order_shipped(&resolved.order, fulfillment, &resolved.email, Utc::now());
    send_one(event, deps).await
}

pub async fn on_order_canceled(order_id: &str, deps: &ServerDeps) -> NotificationOutcome {
    match load_order(order_id, deps).await {
        Ok(resolved) => {
            let event = order_canceled(&resolved.order, &resolved.email, Utc::now());
            send_one(event, deps).await
        }
        Err(outcome) => outcome,
    }
}

pub async fn on_order_completed(order_id: &str, deps: &ServerDeps) -> NotificationOutcome {
    match load_order(order_id, deps).await {
        Ok(resolved) => {
            let event = order_delivered(&resolved.order, &resolved.email, Utc::now());
            send_one(event, deps).await
        }
        Err(outcome) => outcome,
    }
}

pub async fn on_return_requested(
    order_id: &str,
    return_id: &str,
    deps: &ServerDeps,
) -> NotificationOutcome {
    on_return(order_id, return_id, ReturnStage::Requested, deps).await
}

pub async fn on_return_received(
    order_id: &str,
    return_id: &str,
    deps: &ServerDeps,
) -> NotificationOutcome {
    on_return(order_id, return_id, ReturnStage::Received, deps).await
}

async fn on_return(
    order_id: &str,
    return_id: &str,
    stage: ReturnStage,
    deps: &ServerDeps,
) -> NotificationOutcome {
    let resolved = match load_order(order_id, deps).await {
        Ok(resolved) => resolved,
        Err(outcome) => return outcome,
    };

    let order_return = match with_timeout(
        deps.call_timeout,
        "fetch return",
        deps.commerce.fetch_return(return_id),
    )
    .await
    {
        Ok(Some(order_return)) => order_return,
        Ok(None) => return NotificationOutcome::not_found("return", return_id),
        Err(e) => return NotificationOutcome::failed(&e),
    };

    let event = return_event(&resolved.order, &order_return, stage, &resolved.email);
    send_one(event, deps).await
}
