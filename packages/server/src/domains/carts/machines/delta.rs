//! Cart delta detection.
//!
//! The host only says "this cart changed". What the shopper actually did is
//! recovered by comparing the current cart with the snapshot stored after the
//! previous notification. Pure: no IO, deterministic for a given input.

use medusa_client::{Cart, LineItem};

use crate::domains::carts::models::{cart_email, has_shipping_address, CartSnapshot};

/// A shopper action recovered from two successive cart states.
#[derive(Debug, Clone, PartialEq)]
pub enum InferredAction {
    /// `item` is the current line item with `quantity` replaced by the delta
    ItemAdded { item: LineItem, quantity_delta: u32 },
    CheckoutStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorPolicy {
    /// Emit a catch-up "added" for the most recent line when a cart that
    /// already had items first becomes identifiable. This can repeat an
    /// addition that was already reported.
    pub retrospective_catch_up: bool,
}

impl Default for DetectorPolicy {
    fn default() -> Self {
        Self {
            retrospective_catch_up: true,
        }
    }
}

/// Infer what happened between `previous` and `current`.
///
/// Ordering of the result: item additions first (cart order), then checkout
/// started, then the retrospective catch-up. Nothing is inferred for a cart
/// without an email.
pub fn detect_actions(
    previous: Option<&CartSnapshot>,
    current: &Cart,
    policy: DetectorPolicy,
) -> Vec<InferredAction> {
    if cart_email(current).is_none() {
        return Vec::new();
    }

    let mut actions = match previous {
        None => first_sighting(current),
        Some(previous) => added_since(previous, current),
    };

    let had_shipping = previous.is_some_and(|p| p.has_shipping_address);
    if has_shipping_address(current) && !had_shipping {
        actions.push(InferredAction::CheckoutStarted);
    }

    // Catch-up for activity that happened while the shopper was anonymous
    let became_identified = previous.is_some_and(|p| !p.has_email);
    if policy.retrospective_catch_up && became_identified {
        if let Some(last) = current.items.last() {
            actions.push(added(last, last.quantity));
        }
    }

    actions
}

/// Only the most recent line is reported the first time a cart is seen.
fn first_sighting(current: &Cart) -> Vec<InferredAction> {
    current
        .items
        .last()
        .map(|item| added(item, item.quantity))
        .into_iter()
        .collect()
}

fn added_since(previous: &CartSnapshot, current: &Cart) -> Vec<InferredAction> {
    current
        .items
        .iter()
        .filter_map(|item| {
            let before = previous.item(&item.id).map_or(0, |state| state.quantity);
            (item.quantity > before).then(|| added(item, item.quantity - before))
        })
        .collect()
}

fn added(item: &LineItem, quantity_delta: u32) -> InferredAction {
    InferredAction::ItemAdded {
        item: LineItem {
            quantity: quantity_delta,
            ..item.clone()
        },
        quantity_delta,
    }
}
