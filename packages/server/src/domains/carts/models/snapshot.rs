use medusa_client::Cart;
use serde::{Deserialize, Serialize};

/// Last-seen state of one cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemState {
    pub id: String,
    pub quantity: u32,
    pub variant_id: Option<String>,
}

/// The subset of cart state that action inference compares against.
///
/// Written whole after every observation of a cart; never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub item_count: usize,
    pub has_shipping_address: bool,
    pub has_email: bool,
    /// One entry per cart line, in the host's order
    pub items: Vec<ItemState>,
}

impl CartSnapshot {
    /// Capture the comparable state of `cart`.
    pub fn observe(cart: &Cart) -> Self {
        let items: Vec<ItemState> = cart
            .items
            .iter()
            .map(|item| ItemState {
                id: item.id.clone(),
                quantity: item.quantity,
                variant_id: item.variant_id.clone(),
            })
            .collect();

        Self {
            item_count: items.len(),
            has_shipping_address: has_shipping_address(cart),
            has_email: cart_email(cart).is_some(),
            items,
        }
    }

    pub fn item(&self, line_item_id: &str) -> Option<&ItemState> {
        self.items.iter().find(|item| item.id == line_item_id)
    }
}

/// The cart's email, ignoring blanks.
pub fn cart_email(cart: &Cart) -> Option<&str> {
    cart.email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
}

/// A shipping address only counts once its first street line is filled in.
pub fn has_shipping_address(cart: &Cart) -> bool {
    cart.shipping_address
        .as_ref()
        .and_then(|address| address.address_1.as_deref())
        .is_some_and(|line| !line.trim().is_empty())
}
