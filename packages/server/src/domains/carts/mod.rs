//! Carts domain - infers shopper actions from successive cart snapshots.
//!
//! Flow for one `cart.updated` notification (serialized per cart id):
//!   fetch cart → detect actions vs. stored snapshot → translate → dispatch
//!   → overwrite snapshot
//!
//! Detection is pure (machines/), translation is pure (actions/translate),
//! and only the pipeline in actions/process_cart touches IO.

pub mod actions;
pub mod machines;
pub mod models;

pub use actions::{on_cart_changed, translate, CartContext};
pub use machines::{detect_actions, DetectorPolicy, InferredAction};
pub use models::{cart_email, has_shipping_address, CartSnapshot, ItemState};
