pub mod snapshot;

pub use snapshot::{cart_email, has_shipping_address, CartSnapshot, ItemState};
