pub mod process_cart;
pub mod translate;

pub use process_cart::on_cart_changed;
pub use translate::{translate, CartContext};
