pub mod notify;
pub mod translate;

pub use notify::{
    on_order_canceled, on_order_completed, on_order_placed, on_order_shipped,
    on_return_received, on_return_requested,
};
pub use translate::{
    order_canceled, order_delivered, order_email, order_shipped, placed_order, return_event,
    ReturnStage,
};
