pub mod sync_customer;

pub use sync_customer::{on_customer_upserted, profile_attributes};
