// HTTP routes
pub mod feeds;
pub mod health;
pub mod webhooks;

pub use feeds::*;
pub use health::*;
pub use webhooks::*;
