//! Feeds domain - product catalogue reshaped for the marketing platform.

pub mod actions;
pub mod models;

pub use actions::product_feed;
pub use models::{build_feed, FeedProduct};
