pub mod feed_product;

pub use feed_product::{build_feed, FeedProduct};
