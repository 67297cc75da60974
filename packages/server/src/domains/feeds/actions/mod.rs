pub mod product_feed;

pub use product_feed::product_feed;
