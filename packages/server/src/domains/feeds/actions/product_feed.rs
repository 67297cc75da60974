use anyhow::Result;
use tracing::info;

use crate::domains::feeds::models::{build_feed, FeedProduct};
use crate::kernel::{with_timeout, ServerDeps};

/// Build the feed for `currency_code` from the live catalogue.
pub async fn product_feed(currency_code: &str, deps: &ServerDeps) -> Result<Vec<FeedProduct>> {
    let currency_code = currency_code.to_lowercase();
    let products = with_timeout(
        deps.call_timeout,
        "list products",
        deps.commerce.list_products(&currency_code),
    )
    .await?;

    let feed = build_feed(&products, &currency_code, &deps.storefront_url);
    info!(currency_code = %currency_code, products = feed.len(), "Product feed built");

    Ok(feed)
}
