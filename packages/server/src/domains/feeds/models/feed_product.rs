use medusa_client::Product;
use serde::Serialize;

/// One catalogue entry as the marketing platform's feed sync expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedProduct {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub handle: String,
    pub thumbnail: Option<String>,
    pub image_link: Option<String>,
    /// Cheapest variant in the requested currency
    pub from_price: Option<f64>,
    pub currency_code: String,
    pub url: String,
    pub categories: Vec<String>,
}

pub fn build_feed(products: &[Product], currency_code: &str, storefront_url: &str) -> Vec<FeedProduct> {
    let currency_code = currency_code.to_lowercase();
    let storefront_url = storefront_url.trim_end_matches('/');

    products
        .iter()
        .map(|product| FeedProduct {
            id: product.id.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            handle: product.handle.clone(),
            thumbnail: product.thumbnail.clone(),
            image_link: product.images.first().map(|image| image.url.clone()),
            from_price: from_price(product),
            currency_code: currency_code.clone(),
            url: format!("{}/products/{}", storefront_url, product.handle),
            categories: product.categories.iter().map(|c| c.name.clone()).collect(),
        })
        .collect()
}

/// Variants without a price in the currency are ignored.
fn from_price(product: &Product) -> Option<f64> {
    product
        .variants
        .iter()
        .filter_map(|variant| variant.calculated_price.as_ref()?.calculated_amount)
        .min_by(|a, b| a.total_cmp(b))
}
