use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub klaviyo_api_key: String,
    pub klaviyo_subscribers_list_id: Option<String>,
    pub medusa_backend_url: String,
    pub medusa_api_key: String,
    pub medusa_publishable_key: String,
    pub storefront_url: String,
    pub database_url: Option<String>,
    pub webhook_secret: Option<String>,
    /// Retroactive "Added to Cart" when a shopper first becomes identifiable
    pub retrospective_add_enabled: bool,
    pub external_call_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "9000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            klaviyo_api_key: env::var("KLAVIYO_API_KEY")
                .context("KLAVIYO_API_KEY must be set")?,
            klaviyo_subscribers_list_id: optional("KLAVIYO_SUBSCRIBERS_LIST_ID"),
            medusa_backend_url: env::var("MEDUSA_BACKEND_URL")
                .context("MEDUSA_BACKEND_URL must be set")?,
            medusa_api_key: env::var("MEDUSA_API_KEY").context("MEDUSA_API_KEY must be set")?,
            medusa_publishable_key: env::var("MEDUSA_PUBLISHABLE_KEY")
                .context("MEDUSA_PUBLISHABLE_KEY must be set")?,
            storefront_url: env::var("STOREFRONT_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            database_url: optional("DATABASE_URL"),
            webhook_secret: optional("WEBHOOK_SECRET"),
            retrospective_add_enabled: parse_flag(
                env::var("CART_RETROSPECTIVE_ADD_ENABLED").ok().as_deref(),
                true,
            )
            .context("CART_RETROSPECTIVE_ADD_ENABLED must be true or false")?,
            external_call_timeout: Duration::from_secs(
                env::var("EXTERNAL_CALL_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .context("EXTERNAL_CALL_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
        })
    }
}

/// Unset and blank variables are both treated as absent.
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: Option<&str>, default: bool) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("unrecognised boolean `{}`", other),
        },
    }
}
