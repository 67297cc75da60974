// Main entry point for the bridge server

use std::sync::Arc;

use anyhow::{Context, Result};
use klaviyo_client::KlaviyoClient;
use medusa_client::MedusaClient;
use server_core::{
    domains::carts::DetectorPolicy,
    kernel::{
        BaseSnapshotStore, KlaviyoAdapter, MedusaGateway, MemorySnapshotStore,
        PostgresSnapshotStore, ServerDeps,
    },
    server::{build_app, AppState},
    Config,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Medusa → Klaviyo bridge");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let snapshots = snapshot_store(&config).await?;
    tracing::info!(backend = snapshots.backend(), "Snapshot store ready");

    let medusa = MedusaClient::new(
        config.medusa_backend_url.clone(),
        config.medusa_api_key.clone(),
        config.medusa_publishable_key.clone(),
    );
    let klaviyo = KlaviyoClient::new(config.klaviyo_api_key.clone());

    let deps = ServerDeps::new(
        Arc::new(MedusaGateway::new(Arc::new(medusa))),
        Arc::new(KlaviyoAdapter::new(
            Arc::new(klaviyo),
            config.klaviyo_subscribers_list_id.clone(),
        )),
        snapshots,
        DetectorPolicy {
            retrospective_catch_up: config.retrospective_add_enabled,
        },
        config.external_call_timeout,
        config.storefront_url.clone(),
    );

    if config.webhook_secret.is_none() {
        tracing::warn!("WEBHOOK_SECRET not set, webhook calls are not authenticated");
    }

    // Build application
    let app = build_app(AppState::new(Arc::new(deps), config.webhook_secret.clone()));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Webhooks: http://localhost:{}/webhooks/commerce", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Postgres when DATABASE_URL is set, memory otherwise.
async fn snapshot_store(config: &Config) -> Result<Arc<dyn BaseSnapshotStore>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!(
            "DATABASE_URL not set, cart snapshots are kept in memory and lost on restart"
        );
        return Ok(Arc::new(MemorySnapshotStore::new()));
    };

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    Ok(Arc::new(PostgresSnapshotStore::new(pool)))
}
