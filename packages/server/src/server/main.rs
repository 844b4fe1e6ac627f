// Main entry point for the registry API server

use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_client::CatalogClient;
use registry_core::domains::auth::JwtService;
use registry_core::kernel::{CatalogAdapter, FsArtifactStore, PostgresRegistryStore, ServerDeps};
use registry_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,registry_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting mod registry API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        game = %config.game_name,
        catalog = %config.catalog_base_url,
        downloads = config.enable_downloads,
        "Configuration loaded"
    );

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
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

    let deps = ServerDeps::new(
        Arc::new(PostgresRegistryStore::new(pool)),
        Arc::new(CatalogAdapter::new(Arc::new(CatalogClient::new(
            config.catalog_base_url.clone(),
        )))),
        Arc::new(FsArtifactStore::new(&config.uploads_dir)),
        Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
        config.import_options(),
    );

    let app = build_app(deps);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
