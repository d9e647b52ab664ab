// Main entry point for the smart-home guard API server

use std::sync::Arc;

use anyhow::{Context, Result};
use smarthome_core::{
    domains::auth::JwtService,
    server::app::{build_app, build_deps, spawn_motion_subscriber},
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
                .unwrap_or_else(|_| "info,smarthome_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Smart Home Guard API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to the document store backend
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Connect to the pub/sub broker
    let nats = async_nats::connect(&config.nats_url)
        .await
        .context("Failed to connect to NATS")?;
    tracing::info!("NATS connected");

    let deps = build_deps(&config, pool, nats.clone());
    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    // Feed the motion pipeline from the motion topic
    spawn_motion_subscriber(nats, deps.clone());

    let app = build_app(deps, jwt_service);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
