//! Sweet Bites Storefront - cart service

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sweetbites_storefront::api::{self, AppState};
use sweetbites_storefront::config::Config;
use sweetbites_storefront::domain::ports::{CartEventPublisher, NoopPublisher};
use sweetbites_storefront::infrastructure::{NatsPublisher, PgCartStore, PgCatalog};
use sweetbites_storefront::service::CartService;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let db = PgPoolOptions::new().max_connections(config.database_max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let events: Arc<dyn CartEventPublisher> = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Arc::new(NatsPublisher::new(client, config.nats_subject_prefix.clone())),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, cart events disabled");
                Arc::new(NoopPublisher)
            }
        },
        None => Arc::new(NoopPublisher),
    };

    let carts = CartService::new(Arc::new(PgCartStore::new(db.clone())), Arc::new(PgCatalog::new(db)), events);
    let app = api::router(AppState { carts })
        .layer(TraceLayer::new_for_http())
        .layer(api::cors_layer(config.cors_origin.as_deref())?);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("Sweet Bites cart service listening on 0.0.0.0:{}", config.port);
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
