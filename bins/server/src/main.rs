//! Invoicely API Server
//!
//! Main entry point for the Invoicely backend service.

use std::time::Duration;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoicely_api::{AppState, create_router};
use invoicely_db::migration::{Migrator, MigratorTrait};
use invoicely_db::{TokenRevocationRepository, connect};
use invoicely_shared::{AppConfig, JwtService};

const REVOCATION_PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoicely=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    tokio::spawn(purge_revocations(TokenRevocationRepository::new(db.clone())));

    let state = AppState::new(db, JwtService::new(config.jwt.clone()), config.invoice.clone());
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Drops revocation rows whose tokens have expired anyway.
async fn purge_revocations(tokens: TokenRevocationRepository) {
    let mut ticker = tokio::time::interval(REVOCATION_PURGE_INTERVAL);
    loop {
        ticker.tick().await;
        match tokens.purge_expired(chrono::Utc::now()).await {
            Ok(0) => {}
            Ok(purged) => info!(purged, "Purged expired token revocations"),
            Err(e) => warn!(error = %e, "Failed to purge token revocations"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
