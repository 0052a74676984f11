use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use aid_logistics::config::{DatabaseConfig, EnvironmentConfig, StoreBackend};
use aid_logistics::repositories::{MemoryStore, PgStore, SharedStore};
use aid_logistics::state::AppState;
use aid_logistics::{build_app, database};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env().context("invalid configuration")?;

    // Configurar logging; los macros de `log` también pasan por aquí
    let level = config.log_level.parse().unwrap_or(tracing::Level::DEBUG);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("📦 Aid logistics API");
    info!("======================");

    let store: SharedStore = match config.store_backend {
        StoreBackend::Postgres => {
            let database = DatabaseConfig::from_environment(&config)?;
            let pool = database::connect(&database)
                .await
                .context("could not prepare the database")?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            info!("🧪 Using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_url()))?;
    info!("📄 Manifests are written to {}", config.manifest_dir.display());

    let app = build_app(AppState::new(store, config));

    info!("🌐 Server listening on http://{}", addr);
    info!("   /api/beneficiaries  /api/items  /api/deliveries  /api/routes  /api/dashboard");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    info!("👋 Server stopped");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Could not install Ctrl+C handler: {}", e);
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
                error!("❌ Could not install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 Termination signal received, shutting down...");
        },
    }
}
