//! Conexión a PostgreSQL
//!
//! Crea el pool y aplica las migraciones de `migrations/` al arrancar.

use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::utils::errors::{AppError, AppResult};

/// Conectar y dejar el schema al día
pub async fn connect(config: &DatabaseConfig) -> AppResult<PgPool> {
    tracing::info!("🔌 Connecting to {}", mask_database_url(&config.url));

    let pool = config.create_pool().await.map_err(|e| {
        tracing::error!("❌ Could not connect to the database: {}", e);
        AppError::Database(e)
    })?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Ejecutar migraciones de la base de datos
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Storage(format!("migration failed: {}", e)))?;

    tracing::info!("✅ Database migrations applied");
    Ok(())
}

/// Función helper para enmascarar la URL de la base de datos en logs
fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
