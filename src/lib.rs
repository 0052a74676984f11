//! Logística de ayuda social
//!
//! Beneficiarios, ítems donados, entregas y rutas de distribución, con una
//! capa de consistencia relacional sobre PostgreSQL (o un almacén en memoria)
//! y exportación de manifiestos de ruta en PDF.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Router listo para servir: rutas, trazas HTTP, compresión y CORS
pub fn build_app(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config);

    routes::create_app_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}
