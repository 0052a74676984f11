//! Rutas HTTP
//!
//! Cada entidad expone su propio `Router<AppState>`; `create_app_router`
//! los monta bajo `/api` junto con el health check.

pub mod beneficiary_routes;
pub mod dashboard_routes;
pub mod delivery_routes;
pub mod item_routes;
pub mod route_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::state::AppState;

/// Router completo de la aplicación, sin estado ni capas
pub fn create_app_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/beneficiaries", beneficiary_routes::create_beneficiary_router())
        .nest("/api/items", item_routes::create_item_router())
        .nest("/api/deliveries", delivery_routes::create_delivery_router())
        .nest("/api/routes", route_routes::create_route_router())
        .nest("/api/dashboard", dashboard_routes::create_dashboard_router())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
