use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::route_controller::RouteController;
use crate::dto::route_dto::{ManifestResponse, RouteSearchQuery, SaveRouteRequest};
use crate::dto::ApiResponse;
use crate::models::{Delivery, Page, Route};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_route_router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_routes).post(create_route))
        .route("/:id", get(get_route).put(update_route).delete(delete_route))
        .route("/:id/deliveries", get(route_deliveries))
        .route(
            "/:id/deliveries/:delivery_id",
            post(add_delivery).delete(remove_delivery),
        )
        .route("/:id/manifest", post(generate_manifest))
}

async fn create_route(
    State(state): State<AppState>,
    Json(request): Json<SaveRouteRequest>,
) -> Result<Json<ApiResponse<Route>>, AppError> {
    let controller = RouteController::new(state.store.clone());
    Ok(Json(controller.create(request).await?))
}

async fn search_routes(
    State(state): State<AppState>,
    Query(query): Query<RouteSearchQuery>,
) -> Result<Json<Page<Route>>, AppError> {
    let controller = RouteController::new(state.store.clone());
    Ok(Json(controller.search(query).await?))
}

async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Route>, AppError> {
    let controller = RouteController::new(state.store.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveRouteRequest>,
) -> Result<Json<ApiResponse<Route>>, AppError> {
    let controller = RouteController::new(state.store.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = RouteController::new(state.store.clone());
    Ok(Json(controller.delete(id).await?))
}

async fn route_deliveries(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Delivery>>, AppError> {
    let controller = RouteController::new(state.store.clone());
    Ok(Json(controller.deliveries(id).await?))
}

async fn add_delivery(
    State(state): State<AppState>,
    Path((id, delivery_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Route>>, AppError> {
    let controller = RouteController::new(state.store.clone());
    Ok(Json(controller.add_delivery(id, delivery_id).await?))
}

async fn remove_delivery(
    State(state): State<AppState>,
    Path((id, delivery_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<Route>>, AppError> {
    let controller = RouteController::new(state.store.clone());
    Ok(Json(controller.remove_delivery(id, delivery_id).await?))
}

async fn generate_manifest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ManifestResponse>>, AppError> {
    let controller = RouteController::new(state.store.clone());
    Ok(Json(controller.generate_manifest(id, &state.manifests).await?))
}
