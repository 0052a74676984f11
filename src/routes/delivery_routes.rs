use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::delivery_controller::DeliveryController;
use crate::dto::delivery_dto::{AssignRouteRequest, DeliverySearchQuery, SaveDeliveryRequest};
use crate::dto::ApiResponse;
use crate::models::{Delivery, Page};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_delivery_router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_deliveries).post(create_delivery))
        .route(
            "/:id",
            get(get_delivery).put(update_delivery).delete(delete_delivery),
        )
        .route("/:id/route", post(assign_route).delete(unassign_route))
}

async fn create_delivery(
    State(state): State<AppState>,
    Json(request): Json<SaveDeliveryRequest>,
) -> Result<Json<ApiResponse<Delivery>>, AppError> {
    let controller = DeliveryController::new(state.store.clone());
    Ok(Json(controller.create(request).await?))
}

async fn search_deliveries(
    State(state): State<AppState>,
    Query(query): Query<DeliverySearchQuery>,
) -> Result<Json<Page<Delivery>>, AppError> {
    let controller = DeliveryController::new(state.store.clone());
    Ok(Json(controller.search(query).await?))
}

async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Delivery>, AppError> {
    let controller = DeliveryController::new(state.store.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveDeliveryRequest>,
) -> Result<Json<ApiResponse<Delivery>>, AppError> {
    let controller = DeliveryController::new(state.store.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_delivery(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = DeliveryController::new(state.store.clone());
    Ok(Json(controller.delete(id).await?))
}

async fn assign_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignRouteRequest>,
) -> Result<Json<ApiResponse<Delivery>>, AppError> {
    let controller = DeliveryController::new(state.store.clone());
    Ok(Json(controller.assign_route(id, request).await?))
}

async fn unassign_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Delivery>>, AppError> {
    let controller = DeliveryController::new(state.store.clone());
    Ok(Json(controller.unassign_route(id).await?))
}
