use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::item_controller::ItemController;
use crate::dto::item_dto::{ItemSearchQuery, SaveItemRequest};
use crate::dto::ApiResponse;
use crate::models::{Item, Page};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_item_router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_items).post(create_item))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
}

async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<SaveItemRequest>,
) -> Result<Json<ApiResponse<Item>>, AppError> {
    let controller = ItemController::new(state.store.clone());
    Ok(Json(controller.create(request).await?))
}

async fn search_items(
    State(state): State<AppState>,
    Query(query): Query<ItemSearchQuery>,
) -> Result<Json<Page<Item>>, AppError> {
    let controller = ItemController::new(state.store.clone());
    Ok(Json(controller.search(query).await?))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, AppError> {
    let controller = ItemController::new(state.store.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveItemRequest>,
) -> Result<Json<ApiResponse<Item>>, AppError> {
    let controller = ItemController::new(state.store.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = ItemController::new(state.store.clone());
    Ok(Json(controller.delete(id).await?))
}
