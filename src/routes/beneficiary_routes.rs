use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::beneficiary_controller::BeneficiaryController;
use crate::dto::beneficiary_dto::{BeneficiarySearchQuery, SaveBeneficiaryRequest};
use crate::dto::ApiResponse;
use crate::models::{Beneficiary, Page};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_beneficiary_router() -> Router<AppState> {
    Router::new()
        .route("/", get(search_beneficiaries).post(create_beneficiary))
        .route(
            "/:id",
            get(get_beneficiary).put(update_beneficiary).delete(delete_beneficiary),
        )
}

async fn create_beneficiary(
    State(state): State<AppState>,
    Json(request): Json<SaveBeneficiaryRequest>,
) -> Result<Json<ApiResponse<Beneficiary>>, AppError> {
    let controller = BeneficiaryController::new(state.store.clone());
    Ok(Json(controller.create(request).await?))
}

async fn search_beneficiaries(
    State(state): State<AppState>,
    Query(query): Query<BeneficiarySearchQuery>,
) -> Result<Json<Page<Beneficiary>>, AppError> {
    let controller = BeneficiaryController::new(state.store.clone());
    Ok(Json(controller.search(query).await?))
}

async fn get_beneficiary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Beneficiary>, AppError> {
    let controller = BeneficiaryController::new(state.store.clone());
    Ok(Json(controller.get_by_id(id).await?))
}

async fn update_beneficiary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SaveBeneficiaryRequest>,
) -> Result<Json<ApiResponse<Beneficiary>>, AppError> {
    let controller = BeneficiaryController::new(state.store.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn delete_beneficiary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = BeneficiaryController::new(state.store.clone());
    Ok(Json(controller.delete(id).await?))
}
