use uuid::Uuid;

use crate::dto::beneficiary_dto::{BeneficiarySearchQuery, SaveBeneficiaryRequest};
use crate::dto::ApiResponse;
use crate::models::{Beneficiary, Page};
use crate::repositories::{BeneficiaryFilter, SharedStore};
use crate::services::consistency_guard;
use crate::utils::errors::{not_found_error, AppResult};

pub struct BeneficiaryController {
    store: SharedStore,
}

impl BeneficiaryController {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: SaveBeneficiaryRequest) -> AppResult<ApiResponse<Beneficiary>> {
        let data = consistency_guard::beneficiary_data(request)?;
        let beneficiary = self.store.create_beneficiary(&data).await?;

        tracing::info!("✅ Beneficiary {} created", beneficiary.id);
        Ok(ApiResponse::success_with_message(
            beneficiary,
            "Beneficiary created successfully".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Beneficiary> {
        self.store
            .find_beneficiary(id)
            .await?
            .ok_or_else(|| not_found_error("Beneficiary", &id.to_string()))
    }

    pub async fn search(&self, query: BeneficiarySearchQuery) -> AppResult<Page<Beneficiary>> {
        let page = query.page_request();
        let filter = BeneficiaryFilter::new(query.text, query.in_description, query.status);
        self.store.find_beneficiaries(&filter, page).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: SaveBeneficiaryRequest,
    ) -> AppResult<ApiResponse<Beneficiary>> {
        let data = consistency_guard::beneficiary_data(request)?;
        let beneficiary = self
            .store
            .update_beneficiary(id, &data)
            .await?
            .ok_or_else(|| not_found_error("Beneficiary", &id.to_string()))?;

        tracing::info!("✏️ Beneficiary {} updated", id);
        Ok(ApiResponse::success_with_message(
            beneficiary,
            "Beneficiary updated successfully".to_string(),
        ))
    }

    /// Borrado físico; prohibido mientras alguna entrega lo referencie
    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        let in_use = self.store.beneficiary_in_use(id).await?;
        consistency_guard::check_deletable(in_use, "Beneficiary")?;

        if !self.store.delete_beneficiary(id).await? {
            return Err(not_found_error("Beneficiary", &id.to_string()));
        }

        tracing::info!("🗑️ Beneficiary {} deleted", id);
        Ok(ApiResponse::done("Beneficiary deleted successfully".to_string()))
    }
}
