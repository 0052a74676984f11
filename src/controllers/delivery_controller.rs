use uuid::Uuid;

use crate::dto::delivery_dto::{AssignRouteRequest, DeliverySearchQuery, SaveDeliveryRequest};
use crate::dto::ApiResponse;
use crate::models::{Delivery, DeliveryData, Page};
use crate::repositories::{DeliveryFilter, SharedStore};
use crate::services::consistency_guard;
use crate::utils::errors::{conflict_error, not_found_error, validation_error, AppError, AppResult};
use crate::utils::validation::is_blank;

pub struct DeliveryController {
    store: SharedStore,
}

impl DeliveryController {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn find(&self, id: Uuid) -> AppResult<Delivery> {
        self.store
            .find_delivery(id)
            .await?
            .ok_or_else(|| not_found_error("Delivery", &id.to_string()))
    }

    /// Comprueba que beneficiario, ítems y ruta nueva existen, y la puerta de asignación
    async fn check_references(&self, current: Option<&Delivery>, data: &DeliveryData) -> AppResult<()> {
        if self.store.find_beneficiary(data.beneficiary_id).await?.is_none() {
            return Err(not_found_error("Beneficiary", &data.beneficiary_id.to_string()));
        }
        for line in &data.items {
            if self.store.find_item(line.item_id).await?.is_none() {
                return Err(not_found_error("Item", &line.item_id.to_string()));
            }
        }

        let route_exists = match data.route_id {
            Some(route_id) => self.store.find_route(route_id).await?.is_some(),
            None => false,
        };
        consistency_guard::check_route_change(current, data, route_exists)
    }

    pub async fn create(&self, request: SaveDeliveryRequest) -> AppResult<ApiResponse<Delivery>> {
        let data = consistency_guard::delivery_data(request, None)?;
        self.check_references(None, &data).await?;

        let id = self
            .store
            .save_delivery(None, &data)
            .await?
            .ok_or_else(|| AppError::Internal("delivery insert returned no id".to_string()))?;

        tracing::info!("✅ Delivery {} created with {} item(s)", id, data.items.len());
        Ok(ApiResponse::success_with_message(
            self.find(id).await?,
            "Delivery created successfully".to_string(),
        ))
    }

    /// "Salvar" completo: reemplaza la fila y todas sus líneas de ítems.
    /// Sin `route_id` en el request la entrega sigue en su ruta.
    pub async fn update(&self, id: Uuid, request: SaveDeliveryRequest) -> AppResult<ApiResponse<Delivery>> {
        let current = self.find(id).await?;
        let data = consistency_guard::delivery_data(request, Some(&current))?;
        self.check_references(Some(&current), &data).await?;

        if self.store.save_delivery(Some(id), &data).await?.is_none() {
            return Err(not_found_error("Delivery", &id.to_string()));
        }

        tracing::info!("✏️ Delivery {} saved", id);
        Ok(ApiResponse::success_with_message(
            self.find(id).await?,
            "Delivery updated successfully".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Delivery> {
        self.find(id).await
    }

    /// Se aplica el primer criterio presente; sin criterios lista todas
    pub async fn search(&self, query: DeliverySearchQuery) -> AppResult<Page<Delivery>> {
        let page = query.page_request();
        let filter = if let Some(beneficiary_id) = query.beneficiary_id {
            DeliveryFilter::Beneficiary(beneficiary_id)
        } else if let Some(status) = query.status {
            DeliveryFilter::Status(status)
        } else if let Some(date) = query.date {
            DeliveryFilter::Date(date)
        } else if let Some(route_id) = query.route_id {
            DeliveryFilter::Route(route_id)
        } else if let Some(text) = query.text {
            if is_blank(Some(&text)) {
                return Err(validation_error("Search text cannot be blank"));
            }
            DeliveryFilter::Text(text.trim().to_string())
        } else {
            DeliveryFilter::All
        };

        self.store.find_deliveries(&filter, page).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        if !self.store.delete_delivery(id).await? {
            return Err(not_found_error("Delivery", &id.to_string()));
        }

        tracing::info!("🗑️ Delivery {} deleted", id);
        Ok(ApiResponse::done("Delivery deleted successfully".to_string()))
    }

    /// Asigna la entrega a una ruta; solo entregas pendientes
    pub async fn assign_route(&self, id: Uuid, request: AssignRouteRequest) -> AppResult<ApiResponse<Delivery>> {
        let delivery = self.find(id).await?;
        if self.store.find_route(request.route_id).await?.is_none() {
            return Err(not_found_error("Route", &request.route_id.to_string()));
        }
        consistency_guard::check_assign(&delivery, request.route_id)?;

        if !delivery.belongs_to(request.route_id)
            && !self.store.add_delivery_to_route(request.route_id, id).await?
        {
            return Err(conflict_error("Delivery changed while it was being assigned"));
        }

        tracing::info!("🛣️ Delivery {} assigned to route {}", id, request.route_id);
        Ok(ApiResponse::success_with_message(
            self.find(id).await?,
            "Delivery assigned to route".to_string(),
        ))
    }

    pub async fn unassign_route(&self, id: Uuid) -> AppResult<ApiResponse<Delivery>> {
        let delivery = self.find(id).await?;
        let route_id = consistency_guard::check_unassign(&delivery)?;

        if !self.store.remove_delivery_from_route(route_id, id).await? {
            return Err(conflict_error("Delivery changed while it was being unassigned"));
        }

        tracing::info!("🛣️ Delivery {} removed from route {}", id, route_id);
        Ok(ApiResponse::success_with_message(
            self.find(id).await?,
            "Delivery removed from route".to_string(),
        ))
    }
}
