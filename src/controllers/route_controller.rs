use chrono::Local;
use futures::future::try_join_all;
use uuid::Uuid;

use crate::dto::route_dto::{ManifestResponse, RouteSearchQuery, SaveRouteRequest};
use crate::dto::ApiResponse;
use crate::models::{Delivery, Page, Route};
use crate::repositories::{RouteFilter, SharedStore};
use crate::services::{consistency_guard, ManifestExporter};
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult};

pub struct RouteController {
    store: SharedStore,
}

impl RouteController {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn find(&self, id: Uuid) -> AppResult<Route> {
        self.store
            .find_route(id)
            .await?
            .ok_or_else(|| not_found_error("Route", &id.to_string()))
    }

    async fn find_delivery(&self, id: Uuid) -> AppResult<Delivery> {
        self.store
            .find_delivery(id)
            .await?
            .ok_or_else(|| not_found_error("Delivery", &id.to_string()))
    }

    /// Lee las entregas pedidas para validar la foto de miembros
    async fn load_members(&self, ids: &[Uuid]) -> AppResult<Vec<Delivery>> {
        let found = try_join_all(ids.iter().map(|id| self.store.find_delivery(*id))).await?;
        Ok(found.into_iter().flatten().collect())
    }

    pub async fn create(&self, request: SaveRouteRequest) -> AppResult<ApiResponse<Route>> {
        let data = consistency_guard::route_data(request, None, Local::now().date_naive())?;
        let members = self.load_members(&data.delivery_ids).await?;
        consistency_guard::check_route_members(None, &data.delivery_ids, &members)?;

        let id = self
            .store
            .save_route(None, &data)
            .await?
            .ok_or_else(|| AppError::Internal("route insert returned no id".to_string()))?;

        tracing::info!("✅ Route {} created with {} delivery(ies)", id, data.delivery_ids.len());
        Ok(ApiResponse::success_with_message(
            self.find(id).await?,
            "Route created successfully".to_string(),
        ))
    }

    /// Reemplaza nombre, fecha y la foto completa de miembros
    pub async fn update(&self, id: Uuid, request: SaveRouteRequest) -> AppResult<ApiResponse<Route>> {
        let existing = self.find(id).await?;
        let data = consistency_guard::route_data(request, Some(&existing), Local::now().date_naive())?;
        let members = self.load_members(&data.delivery_ids).await?;
        consistency_guard::check_route_members(Some(id), &data.delivery_ids, &members)?;

        if self.store.save_route(Some(id), &data).await?.is_none() {
            return Err(not_found_error("Route", &id.to_string()));
        }

        tracing::info!("✏️ Route {} saved with {} delivery(ies)", id, data.delivery_ids.len());
        Ok(ApiResponse::success_with_message(
            self.find(id).await?,
            "Route updated successfully".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Route> {
        self.find(id).await
    }

    /// Rutas de la más reciente a la más antigua
    pub async fn search(&self, query: RouteSearchQuery) -> AppResult<Page<Route>> {
        let page = query.page_request();
        let filter = match query.date {
            Some(date) => RouteFilter::Date(date),
            None => RouteFilter::All,
        };
        self.store.find_routes(&filter, page).await
    }

    /// Miembros de la ruta, sin la referencia de vuelta a la ruta
    pub async fn deliveries(&self, id: Uuid) -> AppResult<Vec<Delivery>> {
        Ok(self.find(id).await?.deliveries)
    }

    /// Suelta a los miembros y borra la ruta; las entregas se conservan
    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        if !self.store.delete_route(id).await? {
            return Err(not_found_error("Route", &id.to_string()));
        }

        tracing::info!("🗑️ Route {} deleted, members detached", id);
        Ok(ApiResponse::done("Route deleted successfully".to_string()))
    }

    pub async fn add_delivery(&self, route_id: Uuid, delivery_id: Uuid) -> AppResult<ApiResponse<Route>> {
        let route = self.store.find_route(route_id).await?;
        let delivery = self.find_delivery(delivery_id).await?;
        consistency_guard::check_add_to_route(route.as_ref(), route_id, &delivery)?;

        if !delivery.belongs_to(route_id)
            && !self.store.add_delivery_to_route(route_id, delivery_id).await?
        {
            return Err(conflict_error("Delivery changed while it was being added to the route"));
        }

        tracing::info!("➕ Delivery {} added to route {}", delivery_id, route_id);
        Ok(ApiResponse::success_with_message(
            self.find(route_id).await?,
            "Delivery added to route".to_string(),
        ))
    }

    pub async fn remove_delivery(&self, route_id: Uuid, delivery_id: Uuid) -> AppResult<ApiResponse<Route>> {
        let route = self.find(route_id).await?;
        let delivery = self.find_delivery(delivery_id).await?;
        consistency_guard::check_remove_from_route(route.id, &delivery)?;

        if !self.store.remove_delivery_from_route(route_id, delivery_id).await? {
            return Err(conflict_error("Delivery changed while it was being removed from the route"));
        }

        tracing::info!("➖ Delivery {} removed from route {}", delivery_id, route_id);
        Ok(ApiResponse::success_with_message(
            self.find(route_id).await?,
            "Delivery removed from route".to_string(),
        ))
    }

    /// Relee la ruta hidratada y la exporta a PDF
    pub async fn generate_manifest(
        &self,
        id: Uuid,
        exporter: &ManifestExporter,
    ) -> AppResult<ApiResponse<ManifestResponse>> {
        let route = self.find(id).await?;
        let deliveries = route.deliveries.len();
        let path = exporter.export(route).await?;

        Ok(ApiResponse::success_with_message(
            ManifestResponse {
                route_id: id,
                path: path.display().to_string(),
                deliveries,
            },
            "Manifest generated successfully".to_string(),
        ))
    }
}
