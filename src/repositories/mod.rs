//! Almacén de entidades
//!
//! Contrato de persistencia para beneficiarios, ítems, entregas y rutas.
//! Las escrituras de varios pasos (`save_delivery`, `save_route`,
//! `delete_route`, `delete_delivery`) son atómicas: o se aplican completas
//! o no dejan rastro.
//!
//! Hay dos implementaciones: `PgStore` (PostgreSQL vía sqlx) y
//! `MemoryStore` (tablas en memoria, para pruebas y demos).

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Beneficiary, BeneficiaryData, DashboardStats, Delivery, DeliveryData, Item, ItemData, Page,
    PageRequest, Route, RouteData,
};
use crate::utils::errors::AppResult;

pub mod beneficiary_repository;
pub mod dashboard_repository;
pub mod delivery_repository;
pub mod filters;
pub mod hydration;
pub mod item_repository;
pub mod memory_store;
pub mod pg_store;
pub mod route_repository;

pub use filters::{BeneficiaryFilter, DeliveryFilter, ItemFilter, RouteFilter};
pub use memory_store::MemoryStore;
pub use pg_store::PgStore;

#[async_trait]
pub trait BeneficiaryStore: Send + Sync {
    /// Inserta y asigna identidad y fecha de inscripción (hoy)
    async fn create_beneficiary(&self, data: &BeneficiaryData) -> AppResult<Beneficiary>;
    /// `None` si no existe ningún beneficiario con ese id
    async fn update_beneficiary(&self, id: Uuid, data: &BeneficiaryData) -> AppResult<Option<Beneficiary>>;
    async fn delete_beneficiary(&self, id: Uuid) -> AppResult<bool>;
    async fn find_beneficiary(&self, id: Uuid) -> AppResult<Option<Beneficiary>>;
    async fn find_beneficiaries(
        &self,
        filter: &BeneficiaryFilter,
        page: PageRequest,
    ) -> AppResult<Page<Beneficiary>>;
    async fn beneficiary_in_use(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn create_item(&self, data: &ItemData) -> AppResult<Item>;
    async fn update_item(&self, id: Uuid, data: &ItemData) -> AppResult<Option<Item>>;
    async fn delete_item(&self, id: Uuid) -> AppResult<bool>;
    async fn find_item(&self, id: Uuid) -> AppResult<Option<Item>>;
    async fn find_items(&self, filter: &ItemFilter, page: PageRequest) -> AppResult<Page<Item>>;
    async fn item_in_use(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Inserta (`id = None`) o actualiza la fila y recrea todas sus líneas de ítems
    /// en una sola transacción. Devuelve `None` si se pidió actualizar un id inexistente.
    async fn save_delivery(&self, id: Option<Uuid>, data: &DeliveryData) -> AppResult<Option<Uuid>>;
    /// Borra las líneas de ítems y luego la entrega
    async fn delete_delivery(&self, id: Uuid) -> AppResult<bool>;
    async fn find_delivery(&self, id: Uuid) -> AppResult<Option<Delivery>>;
    async fn find_deliveries(&self, filter: &DeliveryFilter, page: PageRequest) -> AppResult<Page<Delivery>>;
}

#[async_trait]
pub trait RouteStore: Send + Sync {
    /// Inserta o actualiza la ruta; en actualización primero suelta a todos sus
    /// miembros actuales y luego reclama la foto `data.delivery_ids`.
    async fn save_route(&self, id: Option<Uuid>, data: &RouteData) -> AppResult<Option<Uuid>>;
    /// Suelta a los miembros y borra la ruta; nunca borra entregas
    async fn delete_route(&self, id: Uuid) -> AppResult<bool>;
    async fn find_route(&self, id: Uuid) -> AppResult<Option<Route>>;
    /// Página de rutas, de la más reciente a la más antigua
    async fn find_routes(&self, filter: &RouteFilter, page: PageRequest) -> AppResult<Page<Route>>;
    /// Reclama una entrega pendiente y libre; `false` si no se tocó ninguna fila
    async fn add_delivery_to_route(&self, route_id: Uuid, delivery_id: Uuid) -> AppResult<bool>;
    /// Suelta la entrega solo si apunta exactamente a esta ruta
    async fn remove_delivery_from_route(&self, route_id: Uuid, delivery_id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait DashboardStore: Send + Sync {
    async fn dashboard_stats(&self) -> AppResult<DashboardStats>;
}

/// Contrato completo que reciben los controladores
pub trait AidStore: BeneficiaryStore + ItemStore + DeliveryStore + RouteStore + DashboardStore {}

impl<T> AidStore for T where T: BeneficiaryStore + ItemStore + DeliveryStore + RouteStore + DashboardStore {}

pub type SharedStore = Arc<dyn AidStore>;
