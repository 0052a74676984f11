use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::PageRequest;

// Request para crear o actualizar una ruta.
// `delivery_ids` es la foto completa de miembros; si se omite al actualizar
// se conservan los miembros actuales.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveRouteRequest {
    #[validate(length(max = 150))]
    pub name: String,
    pub date: Option<NaiveDate>,
    #[validate(length(max = 500))]
    pub delivery_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteSearchQuery {
    pub date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl RouteSearchQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

// Resultado de generar el manifiesto de una ruta
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestResponse {
    pub route_id: Uuid,
    pub path: String,
    pub deliveries: usize,
}
