use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

use crate::models::{DeliveryStatus, ItemQuantity, PageRequest};

// Request para guardar una entrega completa. Los campos obligatorios son
// `Option` para que la ausencia se reporte como error de validación legible.
// `route_id` ausente conserva la ruta actual; `null` explícito la suelta.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveDeliveryRequest {
    pub beneficiary_id: Option<Uuid>,
    pub delivery_date: Option<NaiveDate>,
    pub status: Option<DeliveryStatus>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub route_id: Option<Option<Uuid>>,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub items: Vec<ItemQuantity>,
}

// Query de búsqueda; se aplica el primer filtro presente
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliverySearchQuery {
    pub beneficiary_id: Option<Uuid>,
    pub status: Option<DeliveryStatus>,
    pub date: Option<NaiveDate>,
    pub route_id: Option<Uuid>,
    pub text: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl DeliverySearchQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}

// Body de POST /api/deliveries/:id/route
#[derive(Debug, Clone, Deserialize)]
pub struct AssignRouteRequest {
    pub route_id: Uuid,
}

/// Campo presente en el JSON, aunque sea `null`
fn present<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> SaveDeliveryRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_route_id_distinguishes_missing_from_null() {
        let route = Uuid::new_v4();

        assert_eq!(request(json!({})).route_id, None);
        assert_eq!(request(json!({ "route_id": null })).route_id, Some(None));
        assert_eq!(request(json!({ "route_id": route })).route_id, Some(Some(route)));
    }
}
