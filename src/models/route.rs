//! Modelo de Route
//!
//! Una ruta agrupa entregas pendientes para distribución conjunta.
//! No es dueña de sus entregas: la pertenencia es una vista derivada.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::Delivery;

/// Fila de la tabla rota; también es la referencia que cuelga de una entrega
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct RouteSummary {
    pub id: Uuid,
    #[sqlx(rename = "nome")]
    pub name: String,
    #[sqlx(rename = "data")]
    pub date: NaiveDate,
}

/// Route hidratada con sus entregas miembro
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Route {
    pub id: Uuid,
    pub name: String,
    pub date: NaiveDate,
    pub deliveries: Vec<Delivery>,
}

impl Route {
    pub fn from_summary(summary: RouteSummary, deliveries: Vec<Delivery>) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            date: summary.date,
            deliveries,
        }
    }

    pub fn delivery_ids(&self) -> Vec<Uuid> {
        self.deliveries.iter().map(|d| d.id).collect()
    }
}

/// Datos validados para guardar una ruta; `delivery_ids` es la foto completa
/// de la pertenencia deseada
#[derive(Debug, Clone, PartialEq)]
pub struct RouteData {
    pub name: String,
    pub date: NaiveDate,
    pub delivery_ids: Vec<Uuid>,
}
