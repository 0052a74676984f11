//! Modelo de Delivery
//!
//! Este módulo contiene las filas planas de `entrega` / `entrega_item`
//! y el agregado `Delivery` hidratado (beneficiario, ítems y resumen de ruta).
//!
//! La referencia `route_id` de la entrega es la única fuente de verdad de la
//! pertenencia a una ruta; la lista de entregas de una `Route` se deriva de ella.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use super::{Beneficiary, Item, RouteSummary};

/// Estado de la entrega - mapea al ENUM delivery_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "delivery_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Pending,
    InRoute,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub const ALL: [DeliveryStatus; 4] = [
        DeliveryStatus::Pending,
        DeliveryStatus::InRoute,
        DeliveryStatus::Delivered,
        DeliveryStatus::Cancelled,
    ];

    /// Etiqueta legible para documentos impresos
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::InRoute => "In route",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Cancelled => "Cancelled",
        }
    }
}

/// Fila de la tabla entrega, sin relaciones resueltas
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct DeliveryRecord {
    pub id: Uuid,
    #[sqlx(rename = "beneficiario_id")]
    pub beneficiary_id: Uuid,
    #[sqlx(rename = "data_entrega")]
    pub delivery_date: NaiveDate,
    pub status: DeliveryStatus,
    #[sqlx(rename = "descricao")]
    pub description: Option<String>,
    #[sqlx(rename = "rota_id")]
    pub route_id: Option<Uuid>,
}

/// Fila de la tabla entrega_item
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct DeliveryItemRecord {
    #[sqlx(rename = "entrega_id")]
    pub delivery_id: Uuid,
    pub item_id: Uuid,
    #[sqlx(rename = "quantidade")]
    pub quantity: i32,
}

/// Par (ítem, cantidad) tal como lo envía el llamador
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ItemQuantity {
    pub item_id: Uuid,
    pub quantity: i32,
}

/// Línea hidratada: el ítem completo con su cantidad
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryLine {
    pub item: Item,
    pub quantity: i32,
}

/// Agregado Delivery con sus relaciones hidratadas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delivery {
    pub id: Uuid,
    pub beneficiary: Beneficiary,
    pub delivery_date: NaiveDate,
    pub status: DeliveryStatus,
    pub description: Option<String>,
    pub route_id: Option<Uuid>,
    /// Solo se resuelve en consultas de entregas; dentro de una ruta queda en `None`
    pub route: Option<RouteSummary>,
    pub items: Vec<DeliveryLine>,
}

impl Delivery {
    pub fn is_pending(&self) -> bool {
        self.status == DeliveryStatus::Pending
    }

    pub fn belongs_to(&self, route_id: Uuid) -> bool {
        self.route_id == Some(route_id)
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|line| i64::from(line.quantity)).sum()
    }
}

/// Datos validados para guardar una entrega completa ("salvar")
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryData {
    pub beneficiary_id: Uuid,
    pub delivery_date: NaiveDate,
    pub status: DeliveryStatus,
    pub description: Option<String>,
    pub route_id: Option<Uuid>,
    pub items: Vec<ItemQuantity>,
}

impl DeliveryData {
    pub fn to_record(&self, id: Uuid) -> DeliveryRecord {
        DeliveryRecord {
            id,
            beneficiary_id: self.beneficiary_id,
            delivery_date: self.delivery_date,
            status: self.status,
            description: self.description.clone(),
            route_id: self.route_id,
        }
    }
}
