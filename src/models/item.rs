//! Modelo de Item (artículo donado)

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Item {
    pub id: Uuid,
    #[sqlx(rename = "nome")]
    pub name: String,
    #[sqlx(rename = "descricao")]
    pub description: Option<String>,
}

/// Campos editables de un ítem, ya validados
#[derive(Debug, Clone, PartialEq)]
pub struct ItemData {
    pub name: String,
    pub description: Option<String>,
}

impl Item {
    pub fn from_data(id: Uuid, data: &ItemData) -> Self {
        Self {
            id,
            name: data.name.clone(),
            description: data.description.clone(),
        }
    }
}
