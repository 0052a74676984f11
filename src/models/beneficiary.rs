//! Modelo de Beneficiary
//!
//! Mapea a la tabla `beneficiario`. La fecha de inscripción la asigna
//! el almacén al crear el registro y no cambia después.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del beneficiario - mapea al ENUM beneficiary_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, Default)]
#[sqlx(type_name = "beneficiary_status", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeneficiaryStatus {
    #[default]
    Active,
    Inactive,
}

/// Beneficiary principal - mapea exactamente a la tabla beneficiario
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Beneficiary {
    pub id: Uuid,
    #[sqlx(rename = "nome")]
    pub name: String,
    #[sqlx(rename = "endereco")]
    pub address: String,
    #[sqlx(rename = "telefone")]
    pub phone: String,
    #[sqlx(rename = "descricao")]
    pub description: Option<String>,
    pub status: BeneficiaryStatus,
    #[sqlx(rename = "data_inscricao")]
    pub enrolled_on: NaiveDate,
}

/// Campos editables de un beneficiario, ya validados
#[derive(Debug, Clone, PartialEq)]
pub struct BeneficiaryData {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub description: Option<String>,
    pub status: BeneficiaryStatus,
}

impl Beneficiary {
    /// Construye el registro completo a partir de los datos validados
    pub fn from_data(id: Uuid, data: &BeneficiaryData, enrolled_on: NaiveDate) -> Self {
        Self {
            id,
            name: data.name.clone(),
            address: data.address.clone(),
            phone: data.phone.clone(),
            description: data.description.clone(),
            status: data.status,
            enrolled_on,
        }
    }
}
