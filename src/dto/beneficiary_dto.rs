use serde::Deserialize;
use validator::Validate;

use crate::models::{BeneficiaryStatus, PageRequest};

// Request para crear o actualizar un beneficiario
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveBeneficiaryRequest {
    #[validate(length(max = 150))]
    pub name: String,
    #[validate(length(max = 255))]
    pub address: String,
    #[validate(length(max = 30))]
    pub phone: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    /// Por defecto `ACTIVE`
    pub status: Option<BeneficiaryStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

// Query de búsqueda: /api/beneficiaries?text=..&in_description=true&status=ACTIVE&page=1&limit=10
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BeneficiarySearchQuery {
    pub text: Option<String>,
    #[serde(default)]
    pub in_description: bool,
    pub status: Option<BeneficiaryStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl BeneficiarySearchQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}
