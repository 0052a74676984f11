use serde::Deserialize;
use validator::Validate;

use crate::models::PageRequest;

// Request para crear o actualizar un ítem
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveItemRequest {
    #[validate(length(max = 150))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

// Query de búsqueda: `name` (sensible a mayúsculas) tiene prioridad sobre `text`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemSearchQuery {
    pub name: Option<String>,
    pub text: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ItemSearchQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }
}
