use uuid::Uuid;

use crate::dto::item_dto::{ItemSearchQuery, SaveItemRequest};
use crate::dto::ApiResponse;
use crate::models::{Item, Page};
use crate::repositories::{ItemFilter, SharedStore};
use crate::services::consistency_guard;
use crate::utils::errors::{not_found_error, validation_error, AppResult};
use crate::utils::validation::is_blank;

pub struct ItemController {
    store: SharedStore,
}

impl ItemController {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: SaveItemRequest) -> AppResult<ApiResponse<Item>> {
        let data = consistency_guard::item_data(request)?;
        let item = self.store.create_item(&data).await?;

        tracing::info!("✅ Item {} created", item.id);
        Ok(ApiResponse::success_with_message(item, "Item created successfully".to_string()))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Item> {
        self.store
            .find_item(id)
            .await?
            .ok_or_else(|| not_found_error("Item", &id.to_string()))
    }

    /// `name` busca por nombre (sensible a mayúsculas); `text` por nombre o
    /// descripción; sin ninguno lista todos
    pub async fn search(&self, query: ItemSearchQuery) -> AppResult<Page<Item>> {
        let page = query.page_request();
        let filter = match (query.name, query.text) {
            (Some(name), _) if !is_blank(Some(&name)) => ItemFilter::Name(name.trim().to_string()),
            (_, Some(text)) => {
                if is_blank(Some(&text)) {
                    return Err(validation_error("Search text cannot be blank"));
                }
                ItemFilter::Text(text.trim().to_string())
            }
            _ => ItemFilter::All,
        };
        self.store.find_items(&filter, page).await
    }

    pub async fn update(&self, id: Uuid, request: SaveItemRequest) -> AppResult<ApiResponse<Item>> {
        let data = consistency_guard::item_data(request)?;
        let item = self
            .store
            .update_item(id, &data)
            .await?
            .ok_or_else(|| not_found_error("Item", &id.to_string()))?;

        tracing::info!("✏️ Item {} updated", id);
        Ok(ApiResponse::success_with_message(item, "Item updated successfully".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        let in_use = self.store.item_in_use(id).await?;
        consistency_guard::check_deletable(in_use, "Item")?;

        if !self.store.delete_item(id).await? {
            return Err(not_found_error("Item", &id.to_string()));
        }

        tracing::info!("🗑️ Item {} deleted", id);
        Ok(ApiResponse::done("Item deleted successfully".to_string()))
    }
}
