use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Item, ItemData, Page, PageRequest};
use crate::repositories::filters::ItemFilter;
use crate::repositories::pg_store::{db_error, push_page, PgStore, ITEM_COLUMNS};
use crate::repositories::ItemStore;
use crate::utils::errors::{AppError, AppResult};

#[async_trait]
impl ItemStore for PgStore {
    async fn create_item(&self, data: &ItemData) -> AppResult<Item> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO item (id, nome, descricao) VALUES ($1, $2, $3) RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(self.pool())
        .await
        .map_err(db_error("creating item"))?;

        log::info!("✅ Item {} created", item.id);
        Ok(item)
    }

    async fn update_item(&self, id: Uuid, data: &ItemData) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>(&format!(
            "UPDATE item SET nome = $2, descricao = $3 WHERE id = $1 RETURNING {}",
            ITEM_COLUMNS
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(self.pool())
        .await
        .map_err(db_error("updating item"))
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM item WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| AppError::from_delete(e, "Item"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_item(&self, id: Uuid) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>(&format!("SELECT {} FROM item WHERE id = $1", ITEM_COLUMNS))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(db_error("finding item"))
    }

    async fn find_items(&self, filter: &ItemFilter, page: PageRequest) -> AppResult<Page<Item>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM item");
        filter.push_predicates(&mut count);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(db_error("counting items"))?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM item", ITEM_COLUMNS));
        filter.push_predicates(&mut qb);
        qb.push(" ORDER BY nome, id");
        push_page(&mut qb, page);

        let items = qb
            .build_query_as::<Item>()
            .fetch_all(self.pool())
            .await
            .map_err(db_error("searching items"))?;

        Ok(Page::new(items, total, page))
    }

    async fn item_in_use(&self, id: Uuid) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM entrega_item WHERE item_id = $1)")
                .bind(id)
                .fetch_one(self.pool())
                .await
                .map_err(db_error("checking item references"))?;

        Ok(result.0)
    }
}
