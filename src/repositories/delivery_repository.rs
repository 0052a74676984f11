use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::models::{Delivery, DeliveryData, DeliveryRecord, ItemQuantity, Page, PageRequest};
use crate::repositories::filters::DeliveryFilter;
use crate::repositories::pg_store::{db_error, PgStore, DELIVERY_COLUMNS};
use crate::repositories::DeliveryStore;
use crate::utils::errors::AppResult;

/// Inserta todas las líneas de ítems de la entrega en un único INSERT
async fn insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    delivery_id: Uuid,
    items: &[ItemQuantity],
) -> AppResult<()> {
    if items.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::<Postgres>::new(
        "INSERT INTO entrega_item (entrega_id, item_id, quantidade) ",
    );
    qb.push_values(items, |mut row, line| {
        row.push_bind(delivery_id)
            .push_bind(line.item_id)
            .push_bind(line.quantity);
    });

    qb.build()
        .execute(&mut **tx)
        .await
        .map_err(db_error("inserting delivery items"))?;

    Ok(())
}

#[async_trait]
impl DeliveryStore for PgStore {
    async fn save_delivery(&self, id: Option<Uuid>, data: &DeliveryData) -> AppResult<Option<Uuid>> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_error("opening delivery transaction"))?;

        let delivery_id = match id {
            None => {
                let new_id = Uuid::new_v4();
                sqlx::query(
                    r#"
                    INSERT INTO entrega (id, beneficiario_id, data_entrega, status, descricao, rota_id)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(new_id)
                .bind(data.beneficiary_id)
                .bind(data.delivery_date)
                .bind(data.status)
                .bind(&data.description)
                .bind(data.route_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("inserting delivery"))?;
                new_id
            }
            Some(existing) => {
                let updated = sqlx::query(
                    r#"
                    UPDATE entrega
                    SET beneficiario_id = $2, data_entrega = $3, status = $4, descricao = $5, rota_id = $6
                    WHERE id = $1
                    "#,
                )
                .bind(existing)
                .bind(data.beneficiary_id)
                .bind(data.delivery_date)
                .bind(data.status)
                .bind(&data.description)
                .bind(data.route_id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("updating delivery"))?;

                if updated.rows_affected() == 0 {
                    return Ok(None);
                }

                sqlx::query("DELETE FROM entrega_item WHERE entrega_id = $1")
                    .bind(existing)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error("clearing delivery items"))?;
                existing
            }
        };

        insert_lines(&mut tx, delivery_id, &data.items).await?;

        tx.commit()
            .await
            .map_err(db_error("committing delivery"))?;

        log::info!("✅ Delivery {} saved with {} item line(s)", delivery_id, data.items.len());
        Ok(Some(delivery_id))
    }

    async fn delete_delivery(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_error("opening delivery transaction"))?;

        sqlx::query("DELETE FROM entrega_item WHERE entrega_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting delivery items"))?;

        let deleted = sqlx::query("DELETE FROM entrega WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting delivery"))?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit()
            .await
            .map_err(db_error("committing delivery deletion"))?;

        log::info!("🗑️ Delivery {} deleted", id);
        Ok(true)
    }

    async fn find_delivery(&self, id: Uuid) -> AppResult<Option<Delivery>> {
        let record = sqlx::query_as::<_, DeliveryRecord>(&format!(
            "SELECT {} FROM entrega e WHERE e.id = $1",
            DELIVERY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_error("finding delivery"))?;

        match record {
            Some(record) => Ok(self.hydrate_deliveries(vec![record], true).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_deliveries(&self, filter: &DeliveryFilter, page: PageRequest) -> AppResult<Page<Delivery>> {
        let total = self.count_deliveries(filter).await?;
        let records = self.delivery_records(filter, Some(page)).await?;
        let deliveries = self.hydrate_deliveries(records, filter.attaches_route()).await?;
        Ok(Page::new(deliveries, total, page))
    }
}
