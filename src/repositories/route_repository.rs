use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::models::{DeliveryRecord, DeliveryStatus, Page, PageRequest, Route, RouteData, RouteSummary};
use crate::repositories::filters::{DeliveryFilter, RouteFilter};
use crate::repositories::hydration;
use crate::repositories::pg_store::{db_error, push_page, PgStore, DELIVERY_COLUMNS, ROUTE_COLUMNS};
use crate::repositories::RouteStore;
use crate::utils::errors::{AppError, AppResult};

/// Suelta todas las entregas que apuntan a la ruta
async fn clear_members(tx: &mut Transaction<'_, Postgres>, route_id: Uuid) -> AppResult<u64> {
    let cleared = sqlx::query("UPDATE entrega SET rota_id = NULL WHERE rota_id = $1")
        .bind(route_id)
        .execute(&mut **tx)
        .await
        .map_err(db_error("clearing route members"))?;

    Ok(cleared.rows_affected())
}

/// Reclama la foto de entregas para la ruta. Solo toca entregas libres; si
/// alguna no existe o pertenece a otra ruta, la transacción entera se aborta.
async fn claim_members(
    tx: &mut Transaction<'_, Postgres>,
    route_id: Uuid,
    delivery_ids: &[Uuid],
) -> AppResult<()> {
    let wanted: HashSet<Uuid> = delivery_ids.iter().copied().collect();
    if wanted.is_empty() {
        return Ok(());
    }
    let wanted: Vec<Uuid> = wanted.into_iter().collect();

    let claimed = sqlx::query(
        "UPDATE entrega SET rota_id = $1 WHERE id = ANY($2) AND rota_id IS NULL",
    )
    .bind(route_id)
    .bind(wanted.as_slice())
    .execute(&mut **tx)
    .await
    .map_err(db_error("assigning route members"))?;

    if claimed.rows_affected() != wanted.len() as u64 {
        log::warn!(
            "⚠️ Route {}: claimed {} of {} deliveries, rolling back",
            route_id,
            claimed.rows_affected(),
            wanted.len()
        );
        return Err(AppError::Conflict(
            "One or more deliveries do not exist or already belong to another route".to_string(),
        ));
    }

    Ok(())
}

#[async_trait]
impl RouteStore for PgStore {
    async fn save_route(&self, id: Option<Uuid>, data: &RouteData) -> AppResult<Option<Uuid>> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_error("opening route transaction"))?;

        let route_id = match id {
            None => {
                let new_id = Uuid::new_v4();
                sqlx::query("INSERT INTO rota (id, nome, data) VALUES ($1, $2, $3)")
                    .bind(new_id)
                    .bind(&data.name)
                    .bind(data.date)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error("inserting route"))?;
                new_id
            }
            Some(existing) => {
                let updated = sqlx::query("UPDATE rota SET nome = $2, data = $3 WHERE id = $1")
                    .bind(existing)
                    .bind(&data.name)
                    .bind(data.date)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error("updating route"))?;

                if updated.rows_affected() == 0 {
                    return Ok(None);
                }

                clear_members(&mut tx, existing).await?;
                existing
            }
        };

        claim_members(&mut tx, route_id, &data.delivery_ids).await?;

        tx.commit()
            .await
            .map_err(db_error("committing route"))?;

        log::info!("✅ Route {} saved with {} delivery(ies)", route_id, data.delivery_ids.len());
        Ok(Some(route_id))
    }

    async fn delete_route(&self, id: Uuid) -> AppResult<bool> {
        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(db_error("opening route transaction"))?;

        let detached = clear_members(&mut tx, id).await?;

        let deleted = sqlx::query("DELETE FROM rota WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("deleting route"))?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        tx.commit()
            .await
            .map_err(db_error("committing route deletion"))?;

        log::info!("🗑️ Route {} deleted, {} delivery(ies) detached", id, detached);
        Ok(true)
    }

    async fn find_route(&self, id: Uuid) -> AppResult<Option<Route>> {
        let summary = sqlx::query_as::<_, RouteSummary>(&format!(
            "SELECT {} FROM rota WHERE id = $1",
            ROUTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(db_error("finding route"))?;

        let Some(summary) = summary else {
            return Ok(None);
        };

        let records = self.delivery_records(&DeliveryFilter::Route(summary.id), None).await?;
        let members = self.hydrate_deliveries(records, false).await?;
        Ok(Some(Route::from_summary(summary, members)))
    }

    async fn find_routes(&self, filter: &RouteFilter, page: PageRequest) -> AppResult<Page<Route>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM rota");
        filter.push_predicates(&mut count);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(db_error("counting routes"))?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM rota", ROUTE_COLUMNS));
        filter.push_predicates(&mut qb);
        qb.push(" ORDER BY data DESC, id");
        push_page(&mut qb, page);

        let summaries = qb
            .build_query_as::<RouteSummary>()
            .fetch_all(self.pool())
            .await
            .map_err(db_error("listing routes"))?;

        if summaries.is_empty() {
            return Ok(Page::new(Vec::new(), total, page));
        }

        let route_ids: Vec<Uuid> = summaries.iter().map(|r| r.id).collect();
        let records = sqlx::query_as::<_, DeliveryRecord>(&format!(
            "SELECT {} FROM entrega e WHERE e.rota_id = ANY($1) ORDER BY e.data_entrega, e.id",
            DELIVERY_COLUMNS
        ))
        .bind(route_ids.as_slice())
        .fetch_all(self.pool())
        .await
        .map_err(db_error("loading route members"))?;

        let members = self.hydrate_deliveries(records, false).await?;
        Ok(Page::new(hydration::group_routes(summaries, members), total, page))
    }

    async fn add_delivery_to_route(&self, route_id: Uuid, delivery_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE entrega SET rota_id = $1 WHERE id = $2 AND rota_id IS NULL AND status = $3",
        )
        .bind(route_id)
        .bind(delivery_id)
        .bind(DeliveryStatus::Pending)
        .execute(self.pool())
        .await
        .map_err(db_error("adding delivery to route"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_delivery_from_route(&self, route_id: Uuid, delivery_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("UPDATE entrega SET rota_id = NULL WHERE id = $1 AND rota_id = $2")
            .bind(delivery_id)
            .bind(route_id)
            .execute(self.pool())
            .await
            .map_err(db_error("removing delivery from route"))?;

        Ok(result.rows_affected() == 1)
    }
}
