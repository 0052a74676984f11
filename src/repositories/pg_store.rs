//! Almacén PostgreSQL
//!
//! Cada escritura de varios pasos abre su propia transacción con
//! `pool.begin()`; si la función sale antes del `commit()` la transacción
//! se descarta y PostgreSQL hace rollback. Las lecturas van directo al pool.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{
    Beneficiary, Delivery, DeliveryItemRecord, DeliveryRecord, Item, PageRequest, RouteSummary,
};
use crate::repositories::filters::DeliveryFilter;
use crate::repositories::hydration::{self, DeliveryRelations};
use crate::utils::errors::{AppError, AppResult};

pub(crate) const BENEFICIARY_COLUMNS: &str =
    "id, nome, endereco, telefone, descricao, status, data_inscricao";
pub(crate) const ITEM_COLUMNS: &str = "id, nome, descricao";
pub(crate) const ROUTE_COLUMNS: &str = "id, nome, data";
pub(crate) const DELIVERY_COLUMNS: &str =
    "e.id, e.beneficiario_id, e.data_entrega, e.status, e.descricao, e.rota_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Ejecuta un filtro de entregas y devuelve las filas planas; sin página las trae todas
    pub(crate) async fn delivery_records(
        &self,
        filter: &DeliveryFilter,
        page: Option<PageRequest>,
    ) -> AppResult<Vec<DeliveryRecord>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {}", DELIVERY_COLUMNS));
        filter.push_from_where(&mut qb);
        qb.push(" ORDER BY e.data_entrega, e.id");
        if let Some(page) = page {
            push_page(&mut qb, page);
        }

        qb.build_query_as::<DeliveryRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("querying deliveries"))
    }

    /// Hidrata entregas cargando cada relación en una sola consulta
    pub(crate) async fn hydrate_deliveries(
        &self,
        records: Vec<DeliveryRecord>,
        attach_route: bool,
    ) -> AppResult<Vec<Delivery>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let delivery_ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();

        let beneficiaries = sqlx::query_as::<_, Beneficiary>(&format!(
            "SELECT {} FROM beneficiario WHERE id = ANY($1)",
            BENEFICIARY_COLUMNS
        ))
        .bind(hydration::beneficiary_ids(&records))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("loading beneficiaries"))?;

        let lines = sqlx::query_as::<_, DeliveryItemRecord>(
            "SELECT entrega_id, item_id, quantidade FROM entrega_item WHERE entrega_id = ANY($1)",
        )
        .bind(delivery_ids.as_slice())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("loading delivery items"))?;

        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM item WHERE id = ANY($1)",
            ITEM_COLUMNS
        ))
        .bind(hydration::item_ids(&lines))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("loading items"))?;

        let routes = if attach_route {
            let summaries = self.route_summaries(&hydration::route_ids(&records)).await?;
            Some(summaries.into_iter().map(|r| (r.id, r)).collect::<HashMap<_, _>>())
        } else {
            None
        };

        DeliveryRelations {
            beneficiaries: beneficiaries.into_iter().map(|b| (b.id, b)).collect(),
            items: items.into_iter().map(|i| (i.id, i)).collect(),
            lines,
            routes,
        }
        .hydrate(records)
    }

    pub(crate) async fn count_deliveries(&self, filter: &DeliveryFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        filter.push_from_where(&mut qb);

        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("counting deliveries"))
    }

    pub(crate) async fn route_summaries(&self, ids: &[Uuid]) -> AppResult<Vec<RouteSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, RouteSummary>(&format!(
            "SELECT {} FROM rota WHERE id = ANY($1)",
            ROUTE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("loading routes"))
    }
}

/// `LIMIT`/`OFFSET` parametrizados al final de la consulta
pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    qb.push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

/// Registra el error de base de datos con contexto y lo envuelve
pub(crate) fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        log::error!("❌ Database error while {}: {}", action, e);
        AppError::Database(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_is_appended_as_bound_parameters() {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {}", DELIVERY_COLUMNS));
        DeliveryFilter::Route(Uuid::new_v4()).push_from_where(&mut qb);
        push_page(&mut qb, PageRequest::new(Some(3), Some(20)));

        assert!(qb.sql().ends_with("WHERE e.rota_id = $1 LIMIT $2 OFFSET $3"));
    }
}
