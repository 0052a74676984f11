use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{DashboardStats, DeliveryStatus, RecentDelivery};
use crate::repositories::pg_store::{db_error, PgStore};
use crate::repositories::DashboardStore;
use crate::utils::errors::AppResult;

#[async_trait]
impl DashboardStore for PgStore {
    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let pool = self.pool();

        let (total_beneficiaries, total_deliveries, total_routes, by_status, recent) = futures::try_join!(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM beneficiario").fetch_one(pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entrega").fetch_one(pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rota").fetch_one(pool),
            sqlx::query_as::<_, (DeliveryStatus, i64)>(
                "SELECT status, COUNT(*) FROM entrega GROUP BY status"
            )
            .fetch_all(pool),
            sqlx::query_as::<_, (Uuid, String, NaiveDate, DeliveryStatus)>(
                r#"
                SELECT e.id, b.nome, e.data_entrega, e.status
                FROM entrega e
                INNER JOIN beneficiario b ON e.beneficiario_id = b.id
                ORDER BY e.data_entrega DESC, e.id
                LIMIT $1
                "#
            )
            .bind(DashboardStats::RECENT_LIMIT as i64)
            .fetch_all(pool),
        )
        .map_err(db_error("loading dashboard statistics"))?;

        Ok(DashboardStats {
            total_beneficiaries,
            total_deliveries,
            total_routes,
            deliveries_by_status: DashboardStats::fill_status_counts(&by_status),
            recent_deliveries: recent
                .into_iter()
                .map(|(id, beneficiary_name, delivery_date, status)| RecentDelivery {
                    id,
                    beneficiary_name,
                    delivery_date,
                    status,
                })
                .collect(),
        })
    }
}
