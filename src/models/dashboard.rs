//! Estadísticas del panel principal

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::DeliveryStatus;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusCount {
    pub status: DeliveryStatus,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecentDelivery {
    pub id: Uuid,
    pub beneficiary_name: String,
    pub delivery_date: NaiveDate,
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_beneficiaries: i64,
    pub total_deliveries: i64,
    pub total_routes: i64,
    pub deliveries_by_status: Vec<StatusCount>,
    pub recent_deliveries: Vec<RecentDelivery>,
}

impl DashboardStats {
    /// Número de entregas recientes que se muestran
    pub const RECENT_LIMIT: usize = 5;

    /// Completa con cero los estados que no aparecen en el conteo
    pub fn fill_status_counts(counts: &[(DeliveryStatus, i64)]) -> Vec<StatusCount> {
        DeliveryStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                total: counts
                    .iter()
                    .find(|(s, _)| s == status)
                    .map(|(_, total)| *total)
                    .unwrap_or(0),
            })
            .collect()
    }
}
