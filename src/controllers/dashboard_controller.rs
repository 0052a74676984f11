use crate::models::DashboardStats;
use crate::repositories::SharedStore;
use crate::utils::errors::AppResult;

pub struct DashboardController {
    store: SharedStore,
}

impl DashboardController {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> AppResult<DashboardStats> {
        self.store.dashboard_stats().await
    }
}
