//! Almacén en memoria
//!
//! Implementa el mismo contrato que `PgStore` sin base de datos. Aplica las
//! mismas claves foráneas, restricciones y actualizaciones condicionales que
//! el schema. Cada escritura trabaja sobre una copia de las tablas y solo la
//! publica si todos los pasos terminan bien.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Local;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    Beneficiary, BeneficiaryData, DashboardStats, Delivery, DeliveryData, DeliveryItemRecord,
    DeliveryRecord, DeliveryStatus, Item, ItemData, Page, PageRequest, RecentDelivery, Route,
    RouteData, RouteSummary,
};
use crate::repositories::filters::{BeneficiaryFilter, DeliveryFilter, ItemFilter, RouteFilter};
use crate::repositories::hydration::{group_routes, DeliveryRelations};
use crate::repositories::{BeneficiaryStore, DashboardStore, DeliveryStore, ItemStore, RouteStore};
use crate::utils::errors::{AppError, AppResult};

#[derive(Debug, Default, Clone)]
struct Tables {
    beneficiaries: HashMap<Uuid, Beneficiary>,
    items: HashMap<Uuid, Item>,
    deliveries: HashMap<Uuid, DeliveryRecord>,
    lines: HashMap<Uuid, Vec<DeliveryItemRecord>>,
    routes: HashMap<Uuid, RouteSummary>,
}

impl Tables {
    fn check_delivery_references(&self, data: &DeliveryData) -> AppResult<()> {
        if !self.beneficiaries.contains_key(&data.beneficiary_id) {
            return Err(foreign_key("entrega.beneficiario_id", data.beneficiary_id));
        }
        if let Some(route_id) = data.route_id {
            if !self.routes.contains_key(&route_id) {
                return Err(foreign_key("entrega.rota_id", route_id));
            }
        }

        let mut seen = HashSet::new();
        for line in &data.items {
            if !self.items.contains_key(&line.item_id) {
                return Err(foreign_key("entrega_item.item_id", line.item_id));
            }
            if line.quantity <= 0 {
                return Err(AppError::Storage(
                    "check constraint violated: entrega_item.quantidade > 0".to_string(),
                ));
            }
            if !seen.insert(line.item_id) {
                return Err(AppError::Storage(format!(
                    "duplicate key (entrega_id, item_id) for item {}",
                    line.item_id
                )));
            }
        }
        Ok(())
    }

    fn clear_members(&mut self, route_id: Uuid) -> usize {
        let mut cleared = 0;
        for record in self.deliveries.values_mut() {
            if record.route_id == Some(route_id) {
                record.route_id = None;
                cleared += 1;
            }
        }
        cleared
    }

    fn claim_members(&mut self, route_id: Uuid, delivery_ids: &[Uuid]) -> AppResult<()> {
        let wanted: HashSet<Uuid> = delivery_ids.iter().copied().collect();
        for id in wanted {
            match self.deliveries.get_mut(&id) {
                Some(record) if record.route_id.is_none() => record.route_id = Some(route_id),
                _ => {
                    return Err(AppError::Conflict(
                        "One or more deliveries do not exist or already belong to another route"
                            .to_string(),
                    ))
                }
            }
        }
        Ok(())
    }

    fn sorted_records(&self, filter: &DeliveryFilter) -> Vec<DeliveryRecord> {
        let mut records: Vec<DeliveryRecord> = self
            .deliveries
            .values()
            .filter(|record| {
                let name = self
                    .beneficiaries
                    .get(&record.beneficiary_id)
                    .map(|b| b.name.as_str())
                    .unwrap_or_default();
                filter.matches(record, name)
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| a.delivery_date.cmp(&b.delivery_date).then(a.id.cmp(&b.id)));
        records
    }

    fn hydrate(&self, records: Vec<DeliveryRecord>, attach_route: bool) -> AppResult<Vec<Delivery>> {
        let lines = records
            .iter()
            .flat_map(|r| self.lines.get(&r.id).cloned().unwrap_or_default())
            .collect();

        DeliveryRelations {
            beneficiaries: self.beneficiaries.clone(),
            items: self.items.clone(),
            lines,
            routes: attach_route.then(|| self.routes.clone()),
        }
        .hydrate(records)
    }

    fn routes_with_members(&self, summaries: Vec<RouteSummary>) -> AppResult<Vec<Route>> {
        let route_ids: HashSet<Uuid> = summaries.iter().map(|r| r.id).collect();
        let mut records: Vec<DeliveryRecord> = self
            .deliveries
            .values()
            .filter(|r| r.route_id.map_or(false, |id| route_ids.contains(&id)))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.delivery_date.cmp(&b.delivery_date).then(a.id.cmp(&b.id)));

        let members = self.hydrate(records, false)?;
        Ok(group_routes(summaries, members))
    }
}

fn foreign_key(column: &str, id: Uuid) -> AppError {
    AppError::Storage(format!("foreign key violation on {}: {} does not exist", column, id))
}

/// Almacén en memoria con semántica transaccional
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ejecuta `apply` sobre una copia de las tablas y la publica solo si no falla
    async fn transaction<T>(&self, apply: impl FnOnce(&mut Tables) -> AppResult<T>) -> AppResult<T> {
        let mut tables = self.tables.write().await;
        let mut working = tables.clone();
        let outcome = apply(&mut working)?;
        *tables = working;
        Ok(outcome)
    }
}

#[async_trait]
impl BeneficiaryStore for MemoryStore {
    async fn create_beneficiary(&self, data: &BeneficiaryData) -> AppResult<Beneficiary> {
        let beneficiary = Beneficiary::from_data(Uuid::new_v4(), data, Local::now().date_naive());
        self.transaction(|t| {
            t.beneficiaries.insert(beneficiary.id, beneficiary.clone());
            Ok(beneficiary)
        })
        .await
    }

    async fn update_beneficiary(&self, id: Uuid, data: &BeneficiaryData) -> AppResult<Option<Beneficiary>> {
        self.transaction(|t| {
            Ok(t.beneficiaries.get_mut(&id).map(|current| {
                *current = Beneficiary::from_data(id, data, current.enrolled_on);
                current.clone()
            }))
        })
        .await
    }

    async fn delete_beneficiary(&self, id: Uuid) -> AppResult<bool> {
        self.transaction(|t| {
            if t.deliveries.values().any(|d| d.beneficiary_id == id) {
                return Err(AppError::Conflict(
                    "Beneficiary is still referenced by existing deliveries".to_string(),
                ));
            }
            Ok(t.beneficiaries.remove(&id).is_some())
        })
        .await
    }

    async fn find_beneficiary(&self, id: Uuid) -> AppResult<Option<Beneficiary>> {
        Ok(self.tables.read().await.beneficiaries.get(&id).cloned())
    }

    async fn find_beneficiaries(
        &self,
        filter: &BeneficiaryFilter,
        page: PageRequest,
    ) -> AppResult<Page<Beneficiary>> {
        let tables = self.tables.read().await;
        let mut found: Vec<Beneficiary> = tables
            .beneficiaries
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(Page::slice(found, page))
    }

    async fn beneficiary_in_use(&self, id: Uuid) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.deliveries.values().any(|d| d.beneficiary_id == id))
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn create_item(&self, data: &ItemData) -> AppResult<Item> {
        let item = Item::from_data(Uuid::new_v4(), data);
        self.transaction(|t| {
            t.items.insert(item.id, item.clone());
            Ok(item)
        })
        .await
    }

    async fn update_item(&self, id: Uuid, data: &ItemData) -> AppResult<Option<Item>> {
        self.transaction(|t| {
            Ok(t.items.get_mut(&id).map(|current| {
                *current = Item::from_data(id, data);
                current.clone()
            }))
        })
        .await
    }

    async fn delete_item(&self, id: Uuid) -> AppResult<bool> {
        self.transaction(|t| {
            if t.lines.values().flatten().any(|line| line.item_id == id) {
                return Err(AppError::Conflict(
                    "Item is still referenced by existing deliveries".to_string(),
                ));
            }
            Ok(t.items.remove(&id).is_some())
        })
        .await
    }

    async fn find_item(&self, id: Uuid) -> AppResult<Option<Item>> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn find_items(&self, filter: &ItemFilter, page: PageRequest) -> AppResult<Page<Item>> {
        let tables = self.tables.read().await;
        let mut found: Vec<Item> = tables
            .items
            .values()
            .filter(|i| filter.matches(i))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(Page::slice(found, page))
    }

    async fn item_in_use(&self, id: Uuid) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.lines.values().flatten().any(|line| line.item_id == id))
    }
}

#[async_trait]
impl DeliveryStore for MemoryStore {
    async fn save_delivery(&self, id: Option<Uuid>, data: &DeliveryData) -> AppResult<Option<Uuid>> {
        self.transaction(|t| {
            let delivery_id = match id {
                None => Uuid::new_v4(),
                Some(existing) if t.deliveries.contains_key(&existing) => existing,
                Some(_) => return Ok(None),
            };

            t.deliveries.insert(delivery_id, data.to_record(delivery_id));
            t.lines.remove(&delivery_id);

            t.check_delivery_references(data)?;
            let lines = data
                .items
                .iter()
                .map(|line| DeliveryItemRecord {
                    delivery_id,
                    item_id: line.item_id,
                    quantity: line.quantity,
                })
                .collect();
            t.lines.insert(delivery_id, lines);

            Ok(Some(delivery_id))
        })
        .await
    }

    async fn delete_delivery(&self, id: Uuid) -> AppResult<bool> {
        self.transaction(|t| {
            t.lines.remove(&id);
            Ok(t.deliveries.remove(&id).is_some())
        })
        .await
    }

    async fn find_delivery(&self, id: Uuid) -> AppResult<Option<Delivery>> {
        let tables = self.tables.read().await;
        match tables.deliveries.get(&id) {
            Some(record) => Ok(tables.hydrate(vec![record.clone()], true)?.pop()),
            None => Ok(None),
        }
    }

    async fn find_deliveries(&self, filter: &DeliveryFilter, page: PageRequest) -> AppResult<Page<Delivery>> {
        let tables = self.tables.read().await;
        let records = Page::slice(tables.sorted_records(filter), page);
        let deliveries = tables.hydrate(records.data, filter.attaches_route())?;
        Ok(Page::new(deliveries, records.total, page))
    }
}

#[async_trait]
impl RouteStore for MemoryStore {
    async fn save_route(&self, id: Option<Uuid>, data: &RouteData) -> AppResult<Option<Uuid>> {
        self.transaction(|t| {
            let route_id = match id {
                None => Uuid::new_v4(),
                Some(existing) if t.routes.contains_key(&existing) => {
                    t.clear_members(existing);
                    existing
                }
                Some(_) => return Ok(None),
            };

            t.routes.insert(
                route_id,
                RouteSummary {
                    id: route_id,
                    name: data.name.clone(),
                    date: data.date,
                },
            );
            t.claim_members(route_id, &data.delivery_ids)?;

            Ok(Some(route_id))
        })
        .await
    }

    async fn delete_route(&self, id: Uuid) -> AppResult<bool> {
        self.transaction(|t| {
            t.clear_members(id);
            Ok(t.routes.remove(&id).is_some())
        })
        .await
    }

    async fn find_route(&self, id: Uuid) -> AppResult<Option<Route>> {
        let tables = self.tables.read().await;
        match tables.routes.get(&id) {
            Some(summary) => Ok(tables.routes_with_members(vec![summary.clone()])?.pop()),
            None => Ok(None),
        }
    }

    async fn find_routes(&self, filter: &RouteFilter, page: PageRequest) -> AppResult<Page<Route>> {
        let tables = self.tables.read().await;
        let mut summaries: Vec<RouteSummary> = tables
            .routes
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        summaries.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));

        let summaries = Page::slice(summaries, page);
        let routes = tables.routes_with_members(summaries.data)?;
        Ok(Page::new(routes, summaries.total, page))
    }

    async fn add_delivery_to_route(&self, route_id: Uuid, delivery_id: Uuid) -> AppResult<bool> {
        self.transaction(|t| {
            if !t.routes.contains_key(&route_id) {
                return Err(foreign_key("entrega.rota_id", route_id));
            }
            match t.deliveries.get_mut(&delivery_id) {
                Some(record) if record.route_id.is_none() && record.status == DeliveryStatus::Pending => {
                    record.route_id = Some(route_id);
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
        .await
    }

    async fn remove_delivery_from_route(&self, route_id: Uuid, delivery_id: Uuid) -> AppResult<bool> {
        self.transaction(|t| match t.deliveries.get_mut(&delivery_id) {
            Some(record) if record.route_id == Some(route_id) => {
                record.route_id = None;
                Ok(true)
            }
            _ => Ok(false),
        })
        .await
    }
}

#[async_trait]
impl DashboardStore for MemoryStore {
    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let tables = self.tables.read().await;

        let counts: Vec<(DeliveryStatus, i64)> = DeliveryStatus::ALL
            .iter()
            .map(|status| {
                let total = tables.deliveries.values().filter(|d| d.status == *status).count();
                (*status, total as i64)
            })
            .collect();

        let mut recent: Vec<&DeliveryRecord> = tables.deliveries.values().collect();
        recent.sort_by(|a, b| b.delivery_date.cmp(&a.delivery_date).then(a.id.cmp(&b.id)));

        let recent_deliveries = recent
            .into_iter()
            .take(DashboardStats::RECENT_LIMIT)
            .map(|record| RecentDelivery {
                id: record.id,
                beneficiary_name: tables
                    .beneficiaries
                    .get(&record.beneficiary_id)
                    .map(|b| b.name.clone())
                    .unwrap_or_default(),
                delivery_date: record.delivery_date,
                status: record.status,
            })
            .collect();

        Ok(DashboardStats {
            total_beneficiaries: tables.beneficiaries.len() as i64,
            total_deliveries: tables.deliveries.len() as i64,
            total_routes: tables.routes.len() as i64,
            deliveries_by_status: DashboardStats::fill_status_counts(&counts),
            recent_deliveries,
        })
    }
}
