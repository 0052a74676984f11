//! Hidratación de agregados
//!
//! Resuelve las claves foráneas de filas planas en objetos completos.
//! Ambos almacenes cargan las relaciones en lote y delegan aquí el ensamblado.

use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{
    Beneficiary, Delivery, DeliveryItemRecord, DeliveryLine, DeliveryRecord, Item, Route,
    RouteSummary,
};
use crate::utils::errors::{AppError, AppResult};

/// Relaciones ya cargadas para un conjunto de entregas
#[derive(Debug, Default)]
pub struct DeliveryRelations {
    pub beneficiaries: HashMap<Uuid, Beneficiary>,
    pub items: HashMap<Uuid, Item>,
    pub lines: Vec<DeliveryItemRecord>,
    /// `None` cuando la referencia a la ruta no debe adjuntarse
    pub routes: Option<HashMap<Uuid, RouteSummary>>,
}

impl DeliveryRelations {
    pub fn hydrate(&self, records: Vec<DeliveryRecord>) -> AppResult<Vec<Delivery>> {
        let mut lines_by_delivery: HashMap<Uuid, Vec<&DeliveryItemRecord>> = HashMap::new();
        for line in &self.lines {
            lines_by_delivery.entry(line.delivery_id).or_default().push(line);
        }

        records
            .into_iter()
            .map(|record| {
                let beneficiary = self
                    .beneficiaries
                    .get(&record.beneficiary_id)
                    .cloned()
                    .ok_or_else(|| {
                        AppError::Storage(format!(
                            "delivery {} references missing beneficiary {}",
                            record.id, record.beneficiary_id
                        ))
                    })?;

                let mut items = lines_by_delivery
                    .get(&record.id)
                    .map(|lines| {
                        lines
                            .iter()
                            .map(|line| {
                                self.items
                                    .get(&line.item_id)
                                    .cloned()
                                    .map(|item| DeliveryLine {
                                        item,
                                        quantity: line.quantity,
                                    })
                                    .ok_or_else(|| {
                                        AppError::Storage(format!(
                                            "delivery {} references missing item {}",
                                            record.id, line.item_id
                                        ))
                                    })
                            })
                            .collect::<AppResult<Vec<_>>>()
                    })
                    .transpose()?
                    .unwrap_or_default();
                items.sort_by(|a, b| a.item.name.cmp(&b.item.name).then(a.item.id.cmp(&b.item.id)));

                let route = match (&self.routes, record.route_id) {
                    (Some(routes), Some(route_id)) => routes.get(&route_id).cloned(),
                    _ => None,
                };

                Ok(Delivery {
                    id: record.id,
                    beneficiary,
                    delivery_date: record.delivery_date,
                    status: record.status,
                    description: record.description,
                    route_id: record.route_id,
                    route,
                    items,
                })
            })
            .collect()
    }
}

/// Identificadores que hay que cargar para hidratar un lote de entregas
pub fn beneficiary_ids(records: &[DeliveryRecord]) -> Vec<Uuid> {
    dedup(records.iter().map(|r| r.beneficiary_id))
}

pub fn route_ids(records: &[DeliveryRecord]) -> Vec<Uuid> {
    dedup(records.iter().filter_map(|r| r.route_id))
}

pub fn item_ids(lines: &[DeliveryItemRecord]) -> Vec<Uuid> {
    dedup(lines.iter().map(|l| l.item_id))
}

fn dedup(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort();
    ids.dedup();
    ids
}

/// Reparte entregas ya hidratadas entre sus rutas, conservando el orden de `summaries`
pub fn group_routes(summaries: Vec<RouteSummary>, deliveries: Vec<Delivery>) -> Vec<Route> {
    let mut by_route: HashMap<Uuid, Vec<Delivery>> = HashMap::new();
    for delivery in deliveries {
        if let Some(route_id) = delivery.route_id {
            by_route.entry(route_id).or_default().push(delivery);
        }
    }

    summaries
        .into_iter()
        .map(|summary| {
            let members = by_route.remove(&summary.id).unwrap_or_default();
            Route::from_summary(summary, members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BeneficiaryStatus, DeliveryStatus};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn fixture() -> (DeliveryRelations, DeliveryRecord, RouteSummary) {
        let beneficiary = Beneficiary {
            id: Uuid::new_v4(),
            name: "Maria".to_string(),
            address: "Rua A, 10".to_string(),
            phone: "1111-2222".to_string(),
            description: None,
            status: BeneficiaryStatus::Active,
            enrolled_on: date(),
        };
        let rice = Item {
            id: Uuid::new_v4(),
            name: "Rice bag".to_string(),
            description: None,
        };
        let beans = Item {
            id: Uuid::new_v4(),
            name: "Beans".to_string(),
            description: None,
        };
        let route = RouteSummary {
            id: Uuid::new_v4(),
            name: "North".to_string(),
            date: date(),
        };
        let record = DeliveryRecord {
            id: Uuid::new_v4(),
            beneficiary_id: beneficiary.id,
            delivery_date: date(),
            status: DeliveryStatus::Pending,
            description: None,
            route_id: Some(route.id),
        };
        let relations = DeliveryRelations {
            beneficiaries: HashMap::from([(beneficiary.id, beneficiary)]),
            items: HashMap::from([(rice.id, rice.clone()), (beans.id, beans.clone())]),
            lines: vec![
                DeliveryItemRecord { delivery_id: record.id, item_id: rice.id, quantity: 2 },
                DeliveryItemRecord { delivery_id: record.id, item_id: beans.id, quantity: 1 },
            ],
            routes: Some(HashMap::from([(route.id, route.clone())])),
        };
        (relations, record, route)
    }

    #[test]
    fn test_hydrate_resolves_beneficiary_items_and_route() {
        let (relations, record, route) = fixture();
        let deliveries = relations.hydrate(vec![record]).unwrap();

        assert_eq!(deliveries.len(), 1);
        let delivery = &deliveries[0];
        assert_eq!(delivery.beneficiary.name, "Maria");
        assert_eq!(delivery.items.len(), 2);
        assert_eq!(delivery.items[0].item.name, "Beans");
        assert_eq!(delivery.total_quantity(), 3);
        assert_eq!(delivery.route.as_ref(), Some(&route));
    }

    #[test]
    fn test_hydrate_without_routes_keeps_only_the_reference() {
        let (mut relations, record, route) = fixture();
        relations.routes = None;
        let deliveries = relations.hydrate(vec![record]).unwrap();

        assert_eq!(deliveries[0].route_id, Some(route.id));
        assert!(deliveries[0].route.is_none());
    }

    #[test]
    fn test_hydrate_reports_dangling_beneficiary() {
        let (mut relations, record, _) = fixture();
        relations.beneficiaries.clear();
        assert!(matches!(relations.hydrate(vec![record]), Err(AppError::Storage(_))));
    }

    #[test]
    fn test_group_routes_keeps_empty_routes() {
        let (mut relations, record, route) = fixture();
        relations.routes = None;
        let deliveries = relations.hydrate(vec![record]).unwrap();
        let empty = RouteSummary {
            id: Uuid::new_v4(),
            name: "South".to_string(),
            date: date(),
        };

        let routes = group_routes(vec![route, empty], deliveries);
        assert_eq!(routes[0].deliveries.len(), 1);
        assert!(routes[1].deliveries.is_empty());
    }
}
