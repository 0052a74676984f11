#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};

use aid_logistics::config::{EnvironmentConfig, StoreBackend};
use aid_logistics::controllers::beneficiary_controller::BeneficiaryController;
use aid_logistics::controllers::delivery_controller::DeliveryController;
use aid_logistics::controllers::item_controller::ItemController;
use aid_logistics::controllers::route_controller::RouteController;
use aid_logistics::dto::beneficiary_dto::SaveBeneficiaryRequest;
use aid_logistics::dto::delivery_dto::SaveDeliveryRequest;
use aid_logistics::dto::item_dto::SaveItemRequest;
use aid_logistics::models::{Beneficiary, DeliveryStatus, Item, ItemQuantity};
use aid_logistics::repositories::{MemoryStore, SharedStore};
use aid_logistics::state::AppState;

pub fn tomorrow() -> NaiveDate {
    Local::now().date_naive() + Duration::days(1)
}

pub fn memory_store() -> SharedStore {
    Arc::new(MemoryStore::new())
}

pub fn test_config(manifest_dir: &Path) -> EnvironmentConfig {
    EnvironmentConfig {
        manifest_dir: manifest_dir.to_path_buf(),
        store_backend: StoreBackend::Memory,
        ..EnvironmentConfig::default()
    }
}

pub fn test_state(store: SharedStore, manifest_dir: &Path) -> AppState {
    AppState::new(store, test_config(manifest_dir))
}

pub struct Controllers {
    pub beneficiaries: BeneficiaryController,
    pub items: ItemController,
    pub deliveries: DeliveryController,
    pub routes: RouteController,
}

impl Controllers {
    pub fn new(store: &SharedStore) -> Self {
        Self {
            beneficiaries: BeneficiaryController::new(store.clone()),
            items: ItemController::new(store.clone()),
            deliveries: DeliveryController::new(store.clone()),
            routes: RouteController::new(store.clone()),
        }
    }

    pub async fn beneficiary(&self, name: &str) -> Beneficiary {
        self.beneficiaries
            .create(SaveBeneficiaryRequest {
                name: name.to_string(),
                address: "Rua A, 10".to_string(),
                phone: "1111-2222".to_string(),
                description: None,
                status: None,
                page: None,
                limit: None,
            })
            .await
            .unwrap()
            .data
            .unwrap()
    }

    pub async fn item(&self, name: &str) -> Item {
        self.items
            .create(SaveItemRequest {
                name: name.to_string(),
                description: None,
            })
            .await
            .unwrap()
            .data
            .unwrap()
    }
}

pub fn delivery_request(
    beneficiary: &Beneficiary,
    item: &Item,
    quantity: i32,
    status: DeliveryStatus,
) -> SaveDeliveryRequest {
    SaveDeliveryRequest {
        beneficiary_id: Some(beneficiary.id),
        delivery_date: Some(tomorrow()),
        status: Some(status),
        description: Some("Cesta básica".to_string()),
        route_id: None,
        items: vec![ItemQuantity {
            item_id: item.id,
            quantity,
        }],
    }
}
