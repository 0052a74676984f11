mod common;

use std::collections::HashSet;

use chrono::Duration;
use uuid::Uuid;

use aid_logistics::dto::delivery_dto::{AssignRouteRequest, DeliverySearchQuery};
use aid_logistics::dto::route_dto::SaveRouteRequest;
use aid_logistics::models::{DeliveryStatus, ItemQuantity, PageRequest};
use aid_logistics::repositories::{DeliveryFilter, DeliveryStore};
use aid_logistics::services::ManifestExporter;
use aid_logistics::utils::errors::AppError;

use common::{delivery_request, memory_store, tomorrow, Controllers};

fn route_request(name: &str, delivery_ids: Option<Vec<Uuid>>) -> SaveRouteRequest {
    SaveRouteRequest {
        name: name.to_string(),
        date: Some(tomorrow()),
        delivery_ids,
    }
}

#[tokio::test]
async fn test_new_delivery_is_found_by_beneficiary_name() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;

    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 2, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();

    let found = c
        .deliveries
        .search(DeliverySearchQuery {
            text: Some("Maria".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(found.total, 1);
    assert_eq!(found.data[0].id, delivery.id);
    assert_eq!(found.data[0].beneficiary.name, "Maria");
    assert_eq!(found.data[0].items[0].item.name, "Rice bag");
    assert_eq!(found.data[0].items[0].quantity, 2);
}

#[tokio::test]
async fn test_only_pending_deliveries_join_a_route() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 2, DeliveryStatus::Delivered))
        .await
        .unwrap()
        .data
        .unwrap();
    let route = c.routes.create(route_request("North", None)).await.unwrap().data.unwrap();

    let refused = c.routes.add_delivery(route.id, delivery.id).await;
    assert!(matches!(refused, Err(AppError::Conflict(_))));

    c.deliveries
        .update(delivery.id, delivery_request(&maria, &rice, 2, DeliveryStatus::Pending))
        .await
        .unwrap();
    let route = c.routes.add_delivery(route.id, delivery.id).await.unwrap().data.unwrap();
    assert_eq!(route.delivery_ids(), vec![delivery.id]);

    let delivery = c.deliveries.get_by_id(delivery.id).await.unwrap();
    assert_eq!(delivery.route_id, Some(route.id));
    assert_eq!(delivery.route.map(|r| r.name), Some("North".to_string()));
}

#[tokio::test]
async fn test_assignment_never_targets_a_non_pending_delivery() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let route = c.routes.create(route_request("North", None)).await.unwrap().data.unwrap();

    let cancelled = c
        .deliveries
        .create(delivery_request(&maria, &rice, 1, DeliveryStatus::Cancelled))
        .await
        .unwrap()
        .data
        .unwrap();
    let result = c
        .deliveries
        .assign_route(cancelled.id, AssignRouteRequest { route_id: route.id })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let mut with_route = delivery_request(&maria, &rice, 1, DeliveryStatus::Delivered);
    with_route.route_id = Some(Some(route.id));
    assert!(matches!(c.deliveries.create(with_route).await, Err(AppError::Conflict(_))));

    let members = c.routes.deliveries(route.id).await.unwrap();
    assert!(members.is_empty());
}

#[tokio::test]
async fn test_assign_and_unassign_route() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 1, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();
    let north = c.routes.create(route_request("North", None)).await.unwrap().data.unwrap();
    let south = c.routes.create(route_request("South", None)).await.unwrap().data.unwrap();

    let assigned = c
        .deliveries
        .assign_route(delivery.id, AssignRouteRequest { route_id: north.id })
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(assigned.route_id, Some(north.id));
    assert_eq!(assigned.status, DeliveryStatus::Pending);

    let stolen = c
        .deliveries
        .assign_route(delivery.id, AssignRouteRequest { route_id: south.id })
        .await;
    assert!(matches!(stolen, Err(AppError::Conflict(_))));

    let detached = c.deliveries.unassign_route(delivery.id).await.unwrap().data.unwrap();
    assert_eq!(detached.route_id, None);
    assert!(matches!(
        c.deliveries.unassign_route(delivery.id).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_full_save_cannot_move_delivery_to_another_route() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 1, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();
    let north = c
        .routes
        .create(route_request("North", Some(vec![delivery.id])))
        .await
        .unwrap()
        .data
        .unwrap();
    let south = c.routes.create(route_request("South", None)).await.unwrap().data.unwrap();

    let mut moved = delivery_request(&maria, &rice, 1, DeliveryStatus::Pending);
    moved.route_id = Some(Some(south.id));
    let result = c.deliveries.update(delivery.id, moved).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    assert_eq!(c.deliveries.get_by_id(delivery.id).await.unwrap().route_id, Some(north.id));
    assert_eq!(c.routes.get_by_id(north.id).await.unwrap().delivery_ids(), vec![delivery.id]);
    assert!(c.routes.get_by_id(south.id).await.unwrap().deliveries.is_empty());
}

#[tokio::test]
async fn test_editing_items_keeps_the_delivery_on_its_route() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 1, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();
    let north = c
        .routes
        .create(route_request("North", Some(vec![delivery.id])))
        .await
        .unwrap()
        .data
        .unwrap();

    let updated = c
        .deliveries
        .update(delivery.id, delivery_request(&maria, &rice, 3, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(updated.items[0].quantity, 3);
    assert_eq!(updated.route_id, Some(north.id));

    let mut detach = delivery_request(&maria, &rice, 3, DeliveryStatus::Pending);
    detach.route_id = Some(None);
    let detached = c.deliveries.update(delivery.id, detach).await.unwrap().data.unwrap();
    assert_eq!(detached.route_id, None);
    assert!(c.routes.get_by_id(north.id).await.unwrap().deliveries.is_empty());
}

#[tokio::test]
async fn test_route_membership_matches_delivery_references() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;

    let mut ids = Vec::new();
    for _ in 0..4 {
        let delivery = c
            .deliveries
            .create(delivery_request(&maria, &rice, 1, DeliveryStatus::Pending))
            .await
            .unwrap()
            .data
            .unwrap();
        ids.push(delivery.id);
    }

    let route = c
        .routes
        .create(route_request("North", Some(vec![ids[0], ids[1], ids[2]])))
        .await
        .unwrap()
        .data
        .unwrap();

    // reemplaza la foto: sale ids[0], entra ids[3]
    let route = c
        .routes
        .update(route.id, route_request("North", Some(vec![ids[1], ids[2], ids[3]])))
        .await
        .unwrap()
        .data
        .unwrap();

    let membership: HashSet<Uuid> = route.delivery_ids().into_iter().collect();
    let referencing: HashSet<Uuid> = store
        .find_deliveries(&DeliveryFilter::All, PageRequest::new(None, Some(100)))
        .await
        .unwrap()
        .data
        .into_iter()
        .filter(|d| d.route_id == Some(route.id))
        .map(|d| d.id)
        .collect();
    let by_route: HashSet<Uuid> = c
        .routes
        .deliveries(route.id)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.id)
        .collect();

    assert_eq!(membership, referencing);
    assert_eq!(membership, by_route);
    assert_eq!(membership, HashSet::from([ids[1], ids[2], ids[3]]));
    assert_eq!(c.deliveries.get_by_id(ids[0]).await.unwrap().route_id, None);
}

#[tokio::test]
async fn test_route_snapshot_cannot_steal_members() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 1, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();
    let north = c
        .routes
        .create(route_request("North", Some(vec![delivery.id])))
        .await
        .unwrap()
        .data
        .unwrap();

    let result = c.routes.create(route_request("South", Some(vec![delivery.id]))).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(c.routes.get_by_id(north.id).await.unwrap().delivery_ids(), vec![delivery.id]);
}

#[tokio::test]
async fn test_empty_item_set_keeps_previous_items() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 3, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();

    let mut empty = delivery_request(&maria, &rice, 3, DeliveryStatus::Pending);
    empty.items.clear();
    assert!(matches!(
        c.deliveries.update(delivery.id, empty).await,
        Err(AppError::Validation(_))
    ));

    let stored = c.deliveries.get_by_id(delivery.id).await.unwrap();
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.items[0].quantity, 3);
}

#[tokio::test]
async fn test_update_replaces_item_set() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let beans = c.item("Beans").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 3, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();

    let mut request = delivery_request(&maria, &beans, 1, DeliveryStatus::Pending);
    request.items.push(ItemQuantity { item_id: rice.id, quantity: 5 });
    let updated = c.deliveries.update(delivery.id, request).await.unwrap().data.unwrap();

    let lines: Vec<(String, i32)> = updated
        .items
        .iter()
        .map(|line| (line.item.name.clone(), line.quantity))
        .collect();
    assert_eq!(lines, vec![("Beans".to_string(), 1), ("Rice bag".to_string(), 5)]);
}

#[tokio::test]
async fn test_deleting_a_route_detaches_its_deliveries() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 2, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();
    let route = c
        .routes
        .create(route_request("North", Some(vec![delivery.id])))
        .await
        .unwrap()
        .data
        .unwrap();

    c.routes.delete(route.id).await.unwrap();

    let delivery = c.deliveries.get_by_id(delivery.id).await.unwrap();
    assert_eq!(delivery.route_id, None);
    assert!(delivery.route.is_none());
    assert!(matches!(c.routes.get_by_id(route.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(c.routes.delete(route.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_removing_twice_is_a_conflict() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 2, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();
    let route = c
        .routes
        .create(route_request("North", Some(vec![delivery.id])))
        .await
        .unwrap()
        .data
        .unwrap();

    let route = c.routes.remove_delivery(route.id, delivery.id).await.unwrap().data.unwrap();
    assert!(route.deliveries.is_empty());

    let again = c.routes.remove_delivery(route.id, delivery.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_new_route_in_the_past_is_rejected() {
    let store = memory_store();
    let c = Controllers::new(&store);

    let request = SaveRouteRequest {
        name: "Yesterday".to_string(),
        date: Some(tomorrow() - Duration::days(2)),
        delivery_ids: None,
    };
    assert!(matches!(c.routes.create(request).await, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_referenced_beneficiary_and_item_cannot_be_deleted() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 2, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();

    assert!(matches!(c.beneficiaries.delete(maria.id).await, Err(AppError::Conflict(_))));
    assert!(matches!(c.items.delete(rice.id).await, Err(AppError::Conflict(_))));

    c.deliveries.delete(delivery.id).await.unwrap();
    c.items.delete(rice.id).await.unwrap();
    c.beneficiaries.delete(maria.id).await.unwrap();
    assert!(matches!(c.items.get_by_id(rice.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_unknown_ids_are_reported() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let missing = Uuid::new_v4();

    assert!(matches!(
        c.deliveries
            .update(missing, delivery_request(&maria, &rice, 1, DeliveryStatus::Pending))
            .await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(c.deliveries.delete(missing).await, Err(AppError::NotFound(_))));
    assert!(matches!(c.items.delete(missing).await, Err(AppError::NotFound(_))));

    let mut dangling = delivery_request(&maria, &rice, 1, DeliveryStatus::Pending);
    dangling.items[0].item_id = missing;
    assert!(matches!(c.deliveries.create(dangling).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_delivery_search_is_paged() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    for _ in 0..12 {
        c.deliveries
            .create(delivery_request(&maria, &rice, 1, DeliveryStatus::Pending))
            .await
            .unwrap();
    }

    let first = c.deliveries.search(DeliverySearchQuery::default()).await.unwrap();
    assert_eq!(first.total, 12);
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.total_pages, 2);
    assert!(first.has_next);

    let last = c
        .deliveries
        .search(DeliverySearchQuery {
            beneficiary_id: Some(maria.id),
            page: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(last.data.len(), 2);
    assert!(!last.has_next);
    assert!(last.has_previous);
}

#[tokio::test]
async fn test_blank_delivery_text_search_is_rejected() {
    let store = memory_store();
    let c = Controllers::new(&store);

    let result = c
        .deliveries
        .search(DeliverySearchQuery {
            text: Some("   ".to_string()),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_manifest_for_route() {
    let store = memory_store();
    let c = Controllers::new(&store);
    let maria = c.beneficiary("Maria").await;
    let rice = c.item("Rice bag").await;
    let delivery = c
        .deliveries
        .create(delivery_request(&maria, &rice, 2, DeliveryStatus::Pending))
        .await
        .unwrap()
        .data
        .unwrap();
    let empty = c.routes.create(route_request("Empty", None)).await.unwrap().data.unwrap();
    let route = c
        .routes
        .create(route_request("North", Some(vec![delivery.id])))
        .await
        .unwrap()
        .data
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let exporter = ManifestExporter::new(dir.path());

    assert!(matches!(
        c.routes.generate_manifest(empty.id, &exporter).await,
        Err(AppError::Conflict(_))
    ));

    let manifest = c.routes.generate_manifest(route.id, &exporter).await.unwrap().data.unwrap();
    assert_eq!(manifest.deliveries, 1);
    assert!(manifest.path.ends_with(&format!(
        "Route_{}_{}.pdf",
        route.id,
        route.date.format("%d%m%Y")
    )));
    assert!(std::fs::read(&manifest.path).unwrap().starts_with(b"%PDF"));
}
