//! Guardia de consistencia relacional
//!
//! Reglas que se comprueban antes de que cualquier escritura llegue al
//! almacén. Las funciones son puras: reciben el request y, cuando hace
//! falta, el estado ya leído (entregas, rutas, fecha de hoy) y devuelven
//! los datos validados o el error. Nunca tocan el almacén.

use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::dto::beneficiary_dto::SaveBeneficiaryRequest;
use crate::dto::delivery_dto::SaveDeliveryRequest;
use crate::dto::item_dto::SaveItemRequest;
use crate::dto::route_dto::SaveRouteRequest;
use crate::models::{
    BeneficiaryData, Delivery, DeliveryData, DeliveryStatus, ItemData, Route, RouteData,
};
use crate::utils::errors::{conflict_error, validation_error, AppError, AppResult};
use crate::utils::validation::{normalize_optional, validate_not_blank, validate_positive};

fn required_text(value: String, message: &str) -> AppResult<String> {
    validate_not_blank(&value).map_err(|_| validation_error(message))?;
    Ok(value.trim().to_string())
}

/// Beneficiario: nombre, dirección y teléfono obligatorios
pub fn beneficiary_data(request: SaveBeneficiaryRequest) -> AppResult<BeneficiaryData> {
    request.validate()?;

    Ok(BeneficiaryData {
        name: required_text(request.name, "Beneficiary name is required")?,
        address: required_text(request.address, "Beneficiary address is required")?,
        phone: required_text(request.phone, "Beneficiary phone is required")?,
        description: normalize_optional(request.description),
        status: request.status.unwrap_or_default(),
    })
}

/// Ítem: nombre obligatorio
pub fn item_data(request: SaveItemRequest) -> AppResult<ItemData> {
    request.validate()?;

    Ok(ItemData {
        name: required_text(request.name, "Item name is required")?,
        description: normalize_optional(request.description),
    })
}

/// Entrega: beneficiario, fecha, estado y al menos un ítem con cantidad positiva.
///
/// No consulta el almacén; las referencias colgantes las rechaza la
/// transacción de escritura. `current` es la entrega ya guardada: si el
/// request omite `route_id` se conserva su ruta.
pub fn delivery_data(
    request: SaveDeliveryRequest,
    current: Option<&Delivery>,
) -> AppResult<DeliveryData> {
    request.validate()?;

    let beneficiary_id = request
        .beneficiary_id
        .ok_or_else(|| validation_error("Delivery beneficiary is required"))?;
    let delivery_date = request
        .delivery_date
        .ok_or_else(|| validation_error("Delivery date is required"))?;
    let status = request
        .status
        .ok_or_else(|| validation_error("Delivery status is required"))?;

    if request.items.is_empty() {
        return Err(validation_error("A delivery needs at least one item"));
    }

    let mut seen = HashSet::new();
    for line in &request.items {
        validate_positive(line.quantity)
            .map_err(|_| validation_error("Item quantities must be greater than zero"))?;
        if !seen.insert(line.item_id) {
            return Err(AppError::Validation(format!(
                "Item {} is listed more than once",
                line.item_id
            )));
        }
    }

    Ok(DeliveryData {
        beneficiary_id,
        delivery_date,
        status,
        description: normalize_optional(request.description),
        route_id: match request.route_id {
            Some(explicit) => explicit,
            None => current.and_then(|d| d.route_id),
        },
        items: request.items,
    })
}

/// Ruta: nombre obligatorio; una ruta nueva no puede tener fecha anterior a hoy.
///
/// `existing` es la ruta ya persistida cuando se actualiza. Su fecha no se
/// vuelve a validar, y si el request omite `delivery_ids` se conservan sus miembros.
pub fn route_data(
    request: SaveRouteRequest,
    existing: Option<&Route>,
    today: NaiveDate,
) -> AppResult<RouteData> {
    request.validate()?;

    let name = required_text(request.name, "Route name is required")?;
    let date = request
        .date
        .or_else(|| existing.map(|r| r.date))
        .ok_or_else(|| validation_error("Route date is required"))?;

    if existing.is_none() && date < today {
        return Err(validation_error("A new route cannot be scheduled before today"));
    }

    let mut delivery_ids = match (request.delivery_ids, existing) {
        (Some(ids), _) => ids,
        (None, Some(route)) => route.delivery_ids(),
        (None, None) => Vec::new(),
    };
    let mut seen = HashSet::new();
    delivery_ids.retain(|id| seen.insert(*id));

    Ok(RouteData {
        name,
        date,
        delivery_ids,
    })
}

/// Foto de miembros de `save_route`: cada entrega debe existir y ser ya
/// miembro de esta ruta, o estar pendiente y libre.
///
/// `route_id` es `None` para una ruta nueva; `found` son las entregas leídas
/// para los ids pedidos.
pub fn check_route_members(
    route_id: Option<Uuid>,
    requested: &[Uuid],
    found: &[Delivery],
) -> AppResult<()> {
    for id in requested {
        let delivery = found
            .iter()
            .find(|d| d.id == *id)
            .ok_or_else(|| AppError::NotFound(format!("Delivery {} not found", id)))?;

        let already_member = route_id.map_or(false, |route| delivery.belongs_to(route));
        if already_member {
            continue;
        }
        if delivery.route_id.is_some() {
            return Err(AppError::Conflict(format!(
                "Delivery {} already belongs to another route",
                id
            )));
        }
        if !delivery.is_pending() {
            return Err(AppError::Conflict(format!(
                "Only pending deliveries can join a route (delivery {})",
                id
            )));
        }
    }
    Ok(())
}

/// Cambio de ruta dentro de un "salvar" de la entrega: si pasa a apuntar a
/// otra ruta no nula, se aplica la misma puerta que `assign_route`. Una
/// entrega reclamada por otra ruta debe soltarse antes.
pub fn check_route_change(
    current: Option<&Delivery>,
    data: &DeliveryData,
    route_exists: bool,
) -> AppResult<()> {
    let previous = current.and_then(|d| d.route_id);
    match data.route_id {
        Some(route_id) if previous != Some(route_id) => {
            if !route_exists {
                return Err(AppError::NotFound(format!("Route {} not found", route_id)));
            }
            if let Some(other) = previous {
                return Err(AppError::Conflict(format!(
                    "Delivery already belongs to route {}",
                    other
                )));
            }
            if data.status != DeliveryStatus::Pending {
                return Err(conflict_error("Only pending deliveries can be assigned to a route"));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// `assign_route`: solo entregas pendientes, y no reclamadas por otra ruta
pub fn check_assign(delivery: &Delivery, route_id: Uuid) -> AppResult<()> {
    if !delivery.is_pending() {
        return Err(conflict_error("Only pending deliveries can be assigned to a route"));
    }
    match delivery.route_id {
        Some(current) if current != route_id => Err(AppError::Conflict(format!(
            "Delivery {} already belongs to route {}",
            delivery.id, current
        ))),
        _ => Ok(()),
    }
}

/// `unassign_route`: falla si la entrega no tiene ruta; devuelve la ruta actual
pub fn check_unassign(delivery: &Delivery) -> AppResult<Uuid> {
    delivery
        .route_id
        .ok_or_else(|| conflict_error("Delivery is not assigned to any route"))
}

/// `add_delivery_to_route`: la ruta debe estar guardada, la entrega pendiente
/// y no reclamada por otra ruta
pub fn check_add_to_route(route: Option<&Route>, route_id: Uuid, delivery: &Delivery) -> AppResult<()> {
    if route.is_none() {
        return Err(AppError::NotFound(format!(
            "Route {} must be saved before adding deliveries",
            route_id
        )));
    }
    check_assign(delivery, route_id)
}

/// `remove_delivery_from_route`: la entrega debe apuntar exactamente a esta ruta
pub fn check_remove_from_route(route_id: Uuid, delivery: &Delivery) -> AppResult<()> {
    if !delivery.belongs_to(route_id) {
        return Err(AppError::Conflict(format!(
            "Delivery {} is not part of route {}",
            delivery.id, route_id
        )));
    }
    Ok(())
}

/// Beneficiarios e ítems referenciados por entregas no se pueden borrar
pub fn check_deletable(in_use: bool, resource: &str) -> AppResult<()> {
    if in_use {
        return Err(AppError::Conflict(format!(
            "{} is still referenced by existing deliveries",
            resource
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Beneficiary, BeneficiaryStatus, ItemQuantity};
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn delivery_request() -> SaveDeliveryRequest {
        SaveDeliveryRequest {
            beneficiary_id: Some(Uuid::new_v4()),
            delivery_date: Some(today()),
            status: Some(DeliveryStatus::Pending),
            description: Some("  ".to_string()),
            route_id: None,
            items: vec![ItemQuantity { item_id: Uuid::new_v4(), quantity: 2 }],
        }
    }

    fn delivery(status: DeliveryStatus, route_id: Option<Uuid>) -> Delivery {
        Delivery {
            id: Uuid::new_v4(),
            beneficiary: Beneficiary {
                id: Uuid::new_v4(),
                name: "Maria".to_string(),
                address: "Rua A, 10".to_string(),
                phone: "1111-2222".to_string(),
                description: None,
                status: BeneficiaryStatus::Active,
                enrolled_on: today(),
            },
            delivery_date: today(),
            status,
            description: None,
            route_id,
            route: None,
            items: vec![],
        }
    }

    fn route(id: Uuid) -> Route {
        Route {
            id,
            name: "North".to_string(),
            date: today(),
            deliveries: vec![],
        }
    }

    #[test]
    fn test_beneficiary_requires_name_address_and_phone() {
        let request = SaveBeneficiaryRequest {
            name: " Maria ".to_string(),
            address: "Rua A, 10".to_string(),
            phone: "   ".to_string(),
            description: None,
            status: None,
            page: None,
            limit: None,
        };
        assert!(matches!(beneficiary_data(request.clone()), Err(AppError::Validation(_))));

        let data = beneficiary_data(SaveBeneficiaryRequest {
            phone: "1111-2222".to_string(),
            ..request
        })
        .unwrap();
        assert_eq!(data.name, "Maria");
        assert_eq!(data.status, BeneficiaryStatus::Active);
    }

    #[test]
    fn test_beneficiary_length_limits_are_invalid_input() {
        let request = SaveBeneficiaryRequest {
            name: "M".repeat(151),
            address: "Rua A, 10".to_string(),
            phone: "1111-2222".to_string(),
            description: None,
            status: None,
            page: None,
            limit: None,
        };
        assert!(matches!(beneficiary_data(request), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_item_requires_name() {
        let request = SaveItemRequest { name: "".to_string(), description: None };
        assert!(item_data(request).is_err());
    }

    #[test]
    fn test_delivery_rules() {
        let data = delivery_data(delivery_request(), None).unwrap();
        assert_eq!(data.description, None);

        let mut empty = delivery_request();
        empty.items.clear();
        assert!(matches!(delivery_data(empty, None), Err(AppError::Validation(_))));

        let mut zero = delivery_request();
        zero.items[0].quantity = 0;
        assert!(delivery_data(zero, None).is_err());

        let mut no_status = delivery_request();
        no_status.status = None;
        assert!(delivery_data(no_status, None).is_err());

        let mut no_beneficiary = delivery_request();
        no_beneficiary.beneficiary_id = None;
        assert!(delivery_data(no_beneficiary, None).is_err());

        let mut duplicated = delivery_request();
        duplicated.items.push(duplicated.items[0]);
        assert!(delivery_data(duplicated, None).is_err());
    }

    #[test]
    fn test_new_route_cannot_be_in_the_past() {
        let request = SaveRouteRequest {
            name: "North".to_string(),
            date: Some(today() - Duration::days(1)),
            delivery_ids: None,
        };
        assert!(matches!(route_data(request.clone(), None, today()), Err(AppError::Validation(_))));

        let existing = route(Uuid::new_v4());
        assert!(route_data(request, Some(&existing), today()).is_ok());

        let same_day = SaveRouteRequest {
            name: "North".to_string(),
            date: Some(today()),
            delivery_ids: None,
        };
        assert!(route_data(same_day, None, today()).is_ok());
    }

    #[test]
    fn test_route_update_keeps_members_when_snapshot_is_omitted() {
        let mut existing = route(Uuid::new_v4());
        existing.deliveries.push(delivery(DeliveryStatus::Pending, Some(existing.id)));
        let request = SaveRouteRequest {
            name: "North 2".to_string(),
            date: None,
            delivery_ids: None,
        };

        let data = route_data(request, Some(&existing), today()).unwrap();
        assert_eq!(data.delivery_ids, existing.delivery_ids());
        assert_eq!(data.date, existing.date);
    }

    #[test]
    fn test_route_members_must_be_pending_and_free() {
        let route_id = Uuid::new_v4();
        let free = delivery(DeliveryStatus::Pending, None);
        let member = delivery(DeliveryStatus::InRoute, Some(route_id));
        let delivered = delivery(DeliveryStatus::Delivered, None);
        let elsewhere = delivery(DeliveryStatus::Pending, Some(Uuid::new_v4()));
        let found = vec![free.clone(), member.clone(), delivered.clone(), elsewhere.clone()];

        assert!(check_route_members(Some(route_id), &[free.id, member.id], &found).is_ok());
        assert!(check_route_members(None, &[member.id], &found).is_err());
        assert!(check_route_members(Some(route_id), &[delivered.id], &found).is_err());
        assert!(check_route_members(Some(route_id), &[elsewhere.id], &found).is_err());
        assert!(matches!(
            check_route_members(Some(route_id), &[Uuid::new_v4()], &found),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_assignment_gates() {
        let route_id = Uuid::new_v4();
        let pending = delivery(DeliveryStatus::Pending, None);
        let delivered = delivery(DeliveryStatus::Delivered, None);

        assert!(check_assign(&pending, route_id).is_ok());
        assert!(matches!(check_assign(&delivered, route_id), Err(AppError::Conflict(_))));
        assert!(check_unassign(&pending).is_err());

        let claimed = delivery(DeliveryStatus::Pending, Some(Uuid::new_v4()));
        assert!(check_add_to_route(Some(&route(route_id)), route_id, &claimed).is_err());
        assert!(matches!(
            check_add_to_route(None, route_id, &pending),
            Err(AppError::NotFound(_))
        ));
        assert!(check_remove_from_route(route_id, &pending).is_err());
    }

    #[test]
    fn test_route_change_inside_save_uses_assignment_gate() {
        let route_id = Uuid::new_v4();
        let mut data = delivery_data(delivery_request(), None).unwrap();
        data.route_id = Some(route_id);
        assert!(check_route_change(None, &data, true).is_ok());
        assert!(check_route_change(None, &data, false).is_err());

        data.status = DeliveryStatus::Delivered;
        assert!(check_route_change(None, &data, true).is_err());

        let current = delivery(DeliveryStatus::InRoute, Some(route_id));
        assert!(check_route_change(Some(&current), &data, true).is_ok());
    }

    #[test]
    fn test_route_change_rejects_delivery_claimed_by_another_route() {
        let north = Uuid::new_v4();
        let south = Uuid::new_v4();
        let current = delivery(DeliveryStatus::Pending, Some(north));
        let mut data = delivery_data(delivery_request(), Some(&current)).unwrap();
        data.route_id = Some(south);

        assert!(matches!(
            check_route_change(Some(&current), &data, true),
            Err(AppError::Conflict(_))
        ));

        data.route_id = None;
        assert!(check_route_change(Some(&current), &data, true).is_ok());
    }

    #[test]
    fn test_omitted_route_keeps_current_route() {
        let north = Uuid::new_v4();
        let current = delivery(DeliveryStatus::Pending, Some(north));

        let kept = delivery_data(delivery_request(), Some(&current)).unwrap();
        assert_eq!(kept.route_id, Some(north));

        let mut detach = delivery_request();
        detach.route_id = Some(None);
        assert_eq!(delivery_data(detach, Some(&current)).unwrap().route_id, None);
    }

    #[test]
    fn test_referenced_entities_cannot_be_deleted() {
        assert!(check_deletable(false, "Item").is_ok());
        assert!(matches!(check_deletable(true, "Item"), Err(AppError::Conflict(_))));
    }
}
