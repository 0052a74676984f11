//! Controladores
//!
//! Operaciones que consume la capa de presentación: validan con la guardia
//! de consistencia y delegan en el almacén compartido.

pub mod beneficiary_controller;
pub mod dashboard_controller;
pub mod delivery_controller;
pub mod item_controller;
pub mod route_controller;
