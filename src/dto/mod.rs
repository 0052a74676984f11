//! DTOs de la API
//!
//! Requests y queries que llegan por HTTP, y el envoltorio `ApiResponse`
//! que devuelven las operaciones de escritura.

pub mod beneficiary_dto;
pub mod common;
pub mod delivery_dto;
pub mod item_dto;
pub mod route_dto;

pub use common::ApiResponse;
