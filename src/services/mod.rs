//! Servicios del sistema
//!
//! Reglas de consistencia previas a cualquier escritura y exportación de
//! manifiestos de ruta.

pub mod consistency_guard;
pub mod manifest_service;

pub use manifest_service::ManifestExporter;
