//! Filtros de búsqueda
//!
//! Cada filtro se traduce a un predicado SQL parametrizado (vía
//! `sqlx::QueryBuilder`) y también se puede evaluar en memoria con
//! `matches`, de modo que ambos almacenes comparten la misma semántica.

use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Beneficiary, BeneficiaryStatus, DeliveryRecord, DeliveryStatus, Item, RouteSummary};
use crate::utils::validation::contains_pattern;

/// Búsqueda de beneficiarios.
///
/// Sin texto filtra solo por estado. Con texto compara nombre, dirección o
/// teléfono (subcadena, sensible a mayúsculas), o solo la descripción si
/// `search_in_description` está activo. El estado, si viene, se combina con AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeneficiaryFilter {
    pub text: Option<String>,
    pub search_in_description: bool,
    pub status: Option<BeneficiaryStatus>,
}

impl BeneficiaryFilter {
    pub fn new(
        text: Option<String>,
        search_in_description: bool,
        status: Option<BeneficiaryStatus>,
    ) -> Self {
        Self {
            text,
            search_in_description,
            status,
        }
    }

    /// Texto efectivo de búsqueda; vacío o en blanco equivale a no filtrar
    fn active_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn push_predicates(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE 1=1");

        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }

        if let Some(text) = self.active_text() {
            let pattern = contains_pattern(text);
            if self.search_in_description {
                qb.push(" AND descricao LIKE ").push_bind(pattern);
            } else {
                qb.push(" AND (nome LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR endereco LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR telefone LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }
    }

    pub fn matches(&self, beneficiary: &Beneficiary) -> bool {
        if let Some(status) = self.status {
            if beneficiary.status != status {
                return false;
            }
        }

        match self.active_text() {
            None => true,
            Some(text) if self.search_in_description => beneficiary
                .description
                .as_deref()
                .map_or(false, |d| d.contains(text)),
            Some(text) => {
                beneficiary.name.contains(text)
                    || beneficiary.address.contains(text)
                    || beneficiary.phone.contains(text)
            }
        }
    }
}

/// Búsqueda de entregas
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryFilter {
    All,
    Beneficiary(Uuid),
    Status(DeliveryStatus),
    Date(NaiveDate),
    Route(Uuid),
    /// Nombre del beneficiario o descripción de la entrega, sin distinguir mayúsculas
    Text(String),
}

impl DeliveryFilter {
    /// Las entregas consultadas por ruta no vuelven a cargar su propia ruta
    pub fn attaches_route(&self) -> bool {
        !matches!(self, DeliveryFilter::Route(_))
    }

    /// Cláusulas FROM/JOIN/WHERE sobre `entrega e`
    pub fn push_from_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" FROM entrega e");

        match self {
            DeliveryFilter::All => {}
            DeliveryFilter::Beneficiary(id) => {
                qb.push(" WHERE e.beneficiario_id = ").push_bind(*id);
            }
            DeliveryFilter::Status(status) => {
                qb.push(" WHERE e.status = ").push_bind(*status);
            }
            DeliveryFilter::Date(date) => {
                qb.push(" WHERE e.data_entrega = ").push_bind(*date);
            }
            DeliveryFilter::Route(id) => {
                qb.push(" WHERE e.rota_id = ").push_bind(*id);
            }
            DeliveryFilter::Text(text) => {
                let pattern = contains_pattern(text);
                qb.push(" INNER JOIN beneficiario b ON e.beneficiario_id = b.id")
                    .push(" WHERE LOWER(b.nome) LIKE LOWER(")
                    .push_bind(pattern.clone())
                    .push(") OR LOWER(e.descricao) LIKE LOWER(")
                    .push_bind(pattern)
                    .push(")");
            }
        }
    }

    pub fn matches(&self, record: &DeliveryRecord, beneficiary_name: &str) -> bool {
        match self {
            DeliveryFilter::All => true,
            DeliveryFilter::Beneficiary(id) => record.beneficiary_id == *id,
            DeliveryFilter::Status(status) => record.status == *status,
            DeliveryFilter::Date(date) => record.delivery_date == *date,
            DeliveryFilter::Route(id) => record.route_id == Some(*id),
            DeliveryFilter::Text(text) => {
                let needle = text.to_lowercase();
                beneficiary_name.to_lowercase().contains(&needle)
                    || record
                        .description
                        .as_deref()
                        .map_or(false, |d| d.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Búsqueda de ítems
#[derive(Debug, Clone, PartialEq)]
pub enum ItemFilter {
    All,
    /// Subcadena del nombre, sensible a mayúsculas
    Name(String),
    /// Nombre o descripción, sin distinguir mayúsculas
    Text(String),
}

impl ItemFilter {
    pub fn push_predicates(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            ItemFilter::All => {}
            ItemFilter::Name(name) => {
                qb.push(" WHERE nome LIKE ").push_bind(contains_pattern(name));
            }
            ItemFilter::Text(text) => {
                let pattern = contains_pattern(text);
                qb.push(" WHERE LOWER(nome) LIKE LOWER(")
                    .push_bind(pattern.clone())
                    .push(") OR LOWER(descricao) LIKE LOWER(")
                    .push_bind(pattern)
                    .push(")");
            }
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Name(name) => item.name.contains(name.as_str()),
            ItemFilter::Text(text) => {
                let needle = text.to_lowercase();
                item.name.to_lowercase().contains(&needle)
                    || item
                        .description
                        .as_deref()
                        .map_or(false, |d| d.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Búsqueda de rutas; el resultado siempre va de la fecha más reciente a la más antigua
#[derive(Debug, Clone, PartialEq)]
pub enum RouteFilter {
    All,
    Date(NaiveDate),
}

impl RouteFilter {
    pub fn push_predicates(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let RouteFilter::Date(date) = self {
            qb.push(" WHERE data = ").push_bind(*date);
        }
    }

    pub fn matches(&self, route: &RouteSummary) -> bool {
        match self {
            RouteFilter::All => true,
            RouteFilter::Date(date) => route.date == *date,
        }
    }
}
