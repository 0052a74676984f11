//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean al schema
//! PostgreSQL (`beneficiario`, `item`, `entrega`, `entrega_item`, `rota`)
//! y los agregados hidratados que se devuelven al llamador.

pub mod beneficiary;
pub mod dashboard;
pub mod delivery;
pub mod item;
pub mod page;
pub mod route;

pub use beneficiary::{Beneficiary, BeneficiaryData, BeneficiaryStatus};
pub use dashboard::{DashboardStats, RecentDelivery, StatusCount};
pub use delivery::{
    Delivery, DeliveryData, DeliveryItemRecord, DeliveryLine, DeliveryRecord, DeliveryStatus,
    ItemQuantity,
};
pub use item::{Item, ItemData};
pub use page::{Page, PageRequest};
pub use route::{Route, RouteData, RouteSummary};
