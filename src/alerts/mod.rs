//! Supervision alerting API: query building, typed payload, and client.

mod client;
mod query;
mod types;

pub use client::{AlertsError, SupervisionClient};
pub use query::{ALERTS_BY_EQUIPMENTS_PATH, AlertsQuery, DEFAULT_SUPERVISION_URL};
pub use types::{
    AlertsByEquipment, Equipment, EquipmentAlert, EquipmentAlerts, ServiceEquipment,
    VM_DISCRIMINANT_FIELD, VmEquipment,
};
