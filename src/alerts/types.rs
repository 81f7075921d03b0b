//! Typed alerts-by-equipments payload.
//!
//! Equipment comes in two shapes, virtual machines and plain services. The
//! shape is decided once while deserializing: a record with a non-empty
//! `vmInstanceName` is a VM, anything else is a service.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Field whose presence marks a VM equipment record.
pub const VM_DISCRIMINANT_FIELD: &str = "vmInstanceName";

/// One page of equipment with their alerts.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlertsByEquipment {
    /// Total equipment matching the query.
    pub total: u64,
    /// Equipment in this page.
    pub count: u64,
    /// Equipment records.
    pub equipment: Vec<Equipment>,
    /// Offset of this page.
    pub position: u64,
}

impl AlertsByEquipment {
    /// Display names of every equipment record, in payload order.
    #[must_use]
    pub fn equipment_names(&self) -> Vec<&str> {
        self.equipment.iter().map(Equipment::display_name).collect()
    }

    /// Number of alerts across all equipment.
    #[must_use]
    pub fn alert_count(&self) -> usize {
        self.equipment.iter().map(|item| item.alerts().len()).sum()
    }
}

/// An equipment record.
#[derive(Debug, Clone, PartialEq)]
pub enum Equipment {
    /// A service instance hosted on a VM.
    Vm(VmEquipment),
    /// A service instance without VM details.
    Service(ServiceEquipment),
}

impl Equipment {
    /// VM instance name for VMs, service definition name otherwise.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Vm(vm) => &vm.vm_instance_name,
            Self::Service(service) => &service.service_definition_name,
        }
    }

    /// Service fields shared by both shapes.
    #[must_use]
    pub fn service(&self) -> &ServiceEquipment {
        match self {
            Self::Vm(vm) => &vm.service,
            Self::Service(service) => service,
        }
    }

    /// Alerts raised on this equipment.
    #[must_use]
    pub fn alerts(&self) -> &[EquipmentAlert] {
        &self.service().alerts.alert
    }

    /// Whether this is a VM record.
    #[must_use]
    pub fn is_vm(&self) -> bool {
        matches!(self, Self::Vm(_))
    }
}

impl<'de> Deserialize<'de> for Equipment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let is_vm = value
            .get(VM_DISCRIMINANT_FIELD)
            .and_then(Value::as_str)
            .is_some_and(|name| !name.is_empty());

        if is_vm {
            VmEquipment::deserialize(value)
                .map(Self::Vm)
                .map_err(D::Error::custom)
        } else {
            ServiceEquipment::deserialize(value)
                .map(Self::Service)
                .map_err(D::Error::custom)
        }
    }
}

/// Fields common to every equipment record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceEquipment {
    pub service_instance_datacenter: String,
    #[serde(rename = "serviceInstanceID")]
    pub service_instance_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub equipment_type: String,
    #[serde(rename = "servicePublicIP")]
    pub service_public_ip: String,
    pub service_instance_state_start_time: i64,
    #[serde(rename = "serviceControllerID")]
    pub service_controller_id: String,
    pub service_definition_name: String,
    #[serde(rename = "serviceInstanceAdminTenantOID")]
    pub service_instance_admin_tenant_oid: String,
    pub service_definition_version: String,
    pub service_instance_name: String,
    pub service_instance_state: String,
    pub service_instance_state_check_time: i64,
    pub alerts: EquipmentAlerts,
    pub service_instance_cluster: String,
    #[serde(rename = "serviceControllerURI")]
    pub service_controller_uri: String,
}

/// A VM equipment record: service fields plus VM details.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VmEquipment {
    #[serde(flatten)]
    pub service: ServiceEquipment,
    pub vm_instance_name: String,
    pub vm_instance_number: i64,
    #[serde(rename = "vmHAMode")]
    pub vm_ha_mode: String,
    #[serde(rename = "vmPublicIP")]
    pub vm_public_ip: String,
    #[serde(rename = "vmPublicDNS")]
    pub vm_public_dns: String,
    #[serde(rename = "vmPrivateIP")]
    pub vm_private_ip: String,
    pub vm_name: String,
    #[serde(rename = "vmID")]
    pub vm_id: String,
    #[serde(rename = "vmIaaSID")]
    pub vm_iaas_id: String,
}

/// Wrapper matching the payload's `alerts: { alert: [...] }` nesting.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EquipmentAlerts {
    pub alert: Vec<EquipmentAlert>,
}

/// A single alert on an equipment record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EquipmentAlert {
    #[serde(rename = "alertID")]
    pub alert_id: String,
    pub alert_name: String,
    pub message: String,
    pub state: String,
    pub real_state: String,
    pub start_time: i64,
    pub acknowledged: bool,
    pub acknowledger: String,
    // Sent as a number or a string depending on the portal version.
    pub acknowledge_msg: Value,
    #[serde(rename = "acknowledgeST")]
    pub acknowledge_st: i64,
    pub deactivated: bool,
    pub deactivator: String,
    pub deactivate_msg: String,
    #[serde(rename = "deactivateST")]
    pub deactivate_st: i64,
    #[serde(rename = "documentationURI")]
    pub documentation_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_page() {
        let page: AlertsByEquipment =
            serde_json::from_str(r#"{"total":0,"count":0,"equipment":[],"position":0}"#).unwrap();
        assert_eq!(page, AlertsByEquipment::default());
    }

    #[test]
    fn test_vm_and_service_are_discriminated_at_parse_time() {
        let page: AlertsByEquipment = serde_json::from_value(json!({
            "total": 2,
            "count": 2,
            "position": 0,
            "equipment": [
                {
                    "vmInstanceName": "vm-cstt-01",
                    "vmID": "i-123",
                    "vmHAMode": "active",
                    "serviceDefinitionName": "3dgeoscisurvey",
                    "serviceInstanceID": "svc-1",
                    "alerts": {"alert": [{"alertID": "A1", "alertName": "disk", "state": "CRITICAL", "acknowledgeMsg": 0}]}
                },
                {
                    "serviceDefinitionName": "3dgeoscisurvey-db",
                    "serviceInstanceID": "svc-2",
                    "serviceControllerURI": "https://controller/",
                    "alerts": {"alert": []}
                }
            ]
        }))
        .unwrap();

        assert!(page.equipment[0].is_vm());
        assert!(!page.equipment[1].is_vm());
        assert_eq!(page.equipment_names(), ["vm-cstt-01", "3dgeoscisurvey-db"]);
        assert_eq!(page.alert_count(), 1);

        let Equipment::Vm(vm) = &page.equipment[0] else {
            panic!("expected VM record");
        };
        assert_eq!(vm.vm_id, "i-123");
        assert_eq!(vm.vm_ha_mode, "active");
        assert_eq!(vm.service.service_instance_id, "svc-1");
        assert_eq!(vm.service.alerts.alert[0].alert_id, "A1");
        assert_eq!(
            page.equipment[1].service().service_controller_uri,
            "https://controller/"
        );
    }

    #[test]
    fn test_empty_vm_instance_name_is_a_service() {
        let equipment: Equipment = serde_json::from_value(json!({
            "vmInstanceName": "",
            "serviceDefinitionName": "svc"
        }))
        .unwrap();
        assert!(!equipment.is_vm());
        assert_eq!(equipment.display_name(), "svc");
    }

    #[test]
    fn test_wrong_field_type_is_an_error() {
        let result: Result<Equipment, _> =
            serde_json::from_value(json!({"serviceInstanceStateStartTime": "yesterday"}));
        assert!(result.is_err());
    }
}
