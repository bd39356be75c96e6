use std::collections::BTreeSet;
use tracing::debug;

use crate::target::{PortSettings, SviSettings, TargetCall};
use crate::{GatewayPlacement, PortId, SviRecord, TargetPortAssignment};

/// Every write a migration will issue, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    pub svis: Vec<TargetCall>,
    pub ports: Vec<TargetCall>,
}

impl MigrationPlan {
    pub fn calls(&self) -> impl Iterator<Item = &TargetCall> {
        self.svis.iter().chain(self.ports.iter())
    }

    /// Distinct VLANs that get an SVI.
    pub fn svi_count(&self) -> usize {
        self.svis
            .iter()
            .filter_map(|call| match call {
                TargetCall::CreateOrUpdateSvi { svi, .. } => Some(svi.vlan_id),
                TargetCall::SetPortConfig { .. } => None,
            })
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// SVI writes: the gateway owner first, then the rest in source order,
/// each pushed to every serial.
pub fn plan_svis(
    svis: &[SviRecord],
    serials: &[String],
    gateway: &GatewayPlacement,
) -> Vec<TargetCall> {
    let mut ordered: Vec<SviSettings> = Vec::with_capacity(svis.len());
    for svi in svis {
        let Some(mut settings) = SviSettings::from_record(svi) else {
            debug!(vlan = svi.vlan_id, "SVI has no address, not migrating");
            continue;
        };
        if gateway.owning_vlan_id == Some(svi.vlan_id) {
            settings.default_gateway = Some(gateway.gateway_ip);
            ordered.insert(0, settings);
        } else {
            ordered.push(settings);
        }
    }

    ordered
        .iter()
        .flat_map(|svi| {
            serials.iter().map(move |serial| TargetCall::CreateOrUpdateSvi {
                serial: serial.clone(),
                svi: svi.clone(),
            })
        })
        .collect()
}

/// Port writes for every downlink, shut ports forced down.
pub fn plan_ports(
    assignments: &[TargetPortAssignment],
    shut_ports: &BTreeSet<PortId>,
) -> Vec<TargetCall> {
    assignments
        .iter()
        .filter(|assignment| !assignment.source_interface.is_uplink())
        .map(|assignment| {
            let record = &assignment.source_interface;
            let mut port = PortSettings::from(&**record);
            if shut_ports.contains(&record.port_id) {
                port.shutdown = true;
            }
            TargetCall::SetPortConfig {
                serial: assignment.target_serial.clone(),
                port_id: assignment.target_port_id,
                port,
            }
        })
        .collect()
}
