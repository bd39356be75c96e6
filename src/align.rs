use anyhow::Result;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::target::TargetPlatform;
use crate::{ConfigWarning, InterfaceRecord, MigrationError, TargetPortAssignment};

/// Physical ports of each stack member, in order of appearance.
pub fn group_by_member(interfaces: &[Rc<InterfaceRecord>]) -> BTreeMap<u8, Vec<Rc<InterfaceRecord>>> {
    let mut members: BTreeMap<u8, Vec<Rc<InterfaceRecord>>> = BTreeMap::new();
    for interface in interfaces {
        members
            .entry(interface.port_id.member)
            .or_default()
            .push(Rc::clone(interface));
    }
    members
}

/// Map source ports onto target switch ports by position.
///
/// Stack members are taken in ascending member number and paired with
/// `serials` in the order given. The Nth port of a member (1-based, by
/// appearance) becomes port N on its serial. Uplinks are mapped like any
/// other port so numbering stays aligned.
pub fn align_ports(
    interfaces: &[Rc<InterfaceRecord>],
    serials: &[String],
) -> Result<Vec<TargetPortAssignment>> {
    if serials.is_empty() {
        return Err(MigrationError::NoTargetSerials.into());
    }

    let members = group_by_member(interfaces);
    if members.len() != serials.len() {
        return Err(MigrationError::StackMismatch {
            serials: serials.len(),
            members: members.len(),
        }
        .into());
    }

    let mut assignments = Vec::with_capacity(interfaces.len());
    for ((member, ports), serial) in members.into_iter().zip(serials) {
        debug!(member, %serial, ports = ports.len(), "aligning stack member");
        for (ordinal, interface) in (1u32..).zip(ports) {
            assignments.push(TargetPortAssignment {
                target_serial: serial.clone(),
                target_port_id: ordinal,
                source_interface: interface,
            });
        }
    }
    Ok(assignments)
}

/// Compare each member's port count with the target switch it maps to.
///
/// Disagreement is a warning unless `strict`, in which case the first
/// mismatch (or unreadable inventory) is returned as an error.
pub fn check_port_inventory(
    target: &mut dyn TargetPlatform,
    interfaces: &[Rc<InterfaceRecord>],
    serials: &[String],
    strict: bool,
) -> Result<Vec<ConfigWarning>> {
    let mut warnings = Vec::new();

    for ((member, ports), serial) in group_by_member(interfaces).into_iter().zip(serials) {
        let inventory = match target.get_port_inventory(serial) {
            Ok(inventory) => inventory,
            Err(e) if !strict => {
                let warning = ConfigWarning::InventoryUnavailable {
                    serial: serial.clone(),
                    message: format!("{e:#}"),
                };
                warn!("{warning}");
                warnings.push(warning);
                continue;
            }
            Err(e) => return Err(e),
        };

        if inventory.len() == ports.len() {
            continue;
        }
        if strict {
            return Err(MigrationError::PortCountMismatch {
                serial: serial.clone(),
                member,
                source_ports: ports.len(),
                target_ports: inventory.len(),
            }
            .into());
        }
        let warning = ConfigWarning::PortCountMismatch {
            serial: serial.clone(),
            member,
            source_ports: ports.len(),
            target_ports: inventory.len(),
        };
        warn!("{warning}");
        warnings.push(warning);
    }

    Ok(warnings)
}
