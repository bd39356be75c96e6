use std::fmt::Write;

use super::MigrationPlan;
use crate::target::{PortState, TargetCall};

/// Current port state of one target switch.
#[derive(Debug, Clone)]
pub struct SwitchPorts {
    pub serial: String,
    pub ports: Vec<PortState>,
}

/// Render the target's current ports and the same ports after `plan` is
/// applied, one line per port, so the two can be diffed line by line.
pub fn port_report(current: &[SwitchPorts], plan: &MigrationPlan) -> (String, String) {
    let mut planned: Vec<SwitchPorts> = current.to_vec();

    for call in &plan.ports {
        let TargetCall::SetPortConfig {
            serial,
            port_id,
            port,
        } = call
        else {
            continue;
        };

        let index = match planned.iter().position(|switch| &switch.serial == serial) {
            Some(index) => index,
            None => {
                planned.push(SwitchPorts {
                    serial: serial.clone(),
                    ports: Vec::new(),
                });
                planned.len() - 1
            }
        };
        let ports = &mut planned[index].ports;
        match ports.iter_mut().find(|state| state.port_id == *port_id) {
            Some(state) => state.settings = port.clone(),
            None => ports.push(PortState {
                port_id: *port_id,
                settings: port.clone(),
            }),
        }
    }

    (render(current), render(&planned))
}

fn render(switches: &[SwitchPorts]) -> String {
    let mut out = String::new();
    for switch in switches {
        let mut ports: Vec<&PortState> = switch.ports.iter().collect();
        ports.sort_by_key(|state| state.port_id);
        for state in ports {
            let _ = writeln!(out, "{} port {}: {}", switch.serial, state.port_id, state.settings);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::PortSettings;
    use crate::SwitchportMode;

    fn access(vlan: u16) -> PortSettings {
        PortSettings {
            name: String::new(),
            mode: SwitchportMode::Access,
            data_vlan: Some(vlan),
            voice_vlan: None,
            native_vlan: None,
            allowed_vlans: None,
            shutdown: false,
        }
    }

    #[test]
    fn test_report_only_changes_planned_ports() {
        let current = vec![SwitchPorts {
            serial: "A".to_string(),
            ports: vec![
                PortState {
                    port_id: 2,
                    settings: access(1),
                },
                PortState {
                    port_id: 1,
                    settings: access(1),
                },
            ],
        }];
        let plan = MigrationPlan {
            svis: Vec::new(),
            ports: vec![TargetCall::SetPortConfig {
                serial: "A".to_string(),
                port_id: 1,
                port: access(10),
            }],
        };

        let (before, after) = port_report(&current, &plan);
        let before: Vec<&str> = before.lines().collect();
        let after: Vec<&str> = after.lines().collect();
        assert_eq!(before.len(), 2);
        assert!(before[0].starts_with("A port 1: "));
        assert!(after[0].contains("vlan=10"));
        assert_eq!(before[1], after[1]);
    }

    #[test]
    fn test_report_without_changes_is_identical() {
        let current = vec![SwitchPorts {
            serial: "A".to_string(),
            ports: vec![PortState {
                port_id: 1,
                settings: access(10),
            }],
        }];
        let plan = MigrationPlan {
            svis: Vec::new(),
            ports: vec![TargetCall::SetPortConfig {
                serial: "A".to_string(),
                port_id: 1,
                port: access(10),
            }],
        };
        let (before, after) = port_report(&current, &plan);
        assert_eq!(before, after);
    }
}
