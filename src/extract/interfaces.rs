use anyhow::Result;
use std::collections::{BTreeSet, HashMap};

use super::blocks::{interface_blocks, InterfaceBlock};
use crate::vlan_list::parse_vlan_id;
use crate::{
    AllowedVlans, ConfigWarning, InterfaceRecord, MigrationError, PortId, PortMode, PortRole,
    SwitchportMode,
};

#[derive(Debug, Default)]
pub struct InterfaceExtraction {
    pub interfaces: Vec<InterfaceRecord>,
    pub warnings: Vec<ConfigWarning>,
}

/// Physical front-panel port named by an interface header, if it is one.
fn physical_port(block: &InterfaceBlock<'_>) -> Option<PortId> {
    block
        .name
        .parse::<PortId>()
        .ok()
        .filter(|port| port.kind.is_physical())
}

/// The last `shutdown` / `no shutdown` line decides the admin state.
fn is_shutdown(block: &InterfaceBlock<'_>) -> bool {
    block
        .children
        .iter()
        .rev()
        .find_map(|(_, text)| {
            if text.eq_ignore_ascii_case("shutdown") {
                Some(true)
            } else if text.eq_ignore_ascii_case("no shutdown") {
                Some(false)
            } else {
                None
            }
        })
        .unwrap_or(false)
}

/// Find the physical ports that are administratively down.
pub fn extract_shut_ports(text: &str) -> Vec<PortId> {
    interface_blocks(text)
        .iter()
        .filter(|block| is_shutdown(block))
        .filter_map(physical_port)
        .collect()
}

/// Extract every physical port block, in order of appearance.
///
/// Ports listed in `uplinks` are tagged [`PortRole::Uplink`]; everything
/// else is a downlink.
pub fn extract_interfaces(text: &str, uplinks: &BTreeSet<PortId>) -> Result<InterfaceExtraction> {
    let mut extraction = InterfaceExtraction::default();
    let mut seen: HashMap<PortId, usize> = HashMap::new();

    for block in interface_blocks(text) {
        let Some(port_id) = physical_port(&block) else {
            continue;
        };

        if let Some(first_line) = seen.insert(port_id, block.line) {
            return Err(MigrationError::DuplicatePort {
                port: port_id.to_string(),
                first_line,
                line: block.line,
            }
            .into());
        }

        let mode = parse_mode(&block, &port_id, &mut extraction.warnings)?;
        let name = block
            .directives("description")
            .last()
            .map(|(_, text)| text.to_string())
            .unwrap_or_default();
        let role = if uplinks.contains(&port_id) {
            PortRole::Uplink
        } else {
            PortRole::Downlink
        };

        extraction.interfaces.push(InterfaceRecord {
            port_id,
            name,
            mode,
            shutdown: is_shutdown(&block),
            role,
            line: block.line,
        });
    }

    Ok(extraction)
}

fn vlan_directive(block: &InterfaceBlock<'_>, keyword: &str) -> Result<Option<u16>> {
    match block.directives(keyword).last() {
        Some((line, value)) => {
            let vlan = parse_vlan_id(value).ok_or_else(|| MigrationError::InvalidVlanId {
                block: block.name.to_string(),
                line,
                value: value.to_string(),
            })?;
            Ok(Some(vlan))
        }
        None => Ok(None),
    }
}

fn parse_mode(
    block: &InterfaceBlock<'_>,
    port_id: &PortId,
    warnings: &mut Vec<ConfigWarning>,
) -> Result<PortMode> {
    let port = port_id.to_string();

    // The last `switchport mode` line wins; access VLAN lines never override it.
    let resolved = match block.directives("switchport mode").last() {
        Some((_, mode)) if mode.eq_ignore_ascii_case("trunk") => SwitchportMode::Trunk,
        Some((_, mode)) if mode.eq_ignore_ascii_case("access") => SwitchportMode::Access,
        Some((_, mode)) => {
            warnings.push(ConfigWarning::UnsupportedSwitchportMode {
                port: port.clone(),
                mode: mode.to_string(),
            });
            SwitchportMode::Access
        }
        None => SwitchportMode::Access,
    };

    let access_vlan = vlan_directive(block, "switchport access vlan")?;
    let native_vlan = vlan_directive(block, "switchport trunk native vlan")?;

    let mut voice_vlan = None;
    if let Some((_, value)) = block.directives("switchport voice vlan").last() {
        match parse_vlan_id(value) {
            Some(vlan) => voice_vlan = Some(vlan),
            None => warnings.push(ConfigWarning::UnsupportedVoiceVlan {
                port: port.clone(),
                value: value.to_string(),
            }),
        }
    }

    let mut allowed_lines = block.directives("switchport trunk allowed vlan").peekable();
    let has_allowed = allowed_lines.peek().is_some();
    let mut allowed_vlans = AllowedVlans::All;
    for (line, value) in allowed_lines {
        allowed_vlans
            .apply(value)
            .ok_or_else(|| MigrationError::InvalidVlanList {
                block: block.name.to_string(),
                line,
                value: value.to_string(),
            })?;
    }

    let has_access = access_vlan.is_some() || voice_vlan.is_some();
    let has_trunk = native_vlan.is_some() || has_allowed;
    let conflicting = match resolved {
        SwitchportMode::Trunk => has_access,
        SwitchportMode::Access => has_trunk,
    };
    if conflicting {
        warnings.push(ConfigWarning::ConflictingSwitchportDirectives {
            port,
            resolved: resolved.to_string(),
        });
    }

    Ok(match resolved {
        SwitchportMode::Access => PortMode::Access {
            data_vlan: access_vlan.unwrap_or(1),
            voice_vlan,
        },
        SwitchportMode::Trunk => {
            let native_vlan = native_vlan.unwrap_or(1);
            // `allowed vlan none` cannot be expressed on Meraki; keep the native VLAN only
            if allowed_vlans.is_empty() {
                allowed_vlans = AllowedVlans::Only(BTreeSet::from([native_vlan]));
            }
            PortMode::Trunk {
                native_vlan,
                allowed_vlans,
            }
        }
    })
}
