use ipnet::Ipv4Net;
use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::rc::Rc;

use crate::{AllowedVlans, ConfigWarning, PortId};

/// Static IPv4 address of an SVI. Address and mask always travel together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SviAddress {
    pub ip: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub prefix_len: u8,
}

impl SviAddress {
    pub fn network(&self) -> Ipv4Net {
        // prefix_len comes from a validated mask, so the host fallback is never taken
        Ipv4Net::new(self.ip, self.prefix_len)
            .map(|net| net.trunc())
            .unwrap_or_else(|_| Ipv4Net::from(self.ip))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SviRecord {
    pub vlan_id: u16,
    pub name: String,
    pub address: Option<SviAddress>,
    /// Line of the `interface Vlan` header.
    pub line: usize,
}

impl SviRecord {
    /// Name sent to Meraki; Catalyst SVIs without a description become `Vlan<N>`.
    pub fn target_name(&self) -> String {
        if self.name.is_empty() {
            format!("Vlan{}", self.vlan_id)
        } else {
            self.name.clone()
        }
    }
}

/// Switchport mode without its VLAN payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchportMode {
    Access,
    Trunk,
}

impl fmt::Display for SwitchportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchportMode::Access => write!(f, "access"),
            SwitchportMode::Trunk => write!(f, "trunk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortMode {
    Access {
        data_vlan: u16,
        voice_vlan: Option<u16>,
    },
    Trunk {
        native_vlan: u16,
        allowed_vlans: AllowedVlans,
    },
}

impl PortMode {
    pub fn kind(&self) -> SwitchportMode {
        match self {
            PortMode::Access { .. } => SwitchportMode::Access,
            PortMode::Trunk { .. } => SwitchportMode::Trunk,
        }
    }

    pub fn data_vlan(&self) -> Option<u16> {
        match self {
            PortMode::Access { data_vlan, .. } => Some(*data_vlan),
            PortMode::Trunk { .. } => None,
        }
    }

    pub fn voice_vlan(&self) -> Option<u16> {
        match self {
            PortMode::Access { voice_vlan, .. } => *voice_vlan,
            PortMode::Trunk { .. } => None,
        }
    }

    pub fn native_vlan(&self) -> Option<u16> {
        match self {
            PortMode::Trunk { native_vlan, .. } => Some(*native_vlan),
            PortMode::Access { .. } => None,
        }
    }

    pub fn allowed_vlans(&self) -> Option<&AllowedVlans> {
        match self {
            PortMode::Trunk { allowed_vlans, .. } => Some(allowed_vlans),
            PortMode::Access { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    Uplink,
    Downlink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    pub port_id: PortId,
    pub name: String,
    pub mode: PortMode,
    pub shutdown: bool,
    pub role: PortRole,
    /// Line of the `interface` header.
    pub line: usize,
}

impl InterfaceRecord {
    pub fn is_uplink(&self) -> bool {
        self.role == PortRole::Uplink
    }
}

/// Where a source port lands on the Meraki side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPortAssignment {
    pub target_serial: String,
    pub target_port_id: u32,
    pub source_interface: Rc<InterfaceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayPlacement {
    pub gateway_ip: Ipv4Addr,
    /// `None` when the gateway already exists on the target switches.
    pub owning_vlan_id: Option<u16>,
}

/// Immutable run configuration, built once by the caller.
#[derive(Debug, Clone)]
pub struct MigrationOptions {
    pub serials: Vec<String>,
    pub default_gateway: Ipv4Addr,
    pub uplinks: BTreeSet<PortId>,
    pub skip_vlan1: bool,
    pub assume_gateway_reachable: bool,
    pub strict_port_count: bool,
}

impl MigrationOptions {
    pub fn new(serials: Vec<String>, default_gateway: Ipv4Addr) -> Self {
        Self {
            serials,
            default_gateway,
            uplinks: BTreeSet::new(),
            skip_vlan1: false,
            assume_gateway_reachable: false,
            strict_port_count: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct MigrationStats {
    pub svis_found: usize,
    pub svis_with_address: usize,
    pub svis_pushed: usize,
    pub shut_ports_found: usize,
    pub downlinks_found: usize,
    pub uplinks_found: usize,
    pub trunk_ports_found: usize,
    pub stack_members: usize,
    pub ports_pushed: usize,
    pub gateway: Option<GatewayPlacement>,
    pub warnings: Vec<ConfigWarning>,
}
