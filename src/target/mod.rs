//! Target side of the migration: what gets written to Meraki switches.

use anyhow::Result;
use ipnet::Ipv4Net;
use std::fmt;
use std::net::Ipv4Addr;

use crate::{AllowedVlans, InterfaceRecord, SviRecord, SwitchportMode};

mod meraki;
mod recording;

pub use meraki::{MerakiClient, DEFAULT_BASE_URL};
pub use recording::{DryRunTarget, RecordingTarget, TargetCall, TargetRead};

/// Layer-3 interface settings for one VLAN on one switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SviSettings {
    pub vlan_id: u16,
    pub name: String,
    pub interface_ip: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub prefix_len: u8,
    /// Set only on the SVI that owns the switch's default gateway.
    pub default_gateway: Option<Ipv4Addr>,
}

impl SviSettings {
    /// Build settings for an SVI; `None` when it has no address to migrate.
    pub fn from_record(svi: &SviRecord) -> Option<Self> {
        let address = svi.address?;
        Some(Self {
            vlan_id: svi.vlan_id,
            name: svi.target_name(),
            interface_ip: address.ip,
            subnet_mask: address.mask,
            prefix_len: address.prefix_len,
            default_gateway: None,
        })
    }

    /// Network in CIDR form, e.g. `10.0.1.0/24`.
    pub fn subnet(&self) -> Ipv4Net {
        Ipv4Net::new(self.interface_ip, self.prefix_len)
            .map(|net| net.trunc())
            .unwrap_or_else(|_| Ipv4Net::from(self.interface_ip))
    }
}

/// Switch port settings in the flat shape the Meraki API expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    pub name: String,
    pub mode: SwitchportMode,
    pub data_vlan: Option<u16>,
    pub voice_vlan: Option<u16>,
    pub native_vlan: Option<u16>,
    pub allowed_vlans: Option<AllowedVlans>,
    pub shutdown: bool,
}

impl From<&InterfaceRecord> for PortSettings {
    fn from(record: &InterfaceRecord) -> Self {
        Self {
            name: record.name.clone(),
            mode: record.mode.kind(),
            data_vlan: record.mode.data_vlan(),
            voice_vlan: record.mode.voice_vlan(),
            native_vlan: record.mode.native_vlan(),
            allowed_vlans: record.mode.allowed_vlans().cloned(),
            shutdown: record.shutdown,
        }
    }
}

fn opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

impl fmt::Display for PortSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "name={:?} type={} vlan={} voice={} native={} allowed={} enabled={}",
            self.name,
            self.mode,
            opt(self.data_vlan),
            opt(self.voice_vlan),
            opt(self.native_vlan),
            opt(self.allowed_vlans.as_ref()),
            !self.shutdown
        )
    }
}

/// Current configuration of one port as reported by the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortState {
    pub port_id: u32,
    pub settings: PortSettings,
}

/// Operations the migration needs from the target platform.
///
/// Every call blocks until the platform answers. Writes are never skipped
/// based on current state, so running a migration twice issues the same
/// calls twice.
pub trait TargetPlatform {
    /// Create the VLAN interface on `serial`, or update it when one with the
    /// same VLAN id already exists.
    fn create_or_update_svi(&mut self, serial: &str, svi: &SviSettings) -> Result<()>;

    fn set_port_config(&mut self, serial: &str, port_id: u32, port: &PortSettings) -> Result<()>;

    fn list_switch_ports(&mut self, serial: &str) -> Result<Vec<PortState>>;

    /// Port numbers present on `serial`.
    fn get_port_inventory(&mut self, serial: &str) -> Result<Vec<u32>> {
        Ok(self
            .list_switch_ports(serial)?
            .into_iter()
            .map(|port| port.port_id)
            .collect())
    }

    /// Whether `gateway` is already served by existing routing configuration
    /// on any of `serials`.
    fn check_gateway_reachable(&mut self, serials: &[String], gateway: Ipv4Addr) -> Result<bool>;
}
