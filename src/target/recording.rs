use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

use super::{PortSettings, PortState, SviSettings, TargetPlatform};

/// A write issued against the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetCall {
    CreateOrUpdateSvi {
        serial: String,
        svi: SviSettings,
    },
    SetPortConfig {
        serial: String,
        port_id: u32,
        port: PortSettings,
    },
}

impl fmt::Display for TargetCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetCall::CreateOrUpdateSvi { serial, svi } => {
                write!(
                    f,
                    "{serial}: SVI vlan={} name={:?} ip={} subnet={}",
                    svi.vlan_id,
                    svi.name,
                    svi.interface_ip,
                    svi.subnet()
                )?;
                if let Some(gateway) = svi.default_gateway {
                    write!(f, " default-gateway={gateway}")?;
                }
                Ok(())
            }
            TargetCall::SetPortConfig {
                serial,
                port_id,
                port,
            } => write!(f, "{serial}: port {port_id} {port}"),
        }
    }
}

/// A read issued against the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetRead {
    ListSwitchPorts { serial: String },
    CheckGatewayReachable { gateway: Ipv4Addr },
}

/// In-memory target that records every call.
///
/// Port listings and gateway reachability are canned; writes are kept in
/// order so a run can be compared call for call.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    ports: HashMap<String, Vec<PortState>>,
    gateway_reachable: bool,
    pub calls: Vec<TargetCall>,
    pub reads: Vec<TargetRead>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ports(mut self, serial: &str, ports: Vec<PortState>) -> Self {
        self.ports.insert(serial.to_string(), ports);
        self
    }

    pub fn with_gateway_reachable(mut self, reachable: bool) -> Self {
        self.gateway_reachable = reachable;
        self
    }

    /// Replay recorded port writes into the canned port listings, as a real
    /// switch would after a migration.
    pub fn apply_recorded_ports(&mut self) {
        for call in &self.calls {
            if let TargetCall::SetPortConfig {
                serial,
                port_id,
                port,
            } = call
            {
                let ports = self.ports.entry(serial.clone()).or_default();
                match ports.iter_mut().find(|state| state.port_id == *port_id) {
                    Some(state) => state.settings = port.clone(),
                    None => ports.push(PortState {
                        port_id: *port_id,
                        settings: port.clone(),
                    }),
                }
            }
        }
    }
}

impl TargetPlatform for RecordingTarget {
    fn create_or_update_svi(&mut self, serial: &str, svi: &SviSettings) -> Result<()> {
        self.calls.push(TargetCall::CreateOrUpdateSvi {
            serial: serial.to_string(),
            svi: svi.clone(),
        });
        Ok(())
    }

    fn set_port_config(&mut self, serial: &str, port_id: u32, port: &PortSettings) -> Result<()> {
        self.calls.push(TargetCall::SetPortConfig {
            serial: serial.to_string(),
            port_id,
            port: port.clone(),
        });
        Ok(())
    }

    fn list_switch_ports(&mut self, serial: &str) -> Result<Vec<PortState>> {
        self.reads.push(TargetRead::ListSwitchPorts {
            serial: serial.to_string(),
        });
        Ok(self.ports.get(serial).cloned().unwrap_or_default())
    }

    fn check_gateway_reachable(&mut self, _serials: &[String], gateway: Ipv4Addr) -> Result<bool> {
        self.reads
            .push(TargetRead::CheckGatewayReachable { gateway });
        Ok(self.gateway_reachable)
    }
}

/// Sends reads to a real target and records writes instead of sending them.
pub struct DryRunTarget<T> {
    inner: T,
    pub calls: Vec<TargetCall>,
}

impl<T: TargetPlatform> DryRunTarget<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            calls: Vec::new(),
        }
    }
}

impl<T: TargetPlatform> TargetPlatform for DryRunTarget<T> {
    fn create_or_update_svi(&mut self, serial: &str, svi: &SviSettings) -> Result<()> {
        self.calls.push(TargetCall::CreateOrUpdateSvi {
            serial: serial.to_string(),
            svi: svi.clone(),
        });
        Ok(())
    }

    fn set_port_config(&mut self, serial: &str, port_id: u32, port: &PortSettings) -> Result<()> {
        self.calls.push(TargetCall::SetPortConfig {
            serial: serial.to_string(),
            port_id,
            port: port.clone(),
        });
        Ok(())
    }

    fn list_switch_ports(&mut self, serial: &str) -> Result<Vec<PortState>> {
        self.inner.list_switch_ports(serial)
    }

    fn check_gateway_reachable(&mut self, serials: &[String], gateway: Ipv4Addr) -> Result<bool> {
        self.inner.check_gateway_reachable(serials, gateway)
    }
}
