#![allow(dead_code)]

use cat2meraki::target::{PortSettings, TargetCall};
use cat2meraki::{MigrationOptions, PortId};
use std::fs;
use std::net::Ipv4Addr;

pub const SERIAL_A: &str = "Q2SW-AAAA-0001";
pub const SERIAL_B: &str = "Q2SW-BBBB-0002";

pub fn fixture(name: &str) -> String {
    fs::read_to_string(format!("fixtures/{name}")).expect("read fixture")
}

pub fn port(name: &str) -> PortId {
    name.parse().expect("valid port id")
}

pub fn options(serials: &[&str], gateway: [u8; 4]) -> MigrationOptions {
    MigrationOptions::new(
        serials.iter().map(|s| s.to_string()).collect(),
        Ipv4Addr::from(gateway),
    )
}

pub fn stack_options() -> MigrationOptions {
    let mut options = options(&[SERIAL_A, SERIAL_B], [10, 0, 99, 1]);
    options.uplinks = [port("Gi1/1/1"), port("Gi2/1/1")].into_iter().collect();
    options
}

/// `(serial, port_id, settings)` of every port write, in call order.
pub fn port_writes(calls: &[TargetCall]) -> Vec<(String, u32, PortSettings)> {
    calls
        .iter()
        .filter_map(|call| match call {
            TargetCall::SetPortConfig {
                serial,
                port_id,
                port,
            } => Some((serial.clone(), *port_id, port.clone())),
            TargetCall::CreateOrUpdateSvi { .. } => None,
        })
        .collect()
}

/// `(serial, vlan_id)` of every SVI write, in call order.
pub fn svi_writes(calls: &[TargetCall]) -> Vec<(String, u16)> {
    calls
        .iter()
        .filter_map(|call| match call {
            TargetCall::CreateOrUpdateSvi { serial, svi } => Some((serial.clone(), svi.vlan_id)),
            TargetCall::SetPortConfig { .. } => None,
        })
        .collect()
}
