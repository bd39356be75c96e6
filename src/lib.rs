mod align;
pub mod cli;
mod errors;
mod extract;
mod gateway;
mod migrate;
mod port_id;
pub mod source;
mod subnet;
pub mod target;
mod types;
mod vlan_list;

pub use align::{align_ports, check_port_inventory, group_by_member};
pub use errors::{ConfigWarning, ErrorKind, MigrationError};
pub use extract::{
    extract_interfaces, extract_shut_ports, extract_svis, interface_blocks, InterfaceBlock,
    InterfaceExtraction, SviExtraction,
};
pub use gateway::resolve_gateway;
pub use migrate::{
    parse_config, plan_migration, plan_ports, plan_svis, port_report, push_plan, run_migration,
    scan_config, MigrationPlan, ParsedConfig, Stage, StageFailure, SwitchPorts,
};
pub use port_id::{PortId, PortKind};
pub use subnet::{netmask_to_prefix, svis_containing};
pub use types::{
    GatewayPlacement, InterfaceRecord, MigrationOptions, MigrationStats, PortMode, PortRole,
    SviAddress, SviRecord, SwitchportMode, TargetPortAssignment,
};
pub use vlan_list::{parse_vlan_id, parse_vlan_list, AllowedVlans, MAX_VLAN, MIN_VLAN};
