//! Migration pipeline: fetch, parse, align, resolve the gateway, push.
//!
//! Stages run strictly in order and a failure stops the run where it
//! happened. Nothing already written to the target is rolled back.

use anyhow::Result;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::align::{align_ports, check_port_inventory, group_by_member};
use crate::extract::{extract_interfaces, extract_shut_ports, extract_svis};
use crate::gateway::resolve_gateway;
use crate::source::ConfigSource;
use crate::target::{TargetCall, TargetPlatform};
use crate::{
    ConfigWarning, ErrorKind, InterfaceRecord, MigrationError, MigrationOptions, MigrationStats,
    PortId, SviRecord, SwitchportMode,
};

mod plan;
mod report;

pub use plan::{plan_ports, plan_svis, MigrationPlan};
pub use report::{port_report, SwitchPorts};

/// Pipeline stages, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Fetched,
    SvisParsed,
    ShutPortsFound,
    DownlinksParsed,
    UplinksParsed,
    PortsAligned,
    GatewayResolved,
    Pushed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetched => "FETCHED",
            Stage::SvisParsed => "SVIS_PARSED",
            Stage::ShutPortsFound => "SHUT_PORTS_FOUND",
            Stage::DownlinksParsed => "DOWNLINKS_PARSED",
            Stage::UplinksParsed => "UPLINKS_PARSED",
            Stage::PortsAligned => "PORTS_ALIGNED",
            Stage::GatewayResolved => "GATEWAY_RESOLVED",
            Stage::Pushed => "PUSHED",
        };
        f.write_str(name)
    }
}

/// A run that stopped before reaching [`Stage::Pushed`].
///
/// `stage` is the stage that could not be completed.
#[derive(Debug, Error)]
#[error("failed at stage {stage}: {error:#}")]
pub struct StageFailure {
    pub stage: Stage,
    pub error: anyhow::Error,
}

impl StageFailure {
    /// Classification of the underlying error, when it is a [`MigrationError`].
    pub fn kind(&self) -> Option<ErrorKind> {
        self.error
            .downcast_ref::<MigrationError>()
            .map(MigrationError::kind)
    }
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, StageFailure>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> Result<T, StageFailure> {
        self.map_err(|error| StageFailure { stage, error })
    }
}

/// Records pulled out of one running configuration.
#[derive(Debug, Default)]
pub struct ParsedConfig {
    pub svis: Vec<SviRecord>,
    pub shut_ports: BTreeSet<PortId>,
    /// Every physical port, uplinks included, in order of appearance.
    pub interfaces: Vec<Rc<InterfaceRecord>>,
}

fn record_warnings(stats: &mut MigrationStats, warnings: Vec<ConfigWarning>) {
    for warning in warnings {
        warn!("{warning}");
        stats.warnings.push(warning);
    }
}

/// Run the offline parse stages over `text`.
pub fn parse_config(
    text: &str,
    uplinks: &BTreeSet<PortId>,
    skip_vlan1: bool,
    stats: &mut MigrationStats,
) -> Result<ParsedConfig, StageFailure> {
    let extraction = extract_svis(text).at(Stage::SvisParsed)?;
    let mut svis = extraction.svis;
    if skip_vlan1 {
        svis.retain(|svi| svi.vlan_id != 1);
    }
    stats.svis_found = svis.len();
    stats.svis_with_address = svis.iter().filter(|svi| svi.address.is_some()).count();
    record_warnings(stats, extraction.warnings);
    info!(
        svis = stats.svis_found,
        with_address = stats.svis_with_address,
        "{}",
        Stage::SvisParsed
    );

    let shut_ports: BTreeSet<PortId> = extract_shut_ports(text).into_iter().collect();
    stats.shut_ports_found = shut_ports.len();
    info!(shut = stats.shut_ports_found, "{}", Stage::ShutPortsFound);

    let extraction = extract_interfaces(text, uplinks).at(Stage::DownlinksParsed)?;
    let interfaces: Vec<Rc<InterfaceRecord>> =
        extraction.interfaces.into_iter().map(Rc::new).collect();
    record_warnings(stats, extraction.warnings);
    stats.downlinks_found = interfaces.iter().filter(|i| !i.is_uplink()).count();
    stats.trunk_ports_found = interfaces
        .iter()
        .filter(|i| i.mode.kind() == SwitchportMode::Trunk)
        .count();
    info!(
        downlinks = stats.downlinks_found,
        trunks = stats.trunk_ports_found,
        "{}",
        Stage::DownlinksParsed
    );

    let known: BTreeSet<PortId> = interfaces.iter().map(|i| i.port_id).collect();
    let unknown = uplinks
        .difference(&known)
        .map(|port| ConfigWarning::UnknownUplink {
            port: port.to_string(),
        })
        .collect();
    record_warnings(stats, unknown);
    stats.uplinks_found = interfaces.iter().filter(|i| i.is_uplink()).count();
    stats.stack_members = group_by_member(&interfaces).len();
    info!(
        uplinks = stats.uplinks_found,
        members = stats.stack_members,
        "{}",
        Stage::UplinksParsed
    );

    Ok(ParsedConfig {
        svis,
        shut_ports,
        interfaces,
    })
}

/// Parse a configuration without touching any target and report counts.
pub fn scan_config(
    text: &str,
    uplinks: &BTreeSet<PortId>,
    skip_vlan1: bool,
) -> Result<MigrationStats> {
    let mut stats = MigrationStats::default();
    parse_config(text, uplinks, skip_vlan1, &mut stats)?;
    Ok(stats)
}

/// Run every stage up to [`Stage::GatewayResolved`] and return the writes
/// a migration would issue. Only reads reach the target.
pub fn plan_migration(
    source: &mut dyn ConfigSource,
    target: &mut dyn TargetPlatform,
    options: &MigrationOptions,
) -> Result<(MigrationPlan, MigrationStats), StageFailure> {
    let mut stats = MigrationStats::default();

    info!(source = %source.describe(), "fetching running configuration");
    let text = source.fetch_running_config().at(Stage::Fetched)?;
    info!(bytes = text.len(), "{}", Stage::Fetched);

    let parsed = parse_config(&text, &options.uplinks, options.skip_vlan1, &mut stats)?;

    let assignments = align_ports(&parsed.interfaces, &options.serials).at(Stage::PortsAligned)?;
    let warnings = check_port_inventory(
        target,
        &parsed.interfaces,
        &options.serials,
        options.strict_port_count,
    )
    .at(Stage::PortsAligned)?;
    stats.warnings.extend(warnings);
    info!(assignments = assignments.len(), "{}", Stage::PortsAligned);

    let gateway = resolve_gateway(
        options.default_gateway,
        &parsed.svis,
        &options.serials,
        target,
        options.assume_gateway_reachable,
    )
    .at(Stage::GatewayResolved)?;
    stats.gateway = Some(gateway);
    info!(gateway = %gateway.gateway_ip, vlan = ?gateway.owning_vlan_id, "{}", Stage::GatewayResolved);

    let plan = MigrationPlan {
        svis: plan_svis(&parsed.svis, &options.serials, &gateway),
        ports: plan_ports(&assignments, &parsed.shut_ports),
    };
    stats.svis_pushed = plan.svi_count();
    stats.ports_pushed = plan.ports.len();

    Ok((plan, stats))
}

/// Issue every call in `plan`, SVIs first. Stops at the first failure.
pub fn push_plan(target: &mut dyn TargetPlatform, plan: &MigrationPlan) -> Result<()> {
    for call in plan.calls() {
        debug!("{call}");
        match call {
            TargetCall::CreateOrUpdateSvi { serial, svi } => {
                target.create_or_update_svi(serial, svi)?;
            }
            TargetCall::SetPortConfig {
                serial,
                port_id,
                port,
            } => {
                target.set_port_config(serial, *port_id, port)?;
            }
        }
    }
    Ok(())
}

/// Migrate the source switch's configuration onto the target switches.
pub fn run_migration(
    source: &mut dyn ConfigSource,
    target: &mut dyn TargetPlatform,
    options: &MigrationOptions,
) -> Result<MigrationStats, StageFailure> {
    let (plan, stats) = plan_migration(source, target, options)?;
    push_plan(target, &plan).at(Stage::Pushed)?;
    info!(
        svis = stats.svis_pushed,
        ports = stats.ports_pushed,
        "{}",
        Stage::Pushed
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticText;
    use crate::target::RecordingTarget;
    use std::net::Ipv4Addr;

    const CONFIG: &str = "\
interface Vlan10
 description Data
 ip address 10.0.1.1 255.255.255.0
!
interface GigabitEthernet1/0/1
 description Desk1
 switchport access vlan 10
!
interface GigabitEthernet1/0/2
 shutdown
!
";

    fn options() -> MigrationOptions {
        MigrationOptions::new(
            vec!["Q2SW-0001-AAAA".to_string()],
            Ipv4Addr::new(10, 0, 1, 1),
        )
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::ShutPortsFound.to_string(), "SHUT_PORTS_FOUND");
        assert_eq!(Stage::GatewayResolved.to_string(), "GATEWAY_RESOLVED");
        assert!(Stage::Fetched < Stage::Pushed);
    }

    #[test]
    fn test_parse_error_names_stage() {
        let mut source = StaticText::new("inline", "interface Vlan10\n ip address 10.0.1.1\n");
        let mut target = RecordingTarget::new();
        let failure = run_migration(&mut source, &mut target, &options()).unwrap_err();
        assert_eq!(failure.stage, Stage::SvisParsed);
        assert_eq!(failure.kind(), Some(ErrorKind::Parse));
        assert!(failure.to_string().starts_with("failed at stage SVIS_PARSED: "));
        assert!(target.calls.is_empty());
    }

    #[test]
    fn test_stats_are_counted() {
        let mut source = StaticText::new("inline", CONFIG);
        let mut target = RecordingTarget::new();
        let stats = run_migration(&mut source, &mut target, &options()).unwrap();

        assert_eq!(stats.svis_found, 1);
        assert_eq!(stats.svis_pushed, 1);
        assert_eq!(stats.shut_ports_found, 1);
        assert_eq!(stats.downlinks_found, 2);
        assert_eq!(stats.stack_members, 1);
        assert_eq!(stats.ports_pushed, 2);
        assert_eq!(stats.gateway.and_then(|g| g.owning_vlan_id), Some(10));
        assert_eq!(target.calls.len(), 3);
    }

    #[test]
    fn test_skip_vlan1() {
        let text = "interface Vlan1\n ip address 192.168.1.1 255.255.255.0\n!\n";
        let stats = scan_config(text, &BTreeSet::new(), true).unwrap();
        assert_eq!(stats.svis_found, 0);
        let stats = scan_config(text, &BTreeSet::new(), false).unwrap();
        assert_eq!(stats.svis_found, 1);
    }

    #[test]
    fn test_unknown_uplink_warns() {
        let uplinks = BTreeSet::from(["Te1/1/1".parse::<PortId>().unwrap()]);
        let stats = scan_config(CONFIG, &uplinks, false).unwrap();
        assert_eq!(
            stats.warnings,
            vec![ConfigWarning::UnknownUplink {
                port: "TenGigabitEthernet1/1/1".to_string()
            }]
        );
    }

    #[test]
    fn test_push_failure_names_pushed_stage() {
        struct Failing;
        impl TargetPlatform for Failing {
            fn create_or_update_svi(
                &mut self,
                _serial: &str,
                _svi: &crate::target::SviSettings,
            ) -> Result<()> {
                Err(MigrationError::TargetRequest {
                    method: "POST".to_string(),
                    path: "/devices/Q2SW-0001-AAAA/switch/routing/interfaces".to_string(),
                    status: 400,
                    message: "Invalid subnet".to_string(),
                }
                .into())
            }
            fn set_port_config(
                &mut self,
                _serial: &str,
                _port_id: u32,
                _port: &crate::target::PortSettings,
            ) -> Result<()> {
                Ok(())
            }
            fn list_switch_ports(&mut self, _serial: &str) -> Result<Vec<crate::target::PortState>> {
                Ok(Vec::new())
            }
            fn check_gateway_reachable(&mut self, _serials: &[String], _gateway: Ipv4Addr) -> Result<bool> {
                Ok(false)
            }
        }

        let mut source = StaticText::new("inline", CONFIG);
        let failure = run_migration(&mut source, &mut Failing, &options()).unwrap_err();
        assert_eq!(failure.stage, Stage::Pushed);
        assert_eq!(failure.kind(), Some(ErrorKind::Transport));
    }
}
