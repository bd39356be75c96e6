use anyhow::{Context, Result};
use std::io::{self, Write};

use crate::target::TargetPlatform;
use crate::{plan_migration, port_report, SwitchPorts};

use super::{migration_options, open_source, open_target, PlanArgs, SourceArgs, TargetArgs};

pub(crate) fn run_verify(
    source: SourceArgs,
    target: TargetArgs,
    plan: PlanArgs,
    quiet: bool,
) -> Result<()> {
    let mut config_source = open_source(&source)?;
    let mut client = open_target(&target)?;
    let options = migration_options(&target, &plan);

    let (plan, _stats) = plan_migration(config_source.as_mut(), &mut client, &options)?;

    let mut current = Vec::with_capacity(options.serials.len());
    for serial in &options.serials {
        let ports = client
            .list_switch_ports(serial)
            .with_context(|| format!("Failed to read current ports of {serial}"))?;
        current.push(SwitchPorts {
            serial: serial.clone(),
            ports,
        });
    }

    let (current_str, planned_str) = port_report(&current, &plan);

    if !quiet {
        println!("SVI updates planned: {}", plan.svis.len());
    }

    if current_str == planned_str {
        if !quiet {
            println!("No port changes.");
        }
        return Ok(());
    }

    if !quiet {
        let diff = similar::TextDiff::from_lines(&current_str, &planned_str);
        let mut out = io::stdout().lock();
        let unified = diff
            .unified_diff()
            .context_radius(3)
            .header("current", "planned")
            .to_string();
        write!(out, "{}", unified)?;
    }

    Err(anyhow::anyhow!("verify: changes detected"))
}
