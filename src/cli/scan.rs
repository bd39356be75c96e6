use anyhow::Result;
use std::collections::BTreeSet;

use crate::{scan_config, PortId};

use super::{open_source, print_scan_stats, SourceArgs};

pub(crate) fn run_scan(source: SourceArgs, uplinks: Vec<PortId>, skip_vlan1: bool) -> Result<()> {
    let mut source = open_source(&source)?;
    let text = source.fetch_running_config()?;

    let uplinks: BTreeSet<PortId> = uplinks.into_iter().collect();
    let stats = scan_config(&text, &uplinks, skip_vlan1)?;

    print_scan_stats(&stats);
    Ok(())
}
