use anyhow::Result;

use crate::target::DryRunTarget;
use crate::{run_migration, Stage};

use super::{
    migration_options, open_source, open_target, print_migrate_stats, PlanArgs, SourceArgs,
    TargetArgs,
};

pub(crate) fn run_migrate(
    source: SourceArgs,
    target: TargetArgs,
    plan: PlanArgs,
    dry_run: bool,
) -> Result<()> {
    let mut config_source = open_source(&source)?;
    let mut client = open_target(&target)?;
    let options = migration_options(&target, &plan);

    if dry_run {
        let mut dry = DryRunTarget::new(client);
        let stats = run_migration(config_source.as_mut(), &mut dry, &options)?;
        println!("Dry run, nothing was sent. Planned calls:");
        for call in &dry.calls {
            println!("  {}", call);
        }
        print_migrate_stats(&stats);
        return Ok(());
    }

    let stats = match run_migration(config_source.as_mut(), &mut client, &options) {
        Ok(stats) => stats,
        Err(failure) => {
            if failure.stage < Stage::Pushed {
                eprintln!("No changes were made to the Meraki switches.");
            }
            return Err(failure.into());
        }
    };

    println!("\nMigration completed successfully!");
    print_migrate_stats(&stats);
    Ok(())
}
