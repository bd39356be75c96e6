use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use std::ffi::OsString;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::source::{ConfigSource, FileSource, SourceMode, SshSource};
use crate::target::{MerakiClient, DEFAULT_BASE_URL};
use crate::{MigrationOptions, MigrationStats, PortId};

mod migrate;
mod scan;
mod verify;

#[derive(Args, Debug)]
pub(crate) struct SourceArgs {
    /// Where to read the Catalyst running configuration from
    #[arg(long, value_enum, default_value_t = SourceMode::File)]
    pub(crate) source: SourceMode,

    /// Saved `show running-config` output
    #[arg(short = 'c', long, env = "CATALYST_CONFIG_FILE")]
    pub(crate) config_file: Option<PathBuf>,

    /// Catalyst switch address
    #[arg(long, env = "CATALYST_HOST")]
    pub(crate) host: Option<String>,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    pub(crate) ssh_port: u16,

    #[arg(long, env = "CATALYST_USERNAME")]
    pub(crate) username: Option<String>,

    #[arg(long, env = "CATALYST_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,

    /// Enable secret; when set, the config is read from privileged mode
    #[arg(long, env = "CATALYST_SECRET", hide_env_values = true)]
    pub(crate) secret: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct TargetArgs {
    /// Meraki Dashboard API key
    #[arg(long, env = "MERAKI_API_KEY", hide_env_values = true)]
    pub(crate) api_key: String,

    /// Meraki switch serials, one per stack member, in member order
    #[arg(
        short,
        long = "serial",
        env = "MERAKI_SERIALS",
        value_delimiter = ',',
        required = true
    )]
    pub(crate) serials: Vec<String>,

    #[arg(long, env = "MERAKI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub(crate) base_url: String,
}

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Default gateway of the switch management network
    #[arg(short = 'g', long, env = "DEFAULT_GATEWAY")]
    pub(crate) default_gateway: Ipv4Addr,

    /// Uplink ports, e.g. Gi1/1/1,Te1/1/2 (mapped but never configured)
    #[arg(short, long = "uplink", env = "UPLINK_PORTS", value_delimiter = ',')]
    pub(crate) uplinks: Vec<PortId>,

    /// Do not migrate the VLAN 1 SVI
    #[arg(long)]
    pub(crate) skip_vlan1: bool,

    /// Accept a default gateway outside every imported SVI without asking Meraki
    #[arg(long)]
    pub(crate) assume_gateway_reachable: bool,

    /// Abort when a stack member's port count differs from its Meraki switch
    #[arg(long)]
    pub(crate) strict_port_count: bool,
}

#[derive(Parser)]
#[command(
    name = "cat2meraki",
    about = "Migrate Cisco Catalyst switch configuration to Meraki MS switches",
    long_about = "Reads a Catalyst running configuration (from a file or over SSH) and pushes its \
                  VLAN interfaces and switch port settings to Meraki switches through the \
                  Dashboard API.",
    after_help = "Examples:\n  cat2meraki scan -c ./running-config.txt\n  cat2meraki verify -c ./running-config.txt -s Q2SW-AAAA-AAAA -g 10.0.1.1\n  cat2meraki migrate --source ssh --host 10.0.0.2 -s Q2SW-AAAA-AAAA,Q2SW-BBBB-BBBB -g 10.0.1.1 --uplink Gi1/1/1\n\nEvery option can also be set through the environment or a .env file; run 'cat2meraki migrate --help' for the variable names."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the Catalyst configuration and show what would be migrated (offline)
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        /// Uplink ports, e.g. Gi1/1/1,Te1/1/2
        #[arg(short, long = "uplink", env = "UPLINK_PORTS", value_delimiter = ',')]
        uplinks: Vec<PortId>,

        /// Do not count the VLAN 1 SVI
        #[arg(long)]
        skip_vlan1: bool,
    },

    /// Push SVIs and port settings to the Meraki switches
    Migrate {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        plan: PlanArgs,

        /// Read from Meraki but print the writes instead of sending them
        #[arg(long)]
        dry_run: bool,
    },

    /// Diff current Meraki port settings against the planned migration
    Verify {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        plan: PlanArgs,

        /// Suppress diff output (exit code still indicates changes)
        #[arg(long)]
        quiet: bool,
    },
}

pub fn run_with_args<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan {
            source,
            uplinks,
            skip_vlan1,
        } => scan::run_scan(source, uplinks, skip_vlan1),
        Commands::Migrate {
            source,
            target,
            plan,
            dry_run,
        } => migrate::run_migrate(source, target, plan, dry_run),
        Commands::Verify {
            source,
            target,
            plan,
            quiet,
        } => verify::run_verify(source, target, plan, quiet),
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn,cat2meraki=info",
        1 => "cat2meraki=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // already installed when called more than once in-process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(crate) fn open_source(args: &SourceArgs) -> Result<Box<dyn ConfigSource>> {
    match args.source {
        SourceMode::File => {
            let Some(path) = &args.config_file else {
                bail!("--config-file (or CATALYST_CONFIG_FILE) is required with --source file");
            };
            Ok(Box::new(FileSource::new(path)))
        }
        SourceMode::Ssh => {
            let (Some(host), Some(username), Some(password)) =
                (&args.host, &args.username, &args.password)
            else {
                bail!("--host, --username and --password are required with --source ssh");
            };
            let source = SshSource::new(host, username, SecretString::from(password.clone()))
                .with_port(args.ssh_port)
                .with_enable_secret(args.secret.clone().map(SecretString::from));
            Ok(Box::new(source))
        }
    }
}

pub(crate) fn open_target(args: &TargetArgs) -> Result<MerakiClient> {
    MerakiClient::new(&SecretString::from(args.api_key.clone()), &args.base_url)
}

pub(crate) fn migration_options(target: &TargetArgs, plan: &PlanArgs) -> MigrationOptions {
    MigrationOptions {
        serials: target.serials.clone(),
        default_gateway: plan.default_gateway,
        uplinks: plan.uplinks.iter().copied().collect(),
        skip_vlan1: plan.skip_vlan1,
        assume_gateway_reachable: plan.assume_gateway_reachable,
        strict_port_count: plan.strict_port_count,
    }
}

pub(crate) fn print_scan_stats(stats: &MigrationStats) {
    println!("SVIs found: {}", stats.svis_found);
    println!("SVIs with a static address: {}", stats.svis_with_address);
    println!("Stack members found: {}", stats.stack_members);
    println!("Downlink ports found: {}", stats.downlinks_found);
    println!("Uplink ports found: {}", stats.uplinks_found);
    println!("Trunk ports found: {}", stats.trunk_ports_found);
    println!("Shut ports found: {}", stats.shut_ports_found);
    print_warnings(stats);
}

pub(crate) fn print_migrate_stats(stats: &MigrationStats) {
    println!("SVIs found: {}", stats.svis_found);
    println!("SVIs pushed: {}", stats.svis_pushed);
    println!("Ports pushed: {}", stats.ports_pushed);
    println!("Shut ports pushed disabled: {}", stats.shut_ports_found);
    if let Some(gateway) = &stats.gateway {
        match gateway.owning_vlan_id {
            Some(vlan) => println!("Default gateway {} set on VLAN {}", gateway.gateway_ip, vlan),
            None => println!(
                "Default gateway {} already reachable on target",
                gateway.gateway_ip
            ),
        }
    }
    print_warnings(stats);
}

fn print_warnings(stats: &MigrationStats) {
    if stats.warnings.is_empty() {
        return;
    }
    println!("Warnings: {}", stats.warnings.len());
    for warning in &stats.warnings {
        println!("  - {}", warning);
    }
}
