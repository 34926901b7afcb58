use std::process::ExitCode;

use anyhow::{bail, Context, Error};
use clap::Parser;
use log::{error, info};

use disktopo::{
    cli::{self, Cli, Commands, RaidReport},
    startup, DisktopoConfig, HostDevFs, StorageInventory, SysfsSource, DISKTOPO_VERSION,
};

fn run_disktopo(args: &Cli) -> Result<(), Error> {
    info!("disktopo version: {DISKTOPO_VERSION}");

    let config = DisktopoConfig::load(args.config.as_deref())?;

    if args.skip_settle {
        info!("Not waiting for devices to settle");
    } else {
        startup::wait_for_devices(&config.settle);
    }

    let source = SysfsSource::new(&config);
    // Mapper aliases come from the live tree, whatever `devRoot` prefixes.
    let inventory = StorageInventory::scan(&source, HostDevFs::default(), &config)?;
    info!("Running '{}'", args.command);

    match &args.command {
        Commands::Topology { format, outfile } => {
            let rendered = cli::render(&inventory.devices_ptinfo(), *format)?;
            cli::emit(&rendered, outfile.as_deref())
        }

        Commands::Devices { format, outfile } => {
            let rendered = cli::render(inventory.devices(), *format)?;
            cli::emit(&rendered, outfile.as_deref())
        }

        Commands::Raid { format, outfile } => {
            let report = RaidReport {
                members: inventory.raid_members(),
                maps: inventory.raid_maps(),
            };
            let rendered = cli::render(&report, *format)?;
            cli::emit(&rendered, outfile.as_deref())
        }

        Commands::Lookup { name, format } => {
            let Some(device) = inventory.device_by_name(name) else {
                bail!("Device '{name}' not found");
            };
            let rendered = cli::render(device, *format)?;
            cli::emit(&rendered, None)
        }
    }
}

fn setup_logging(args: &Cli) -> Result<(), Error> {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(args.verbosity)
        .try_init()
        .context("Logger already registered")
}

fn main() -> ExitCode {
    // Parse args
    let args = Cli::parse();

    if let Err(e) = setup_logging(&args) {
        eprintln!("Failed to initialize logging: {e:?}");
        return ExitCode::from(1);
    }

    if let Err(e) = run_disktopo(&args) {
        error!("disktopo failed: {e:?}");
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}
