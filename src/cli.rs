use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use serde::Serialize;

use crate::DISKTOPO_VERSION;

#[derive(Parser, Debug)]
#[clap(version = DISKTOPO_VERSION)]
pub struct Cli {
    /// Logging verbosity [OFF, ERROR, WARN, INFO, DEBUG, TRACE]
    #[arg(global = true, short, long, default_value_t = LevelFilter::Warn)]
    pub verbosity: LevelFilter,

    /// Path to the disktopo configuration
    #[arg(global = true, short, long)]
    pub config: Option<PathBuf>,

    /// Do not wait for pending SCSI scans and udev events before scanning
    #[arg(global = true, long)]
    pub skip_settle: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::ValueEnum, Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the disks that can be offered for installation, with their
    /// partitions
    Topology {
        #[clap(long, default_value = "yaml")]
        format: OutputFormat,

        /// Path to save the resulting output
        #[clap(short, long)]
        outfile: Option<PathBuf>,
    },

    /// Dump every device record of the snapshot
    Devices {
        #[clap(long, default_value = "yaml")]
        format: OutputFormat,

        /// Path to save the resulting output
        #[clap(short, long)]
        outfile: Option<PathBuf>,
    },

    /// Show firmware RAID members and the arrays built from them
    Raid {
        #[clap(long, default_value = "yaml")]
        format: OutputFormat,

        /// Path to save the resulting output
        #[clap(short, long)]
        outfile: Option<PathBuf>,
    },

    /// Show the record of a single device
    Lookup {
        /// Kernel name of the device, e.g. `sda` or `dm-0`
        #[clap(index = 1)]
        name: String,

        #[clap(long, default_value = "yaml")]
        format: OutputFormat,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Topology { .. } => "topology",
            Commands::Devices { .. } => "devices",
            Commands::Raid { .. } => "raid",
            Commands::Lookup { .. } => "lookup",
        }
    }
}

impl Display for Commands {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

/// Output of the `raid` command.
#[derive(Debug, Serialize)]
pub struct RaidReport {
    pub members: Vec<String>,
    pub maps: Vec<String>,
}

pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to serialize to YAML"),
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|json| json + "\n")
            .context("Failed to serialize to JSON"),
    }
}

/// Writes `contents` to `outfile`, or to stdout when not given.
pub fn emit(contents: &str, outfile: Option<&Path>) -> Result<(), Error> {
    match outfile {
        Some(path) => {
            fs::write(path, contents)
                .with_context(|| format!("Failed to write output to '{}'", path.display()))?;
            info!("Wrote output to '{}'", path.display());
            Ok(())
        }
        None => io::stdout()
            .lock()
            .write_all(contents.as_bytes())
            .context("Failed to write output to stdout"),
    }
}
