use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Error};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BLOCK_SUBSYSTEM, CONFIG_PATH_DEFAULT, DEV_ROOT, SCSI_WAIT_SCAN_MODULE, SETTLE_TIMEOUT_SECS,
    SYSFS_ROOT, UDEV_DATA_DIR,
};

/// Runtime configuration. Every field has a default, so an empty document is
/// a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DisktopoConfig {
    /// Mount point of sysfs.
    pub sysfs_root: PathBuf,

    /// Directory of the udev database.
    pub udev_data_dir: PathBuf,

    /// Prefix of the node paths reported for each device.
    ///
    /// Only the reported `DEVNAME` and symlink paths change; `/dev/mapper`
    /// aliases are always looked up on the live device tree.
    pub dev_root: PathBuf,

    /// Device class to enumerate.
    pub subsystem: String,

    pub blacklist: Blacklist,

    pub settle: SettleConfig,
}

impl Default for DisktopoConfig {
    fn default() -> Self {
        Self {
            sysfs_root: SYSFS_ROOT.into(),
            udev_data_dir: UDEV_DATA_DIR.into(),
            dev_root: DEV_ROOT.into(),
            subsystem: BLOCK_SUBSYSTEM.into(),
            blacklist: Blacklist::default(),
            settle: SettleConfig::default(),
        }
    }
}

/// Devices that are never installation candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Blacklist {
    /// Kernel name prefixes, e.g. `loop` for loop devices.
    pub name_prefixes: Vec<String>,

    /// Substrings of the SCSI model string of pseudo LUNs.
    pub models: Vec<String>,
}

impl Default for Blacklist {
    fn default() -> Self {
        Self {
            name_prefixes: ["loop", "ram", "fd"].map(String::from).to_vec(),
            models: ["IBM *STMF KERNEL", "SCEI Flash-5", "DGC LUNZ"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// Waiting for the device manager before enumerating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SettleConfig {
    pub enabled: bool,

    pub timeout_secs: u64,

    /// Module loaded then unloaded so that SCSI bus scans finish first.
    pub probe_module: String,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: SETTLE_TIMEOUT_SECS,
            probe_module: SCSI_WAIT_SCAN_MODULE.into(),
        }
    }
}

impl SettleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DisktopoConfig {
    pub fn from_yaml(contents: &str) -> Result<Self, Error> {
        serde_yaml::from_str(contents).context("Failed to parse configuration")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read configuration from '{}'",
                path.as_ref().display()
            )
        })?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid configuration in '{}'", path.as_ref().display()))
    }

    /// Loads `path` when given, which must then exist. Otherwise loads the
    /// default location if present, falling back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(CONFIG_PATH_DEFAULT).exists() => Self::from_file(CONFIG_PATH_DEFAULT),
            None => {
                debug!("No configuration at '{CONFIG_PATH_DEFAULT}', using defaults");
                Ok(Self::default())
            }
        }
    }
}
