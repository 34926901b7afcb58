use std::{collections::BTreeMap, str::FromStr};

use serde::{Serialize, Serializer};
use strum_macros::EnumString;

use crate::constants::{DEVNAME, DEVPATH, DEVTYPE, DM_NAME, DM_UUID, ID_CDROM, ID_FS_TYPE, MD_LEVEL};

/// Kernel device type of a block device, as reported by `DEVTYPE`.
#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DevType {
    Disk,
    Partition,
    #[strum(default)]
    Other(String),
}

impl DevType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Disk => "disk",
            Self::Partition => "partition",
            Self::Other(other) => other,
        }
    }
}

impl Serialize for DevType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One block device as reported by the device metadata source.
///
/// Every udev attribute is optional; classification treats a missing
/// attribute as "predicate does not hold". The sysfs facts (`has_range`,
/// `slaves`) are captured once when the record is created, so a record never
/// touches the filesystem after the snapshot has been taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    /// Kernel short name, e.g. `sda1`.
    pub name: String,

    /// Location of the device below the sysfs mount point, e.g.
    /// `/devices/virtual/block/md126`.
    pub sysfs_path: String,

    #[serde(rename = "DEVNAME", skip_serializing_if = "Option::is_none")]
    pub devname: Option<String>,

    #[serde(rename = "DEVTYPE", skip_serializing_if = "Option::is_none")]
    pub devtype: Option<DevType>,

    #[serde(rename = "DEVPATH", skip_serializing_if = "Option::is_none")]
    pub devpath: Option<String>,

    #[serde(rename = "ID_FS_TYPE", skip_serializing_if = "Option::is_none")]
    pub id_fs_type: Option<String>,

    #[serde(rename = "ID_CDROM", skip_serializing_if = "Option::is_none")]
    pub id_cdrom: Option<String>,

    #[serde(rename = "MD_LEVEL", skip_serializing_if = "Option::is_none")]
    pub md_level: Option<String>,

    #[serde(rename = "DM_UUID", skip_serializing_if = "Option::is_none")]
    pub dm_uuid: Option<String>,

    #[serde(rename = "DM_NAME", skip_serializing_if = "Option::is_none")]
    pub dm_name: Option<String>,

    /// Alternate paths of the device node, in udev order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub symlinks: Vec<String>,

    /// Whether sysfs exposes a `range` attribute for the device.
    pub has_range: bool,

    /// Short names of the devices backing this one, ascending.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slaves: Vec<String>,

    /// Every other property, keyed by udev name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl DeviceRecord {
    pub fn new(name: impl Into<String>, sysfs_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sysfs_path: sysfs_path.into(),
            ..Default::default()
        }
    }

    /// Applies properties in order; a later value for a key replaces an
    /// earlier one.
    pub fn with_properties<I, K, V>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in properties {
            self.set_property(key.into(), value.into());
        }
        self
    }

    pub fn with_symlinks<I, S>(mut self, symlinks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symlinks = symlinks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_range(mut self, has_range: bool) -> Self {
        self.has_range = has_range;
        self
    }

    pub fn with_slaves<I, S>(mut self, slaves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.slaves = slaves.into_iter().map(Into::into).collect();
        self.slaves.sort();
        self
    }

    fn set_property(&mut self, key: String, value: String) {
        match key.as_str() {
            DEVNAME => self.devname = Some(value),
            DEVTYPE => {
                self.devtype = Some(match DevType::from_str(&value) {
                    Ok(devtype) => devtype,
                    Err(_) => DevType::Other(value),
                })
            }
            DEVPATH => self.devpath = Some(value),
            ID_FS_TYPE => self.id_fs_type = Some(value),
            ID_CDROM => self.id_cdrom = Some(value),
            MD_LEVEL => self.md_level = Some(value),
            DM_UUID => self.dm_uuid = Some(value),
            DM_NAME => self.dm_name = Some(value),
            _ => {
                self.properties.insert(key, value);
            }
        }
    }

    /// Looks up a property by its udev key.
    pub fn property(&self, key: &str) -> Option<&str> {
        match key {
            DEVNAME => self.devname.as_deref(),
            DEVTYPE => self.devtype.as_ref().map(DevType::as_str),
            DEVPATH => self.devpath.as_deref(),
            ID_FS_TYPE => self.id_fs_type.as_deref(),
            ID_CDROM => self.id_cdrom.as_deref(),
            MD_LEVEL => self.md_level.as_deref(),
            DM_UUID => self.dm_uuid.as_deref(),
            DM_NAME => self.dm_name.as_deref(),
            _ => self.properties.get(key).map(String::as_str),
        }
    }

    /// `DEVNAME`, or the empty string for a record without one.
    pub fn devname_or_empty(&self) -> &str {
        self.devname.as_deref().unwrap_or_default()
    }
}

/// Parses the `KEY=VALUE` lines of a sysfs `uevent` file.
///
/// Lines without a `=` are skipped. Values keep any further `=` characters.
pub fn parse_uevent(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Contents of one udev database file (`/run/udev/data/b<major>:<minor>`).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UdevDbEntry {
    /// `E:` lines.
    pub properties: Vec<(String, String)>,

    /// `S:` lines, relative to the device root.
    pub symlinks: Vec<String>,
}

pub fn parse_udev_db(content: &str) -> UdevDbEntry {
    let mut entry = UdevDbEntry::default();
    for line in content.lines() {
        match line.split_once(':') {
            Some(("E", property)) => {
                if let Some((key, value)) = property.split_once('=') {
                    entry.properties.push((key.to_string(), value.to_string()));
                }
            }
            Some(("S", link)) if !link.is_empty() => entry.symlinks.push(link.to_string()),
            _ => (),
        }
    }
    entry
}
