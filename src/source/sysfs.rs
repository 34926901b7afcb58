use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use log::{debug, trace, warn};
use osutils::{
    files::{list_dir_names, read_attribute},
    path::{file_name_string, join_relative},
};

use crate::{
    config::DisktopoConfig,
    constants::{DEVNAME, DEVPATH},
    device::{parse_udev_db, parse_uevent, DeviceRecord, UdevDbEntry},
};

use super::{DeviceError, DeviceSource};

/// Device source reading sysfs and the udev database directly.
#[derive(Debug, Clone)]
pub struct SysfsSource {
    sysfs_root: PathBuf,
    udev_data_dir: PathBuf,
    dev_root: PathBuf,
}

impl SysfsSource {
    pub fn new(config: &DisktopoConfig) -> Self {
        Self::with_roots(&config.sysfs_root, &config.udev_data_dir, &config.dev_root)
    }

    pub fn with_roots(
        sysfs_root: impl Into<PathBuf>,
        udev_data_dir: impl Into<PathBuf>,
        dev_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            udev_data_dir: udev_data_dir.into(),
            dev_root: dev_root.into(),
        }
    }

    fn sys_path(&self, sysfs_path: &str) -> PathBuf {
        join_relative(&self.sysfs_root, sysfs_path)
    }

    fn dev_path(&self, relative: &str) -> String {
        join_relative(&self.dev_root, relative)
            .to_string_lossy()
            .into_owned()
    }

    /// Reads the udev database entry of the device with the given numbers.
    /// A device udev has not processed yet simply has no entry.
    fn udev_entry(&self, major: &str, minor: &str) -> UdevDbEntry {
        let path = self.udev_data_dir.join(format!("b{major}:{minor}"));
        match fs::read_to_string(&path) {
            Ok(content) => parse_udev_db(&content),
            Err(e) => {
                debug!("No udev data at '{}': {e}", path.display());
                UdevDbEntry::default()
            }
        }
    }

    /// Converts an absolute sysfs directory back into a path relative to the
    /// sysfs root, e.g. `/devices/pci0000:00/.../block/sda`.
    fn relative_sysfs_path(&self, canonical_root: &Path, path: &Path) -> Option<String> {
        path.strip_prefix(canonical_root)
            .ok()
            .map(|relative| format!("/{}", relative.to_string_lossy()))
    }
}

impl DeviceSource for SysfsSource {
    fn enumerate(&self, subsystem: &str) -> Result<Vec<String>, Error> {
        let class_dir = self.sysfs_root.join("class").join(subsystem);
        let canonical_root = self.sysfs_root.canonicalize().with_context(|| {
            format!("Failed to resolve sysfs root '{}'", self.sysfs_root.display())
        })?;

        let devices = list_dir_names(&class_dir)
            .with_context(|| format!("Failed to enumerate '{subsystem}' devices"))?
            .into_iter()
            .filter_map(|name| {
                let entry = class_dir.join(&name);
                match entry.canonicalize() {
                    Ok(resolved) => {
                        let relative = self.relative_sysfs_path(&canonical_root, &resolved);
                        if relative.is_none() {
                            debug!(
                                "Ignoring '{}': resolves to '{}', outside of sysfs",
                                entry.display(),
                                resolved.display()
                            );
                        }
                        relative
                    }
                    Err(e) => {
                        warn!("Failed to resolve '{}': {e}", entry.display());
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        debug!("Enumerated {} '{subsystem}' devices", devices.len());
        Ok(devices)
    }

    fn create_device(&self, sysfs_path: &str) -> Result<DeviceRecord, DeviceError> {
        let dir = self.sys_path(sysfs_path);
        if !dir.exists() {
            return Err(DeviceError::NotFound {
                sysfs_path: sysfs_path.into(),
            });
        }

        let name = file_name_string(sysfs_path)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| DeviceError::Nameless {
                sysfs_path: sysfs_path.into(),
            })?;

        let uevent = fs::read_to_string(dir.join("uevent"))
            .map(|content| parse_uevent(&content))
            .map_err(|source| DeviceError::UnreadableUevent {
                sysfs_path: sysfs_path.into(),
                source,
            })?;
        let uevent_value = |key: &str| {
            uevent
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let mut properties = Vec::new();
        // The kernel reports the node relative to /dev; records carry the
        // full node path and the uevent's own DEVNAME is dropped below.
        if let Some(node) = uevent_value(DEVNAME) {
            properties.push((DEVNAME.to_string(), self.dev_path(node)));
        }
        properties.push((DEVPATH.to_string(), sysfs_path.to_string()));

        let udev = match (uevent_value("MAJOR"), uevent_value("MINOR")) {
            (Some(major), Some(minor)) => self.udev_entry(major, minor),
            _ => UdevDbEntry::default(),
        };
        properties.extend(udev.properties);
        properties.extend(uevent.iter().filter(|(k, _)| k != DEVNAME).cloned());

        let slaves = list_dir_names(&dir.join("slaves")).unwrap_or_else(|e| {
            warn!("Failed to list slaves of '{sysfs_path}': {e:#}");
            Vec::new()
        });

        let record = DeviceRecord::new(name, sysfs_path)
            .with_properties(properties)
            .with_symlinks(udev.symlinks.iter().map(|link| self.dev_path(link)))
            .with_range(dir.join("range").exists())
            .with_slaves(slaves);

        trace!("Created record for '{sysfs_path}': {record:?}");
        Ok(record)
    }

    fn attribute(&self, sysfs_path: &str, attribute: &str) -> Option<String> {
        read_attribute(&self.sys_path(sysfs_path).join(attribute))
    }
}
