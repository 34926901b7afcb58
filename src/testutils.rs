//! In-memory stand-ins for the host, used by unit tests.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Error};

use crate::{
    device::DeviceRecord,
    source::{DevFs, DeviceError, DeviceSource, DirEntryLink},
};

/// Builds a record with the given udev properties.
pub fn record(name: &str, sysfs_path: &str, properties: &[(&str, &str)]) -> DeviceRecord {
    DeviceRecord::new(name, sysfs_path).with_properties(properties.iter().copied())
}

/// Device source serving fixed records.
#[derive(Default)]
pub struct FakeSource {
    devices: Vec<(String, Option<DeviceRecord>)>,
    attributes: HashMap<(String, String), String>,
    failing: bool,
}

impl FakeSource {
    /// A source whose enumeration fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn with_device(mut self, record: DeviceRecord) -> Self {
        self.devices.push((record.sysfs_path.clone(), Some(record)));
        self
    }

    /// A device that is enumerated but cannot be read.
    pub fn with_unreadable(mut self, sysfs_path: &str) -> Self {
        self.devices.push((sysfs_path.into(), None));
        self
    }

    pub fn with_attribute(mut self, sysfs_path: &str, attribute: &str, value: &str) -> Self {
        self.attributes
            .insert((sysfs_path.into(), attribute.into()), value.into());
        self
    }
}

impl DeviceSource for FakeSource {
    fn enumerate(&self, _subsystem: &str) -> Result<Vec<String>, Error> {
        if self.failing {
            return Err(anyhow!("sysfs is not mounted"));
        }
        Ok(self.devices.iter().map(|(path, _)| path.clone()).collect())
    }

    fn create_device(&self, sysfs_path: &str) -> Result<DeviceRecord, DeviceError> {
        match self.devices.iter().find(|(path, _)| path == sysfs_path) {
            Some((_, Some(record))) => Ok(record.clone()),
            Some((_, None)) => Err(DeviceError::UnreadableUevent {
                sysfs_path: sysfs_path.into(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }),
            None => Err(DeviceError::NotFound {
                sysfs_path: sysfs_path.into(),
            }),
        }
    }

    fn attribute(&self, sysfs_path: &str, attribute: &str) -> Option<String> {
        self.attributes
            .get(&(sysfs_path.to_string(), attribute.to_string()))
            .cloned()
    }
}

/// Device node tree holding only what a test puts in it.
#[derive(Default)]
pub struct FakeDevFs {
    files: HashSet<PathBuf>,
    links: HashMap<PathBuf, PathBuf>,
    dirs: BTreeMap<PathBuf, Vec<DirEntryLink>>,
}

impl FakeDevFs {
    pub fn with_file(mut self, path: &str) -> Self {
        self.files.insert(path.into());
        self
    }

    /// Adds a symlink at `path`, also listing it in its parent directory.
    pub fn with_link(mut self, path: &str, target: &str) -> Self {
        let path = PathBuf::from(path);
        if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
            let entries = self.dirs.entry(parent.to_path_buf()).or_default();
            entries.push(DirEntryLink {
                name: name.to_string_lossy().into_owned(),
                target: Some(target.into()),
            });
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }
        self.links.insert(path, target.into());
        self
    }
}

impl DevFs for FakeDevFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, Error> {
        self.links
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("'{}' is not a symlink", path.display()))
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntryLink>, Error> {
        self.dirs
            .get(dir)
            .cloned()
            .ok_or_else(|| anyhow!("'{}' does not exist", dir.display()))
    }
}
