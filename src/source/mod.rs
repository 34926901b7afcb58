//! Boundaries to the host: where device records come from, and the parts of
//! `/dev` consulted when picking a display name.

use std::path::{Path, PathBuf};

use anyhow::Error;

use crate::device::DeviceRecord;

mod devfs;
mod sysfs;

pub use devfs::HostDevFs;
pub use sysfs::SysfsSource;

/// Why a single device could not be turned into a record. The device is
/// skipped; enumeration carries on.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device '{sysfs_path}' does not exist in sysfs")]
    NotFound { sysfs_path: String },

    #[error("Device '{sysfs_path}' has no name")]
    Nameless { sysfs_path: String },

    #[error("Failed to read uevent of device '{sysfs_path}'")]
    UnreadableUevent {
        sysfs_path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Supplier of raw device records, the equivalent of a udev binding.
pub trait DeviceSource {
    /// Lists the sysfs paths (relative to the sysfs mount point) of every
    /// device in `subsystem`.
    fn enumerate(&self, subsystem: &str) -> Result<Vec<String>, Error>;

    /// Builds the record for the device at `sysfs_path`.
    fn create_device(&self, sysfs_path: &str) -> Result<DeviceRecord, DeviceError>;

    /// Reads an attribute file below the device's sysfs directory, e.g.
    /// `md/array_state`. `None` when missing or unreadable.
    fn attribute(&self, sysfs_path: &str, attribute: &str) -> Option<String>;
}

/// Entry of a directory listing, with its target when the entry is a symlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryLink {
    pub name: String,
    pub target: Option<PathBuf>,
}

/// Read-only view of the device node tree.
pub trait DevFs {
    /// Whether `path` exists, following symlinks.
    fn exists(&self, path: &Path) -> bool;

    /// Target of the symlink at `path`, unresolved.
    fn read_link(&self, path: &Path) -> Result<PathBuf, Error>;

    /// Entries of `dir`, in ascending name order.
    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntryLink>, Error>;
}

impl<T: DevFs + ?Sized> DevFs for &T {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, Error> {
        (**self).read_link(path)
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntryLink>, Error> {
        (**self).read_dir(dir)
    }
}
