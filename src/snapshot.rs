use anyhow::{Context, Error};
use log::{debug, info, warn};
use osutils::path::file_name_string;

use crate::{
    config::{Blacklist, DisktopoConfig},
    constants::MD_ARRAY_STATE_CLEAR,
    device::DeviceRecord,
    source::DeviceSource,
};

/// Whether the device is one an installer never wants: RAM disks, loop and
/// floppy devices, and a few storage-array pseudo LUNs.
fn is_blacklisted(source: &impl DeviceSource, blacklist: &Blacklist, sysfs_path: &str) -> bool {
    let name = file_name_string(sysfs_path).unwrap_or_default();
    if blacklist
        .name_prefixes
        .iter()
        .any(|prefix| name.starts_with(prefix.as_str()))
    {
        return true;
    }

    source
        .attribute(sysfs_path, "device/model")
        .is_some_and(|model| blacklist.models.iter().any(|bad| model.contains(bad.as_str())))
}

/// A stopped md array lingers in sysfs with state `clear`; it cannot be used
/// or probed. An unreadable state keeps the device.
fn is_cleared_md_array(source: &impl DeviceSource, record: &DeviceRecord) -> bool {
    record.name.starts_with("md")
        && source
            .attribute(&record.sysfs_path, "md/array_state")
            .is_some_and(|state| state == MD_ARRAY_STATE_CLEAR)
}

/// Takes one snapshot of the block devices the source can see.
///
/// Devices that cannot be read are logged and skipped; only a failure to
/// enumerate at all is an error.
pub fn fetch_block_devices(
    source: &impl DeviceSource,
    config: &DisktopoConfig,
) -> Result<Vec<DeviceRecord>, Error> {
    let paths = source
        .enumerate(&config.subsystem)
        .context("Failed to enumerate block devices")?;

    let mut records = Vec::with_capacity(paths.len());
    for sysfs_path in paths {
        if is_blacklisted(source, &config.blacklist, &sysfs_path) {
            debug!("Ignoring blacklisted device '{sysfs_path}'");
            continue;
        }

        let record = match source.create_device(&sysfs_path) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping device: {e}");
                continue;
            }
        };

        if is_cleared_md_array(source, &record) {
            debug!("Ignoring stopped md array '{}'", record.name);
            continue;
        }

        records.push(record);
    }

    info!("Found {} block devices", records.len());
    Ok(records)
}
