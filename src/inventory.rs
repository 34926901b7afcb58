use anyhow::{Context, Error};
use log::{debug, trace};

use crate::{
    config::DisktopoConfig,
    device::DeviceRecord,
    naming, raid,
    snapshot::fetch_block_devices,
    source::{DevFs, DeviceSource},
    topology::{self, TopologyNode},
};

/// One immutable snapshot of the host's block devices, and the views derived
/// from it.
///
/// Nothing here refreshes the snapshot; scan again for fresh data.
pub struct StorageInventory<F: DevFs> {
    devices: Vec<DeviceRecord>,
    devfs: F,
}

impl<F: DevFs> StorageInventory<F> {
    /// Snapshots every device `source` can see.
    pub fn scan(
        source: &impl DeviceSource,
        devfs: F,
        config: &DisktopoConfig,
    ) -> Result<Self, Error> {
        let devices =
            fetch_block_devices(source, config).context("Failed to snapshot block devices")?;
        Ok(Self::from_records(devices, devfs))
    }

    pub fn from_records(devices: Vec<DeviceRecord>, devfs: F) -> Self {
        Self { devices, devfs }
    }

    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }

    /// Disks that can be offered for partitioning.
    pub fn useful_hard_devices(&self) -> Vec<&DeviceRecord> {
        self.devices
            .iter()
            .filter(|device| match device.hard_device_exclusion() {
                Some(reason) => {
                    trace!("Excluding '{}': {reason}", device.name);
                    false
                }
                None => true,
            })
            .collect()
    }

    pub fn raid_members(&self) -> Vec<String> {
        raid::raid_members(&self.devices)
    }

    pub fn raid_maps(&self) -> Vec<String> {
        raid::raid_maps(&self.devices)
    }

    pub fn device_by_name(&self, name: &str) -> Option<&DeviceRecord> {
        raid::device_by_name(name, &self.devices)
    }

    /// Display path of `device`.
    pub fn dev_name(&self, device: &DeviceRecord) -> String {
        naming::dev_name(device, &self.devfs)
    }

    /// Partitions of the snapshot that live on `disk`.
    pub fn dev_partitions<'a>(&'a self, disk: &'a DeviceRecord) -> Vec<&'a DeviceRecord> {
        topology::dev_partitions(disk, &self.devices).collect()
    }

    /// Disks with their partitions, nested virtual devices folded in.
    pub fn devices_ptinfo(&self) -> Vec<TopologyNode> {
        let nodes = topology::build(&self.devices, &self.devfs);
        debug!("Built topology of {} disks", nodes.len());
        nodes
    }
}
