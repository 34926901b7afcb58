//! Firmware RAID membership, resolved through sysfs `slaves` links.

use log::trace;

use crate::device::DeviceRecord;

/// Finds a device by kernel short name.
///
/// Device-mapper escapes a `-` inside an LVM volume group or logical volume
/// name as `--`. When no device has exactly that name, an LVM device matching
/// the name with the escaping undone is returned instead.
pub fn device_by_name<'a>(name: &str, devices: &'a [DeviceRecord]) -> Option<&'a DeviceRecord> {
    if name.is_empty() {
        return None;
    }

    devices.iter().find(|device| device.name == name).or_else(|| {
        let unescaped = name.replace("--", "-");
        devices
            .iter()
            .find(|device| device.is_lvm_dm() && device.name == unescaped)
    })
}

/// Node paths of every whole disk belonging to a firmware RAID set.
pub fn raid_members(devices: &[DeviceRecord]) -> Vec<String> {
    devices
        .iter()
        .filter(|device| device.is_raid_member())
        .filter_map(|device| device.devname.clone())
        .collect()
}

/// Node paths of every RAID array assembled from at least one firmware RAID
/// member, in enumeration order and without duplicates.
pub fn raid_maps(devices: &[DeviceRecord]) -> Vec<String> {
    let mut maps: Vec<String> = Vec::new();
    for device in devices {
        let Some(member) = device.slaves.iter().find(|slave| {
            device_by_name(slave, devices).is_some_and(DeviceRecord::is_raid_member)
        }) else {
            continue;
        };

        if !device.is_raid_map() {
            continue;
        }

        let Some(devname) = &device.devname else {
            continue;
        };

        trace!("'{devname}' is a RAID map over member '{member}'");
        if !maps.contains(devname) {
            maps.push(devname.clone());
        }
    }
    maps
}
