//! Display paths for devices, preferring `/dev/mapper` aliases for
//! device-mapper nodes.

use std::path::Path;

use log::{debug, trace};
use osutils::path::file_name_string;

use crate::{
    constants::{BY_ID_DM_NAME_PREFIX, DEV_MAPPER_DIR},
    device::DeviceRecord,
    source::DevFs,
};

/// Finds the `/dev/mapper` alias pointing at the node called `node_name`.
fn mapper_alias_for(node_name: &str, devfs: &impl DevFs) -> Option<String> {
    let entries = devfs
        .read_dir(Path::new(DEV_MAPPER_DIR))
        .map_err(|e| debug!("Cannot list mapper aliases: {e:#}"))
        .ok()?;

    entries
        .into_iter()
        .find(|entry| {
            entry
                .target
                .as_ref()
                .and_then(|target| file_name_string(target))
                .is_some_and(|target| target == node_name)
        })
        .map(|entry| format!("{DEV_MAPPER_DIR}/{}", entry.name))
}

/// Most user-meaningful path for `device`.
///
/// Anything but a device-mapper node with symlinks keeps its `DEVNAME`. For
/// a dm node, in order of preference:
///
/// 1. `/dev/mapper/<DM_NAME>`, when it exists.
/// 2. The mapper alias pointing at the same node as the device's
///    `by-id/dm-name-*` link.
/// 3. The `by-id/dm-name-*` link itself, when it cannot be resolved.
/// 4. The first symlink.
pub fn dev_name(device: &DeviceRecord, devfs: &impl DevFs) -> String {
    let devname = device.devname_or_empty();
    let Some(first_link) = device.symlinks.first() else {
        return devname.to_string();
    };
    if !device.is_dm_device() {
        return devname.to_string();
    }

    if let Some(dm_name) = &device.dm_name {
        let alias = format!("{DEV_MAPPER_DIR}/{dm_name}");
        if devfs.exists(Path::new(&alias)) {
            return alias;
        }
    }

    let Some(by_id) = device
        .symlinks
        .iter()
        .find(|link| link.contains(BY_ID_DM_NAME_PREFIX))
    else {
        return first_link.clone();
    };

    let node_name = match devfs.read_link(Path::new(by_id)) {
        Ok(target) => file_name_string(target),
        Err(e) => {
            debug!("Cannot resolve '{by_id}': {e:#}");
            None
        }
    };
    let Some(node_name) = node_name else {
        return by_id.clone();
    };

    match mapper_alias_for(&node_name, devfs) {
        Some(alias) => {
            trace!("Resolved '{devname}' to '{alias}' through '{by_id}'");
            alias
        }
        None => first_link.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testutils::{record, FakeDevFs};

    fn dm0(properties: &[(&str, &str)], symlinks: &[&str]) -> DeviceRecord {
        let mut all = vec![("DEVNAME", "/dev/dm-0"), ("DEVTYPE", "disk")];
        all.extend_from_slice(properties);
        record("dm-0", "/devices/virtual/block/dm-0", &all).with_symlinks(symlinks.iter().copied())
    }

    const BY_ID: &str = "/dev/disk/by-id/dm-name-vg0-root";
    const BY_UUID: &str = "/dev/disk/by-uuid/0c8fe7c8-7b52-4a4f-bf0e-f1a0ad0a0b0b";

    #[test]
    fn test_plain_device_keeps_devname() {
        let sda = record("sda", "/devices/pci/block/sda", &[("DEVNAME", "/dev/sda")])
            .with_symlinks(["/dev/disk/by-id/ata-QEMU"]);
        assert_eq!(dev_name(&sda, &FakeDevFs::default()), "/dev/sda");

        let nameless = record("sdx", "/devices/pci/block/sdx", &[]);
        assert_eq!(dev_name(&nameless, &FakeDevFs::default()), "");
    }

    #[test]
    fn test_dm_without_symlinks_keeps_devname() {
        let device = dm0(&[("DM_NAME", "vg0-root")], &[]);
        let devfs = FakeDevFs::default().with_file("/dev/mapper/vg0-root");
        assert_eq!(dev_name(&device, &devfs), "/dev/dm-0");
    }

    #[test]
    fn test_dm_name_alias() {
        let device = dm0(&[("DM_NAME", "vg0-root")], &[BY_UUID, BY_ID]);
        let devfs = FakeDevFs::default().with_file("/dev/mapper/vg0-root");
        assert_eq!(dev_name(&device, &devfs), "/dev/mapper/vg0-root");
    }

    #[test]
    fn test_alias_through_by_id_link() {
        // DM_NAME is stale, the alias is found through the by-id link.
        let device = dm0(&[("DM_NAME", "old-name")], &[BY_UUID, BY_ID]);
        let devfs = FakeDevFs::default()
            .with_link(BY_ID, "../../dm-0")
            .with_link("/dev/mapper/vg0-home", "../dm-10")
            .with_link("/dev/mapper/vg0-root", "../dm-0");
        assert_eq!(dev_name(&device, &devfs), "/dev/mapper/vg0-root");
    }

    #[test]
    fn test_alias_requires_exact_node_match() {
        let device = dm0(&[], &[BY_UUID, BY_ID]);
        let devfs = FakeDevFs::default()
            .with_link(BY_ID, "../../dm-1")
            .with_link("/dev/mapper/vg0-home", "../dm-10");
        assert_eq!(dev_name(&device, &devfs), BY_UUID);
    }

    #[test]
    fn test_unresolvable_by_id_link() {
        let device = dm0(&[], &[BY_UUID, BY_ID]);
        assert_eq!(dev_name(&device, &FakeDevFs::default()), BY_ID);
    }

    #[test]
    fn test_no_by_id_link_uses_first_symlink() {
        let device = dm0(
            &[("DM_NAME", "luks-1234")],
            &[BY_UUID, "/dev/disk/by-id/dm-uuid-CRYPT-LUKS2"],
        );
        assert_eq!(dev_name(&device, &FakeDevFs::default()), BY_UUID);
    }
}
