use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{device::DeviceRecord, naming::dev_name, source::DevFs};

/// A disk offered to the storage configuration layer, with the partitions
/// found on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub hard_disk: String,

    /// Display paths, ascending.
    pub partitions: BTreeSet<String>,
}

/// Whether `part` lives on `disk`: its sysfs path is below the disk's, or,
/// failing that, its dm name extends the disk's dm name.
pub fn same_physical_device(part: &DeviceRecord, disk: &DeviceRecord) -> bool {
    if let (Some(part_path), Some(disk_path)) = (&part.devpath, &disk.devpath) {
        if part_path.starts_with(disk_path.as_str()) {
            return true;
        }
    }

    match (&part.dm_name, &disk.dm_name) {
        (Some(part_name), Some(disk_name)) => part_name.starts_with(disk_name.as_str()),
        _ => false,
    }
}

/// Every partition in `devices` that lives on `disk`, in enumeration order.
pub fn dev_partitions<'a>(
    disk: &'a DeviceRecord,
    devices: &'a [DeviceRecord],
) -> impl Iterator<Item = &'a DeviceRecord> + 'a {
    devices
        .iter()
        .filter(move |device| device.is_partition() && same_physical_device(device, disk))
}

/// Collapses nodes whose name extends another node's name into that node's
/// partitions.
///
/// Each node folds into the first other node whose name is a prefix of its
/// own. A single pass is made: a node folded into a node that is itself
/// folded away is dropped along with it.
pub fn fold_nested(mut nodes: Vec<TopologyNode>) -> Vec<TopologyNode> {
    let targets = nodes
        .iter()
        .map(|nested| {
            nodes.iter().position(|container| {
                container.hard_disk != nested.hard_disk
                    && nested.hard_disk.starts_with(container.hard_disk.as_str())
            })
        })
        .collect::<Vec<_>>();

    for (nested, target) in targets.iter().enumerate() {
        if let Some(container) = *target {
            debug!(
                "Folding '{}' into '{}'",
                nodes[nested].hard_disk, nodes[container].hard_disk
            );
            let name = nodes[nested].hard_disk.clone();
            nodes[container].partitions.insert(name);
        }
    }

    nodes
        .into_iter()
        .zip(targets)
        .filter_map(|(node, target)| target.is_none().then_some(node))
        .collect()
}

/// Builds the disk to partitions view from the useful hard devices of a
/// snapshot.
pub fn build(devices: &[DeviceRecord], devfs: &impl DevFs) -> Vec<TopologyNode> {
    let nodes = devices
        .iter()
        .filter(|device| device.is_useful_hard_device())
        .map(|disk| TopologyNode {
            hard_disk: dev_name(disk, devfs),
            partitions: dev_partitions(disk, devices)
                .map(|part| dev_name(part, devfs))
                .collect(),
        })
        .collect();

    fold_nested(nodes)
}
