//! Block device classification and disk/partition topology reconstruction.
//!
//! A [`StorageInventory`] snapshots the host's block devices once, then
//! answers which disks can be offered for installation, which of them are
//! firmware RAID members, and which partitions live on each disk.

pub mod classify;
pub mod cli;
pub mod config;
pub mod constants;
pub mod device;
pub mod inventory;
pub mod naming;
pub mod raid;
pub mod snapshot;
pub mod source;
pub mod startup;
pub mod topology;

#[cfg(test)]
mod testutils;

pub use classify::Exclusion;
pub use config::DisktopoConfig;
pub use device::{DevType, DeviceRecord};
pub use inventory::StorageInventory;
pub use source::{DevFs, DeviceError, DeviceSource, HostDevFs, SysfsSource};
pub use topology::TopologyNode;

pub const DISKTOPO_VERSION: &str = env!("CARGO_PKG_VERSION");
