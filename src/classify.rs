//! Role predicates over a single device record.
//!
//! None of these touch the filesystem: the one sysfs fact they need (whether
//! the device exposes a `range` attribute) was captured with the record.

use strum_macros::IntoStaticStr;

use crate::{
    constants::{DMRAID_MEMBER_FS_TYPES, MDRAID_MEMBER_FS_TYPE, MDRAID_MEMBER_FS_TYPES},
    device::{DevType, DeviceRecord},
};

/// Reason a disk is not offered as an installation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Exclusion {
    NotDisk,
    Cdrom,
    BiosRaidMember,
    NetworkBlockDevice,
    RaidContainer,
    LvmVolume,
    Partition,
    CryptMapper,
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.into())
    }
}

fn contains(value: &Option<String>, needle: &str) -> bool {
    value.as_deref().is_some_and(|v| v.contains(needle))
}

impl DeviceRecord {
    /// Optical drive.
    pub fn is_cdrom(&self) -> bool {
        self.id_cdrom.as_deref() == Some("1")
    }

    /// Whole disk, as opposed to a partition. Optical drives are never disks.
    pub fn is_disk(&self) -> bool {
        if self.is_cdrom() {
            return false;
        }
        self.devtype == Some(DevType::Disk) || self.has_range
    }

    /// Member of a firmware RAID set.
    ///
    /// dmraid and mdraid members share a usage string, so a member is any
    /// known RAID signature other than the Linux software RAID one. Note this
    /// means the mdraid list can never match.
    pub fn is_biosraid_member(&self) -> bool {
        self.id_fs_type.as_deref().is_some_and(|fs_type| {
            (DMRAID_MEMBER_FS_TYPES.contains(&fs_type) || MDRAID_MEMBER_FS_TYPES.contains(&fs_type))
                && fs_type != MDRAID_MEMBER_FS_TYPE
        })
    }

    /// Whole disk that belongs to a firmware RAID set.
    pub fn is_raid_member(&self) -> bool {
        self.is_biosraid_member() && self.is_disk()
    }

    /// Assembled RAID array.
    pub fn is_raid_map(&self) -> bool {
        contains(&self.md_level, "raid")
    }

    /// md container (e.g. `MD_LEVEL=container`) holding arrays rather than data.
    pub fn is_raid_container(&self) -> bool {
        self.md_level
            .as_deref()
            .is_some_and(|level| !level.contains("raid"))
    }

    pub fn is_partition(&self) -> bool {
        self.devtype == Some(DevType::Partition) || contains(&self.dm_uuid, "part")
    }

    pub fn is_dm_device(&self) -> bool {
        contains(&self.devname, "/dev/dm")
    }

    pub fn is_nbd_device(&self) -> bool {
        contains(&self.devname, "/dev/nbd")
    }

    pub fn is_lvm_dm(&self) -> bool {
        contains(&self.dm_uuid, "LVM-")
    }

    pub fn is_crypt_mapper(&self) -> bool {
        contains(&self.dm_uuid, "CRYPT-LUKS")
    }

    /// First reason, in a fixed order, that keeps this device from being a
    /// useful hard device; `None` when it qualifies.
    pub fn hard_device_exclusion(&self) -> Option<Exclusion> {
        let checks: [(fn(&Self) -> bool, Exclusion); 8] = [
            (|d| !d.is_disk(), Exclusion::NotDisk),
            (Self::is_cdrom, Exclusion::Cdrom),
            (Self::is_biosraid_member, Exclusion::BiosRaidMember),
            (Self::is_nbd_device, Exclusion::NetworkBlockDevice),
            (Self::is_raid_container, Exclusion::RaidContainer),
            (Self::is_lvm_dm, Exclusion::LvmVolume),
            (Self::is_partition, Exclusion::Partition),
            (Self::is_crypt_mapper, Exclusion::CryptMapper),
        ];

        checks
            .into_iter()
            .find(|(excluded, _)| excluded(self))
            .map(|(_, reason)| reason)
    }

    /// Whole disk that can be offered for partitioning.
    pub fn is_useful_hard_device(&self) -> bool {
        self.hard_device_exclusion().is_none()
    }
}
