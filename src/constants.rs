// Filesystem locations

/// Path to load the configuration from when none is given on the command line.
pub const CONFIG_PATH_DEFAULT: &str = "/etc/disktopo/config.yaml";

/// Mount point of sysfs.
pub const SYSFS_ROOT: &str = "/sys";

/// Directory holding the udev database, one file per device.
pub const UDEV_DATA_DIR: &str = "/run/udev/data";

/// Root of the device node tree.
pub const DEV_ROOT: &str = "/dev";

/// Directory of device-mapper aliases.
pub const DEV_MAPPER_DIR: &str = "/dev/mapper";

/// Prefix shared by the by-id symlinks udev creates from a dm device's name.
pub const BY_ID_DM_NAME_PREFIX: &str = "/dev/disk/by-id/dm-name";

/// Device class enumerated for storage devices.
pub const BLOCK_SUBSYSTEM: &str = "block";

// Device record keys

pub const DEVNAME: &str = "DEVNAME";
pub const DEVTYPE: &str = "DEVTYPE";
pub const DEVPATH: &str = "DEVPATH";
pub const ID_FS_TYPE: &str = "ID_FS_TYPE";
pub const ID_CDROM: &str = "ID_CDROM";
pub const MD_LEVEL: &str = "MD_LEVEL";
pub const DM_UUID: &str = "DM_UUID";
pub const DM_NAME: &str = "DM_NAME";

// Filesystem signatures

/// ID_FS_TYPE values blkid reports for members of firmware (dmraid) sets.
pub const DMRAID_MEMBER_FS_TYPES: &[&str] = &[
    "adaptec_raid_member",
    "ddf_raid_member",
    "hpt37x_raid_member",
    "hpt45x_raid_member",
    "isw_raid_member",
    "jmicron_raid_member",
    "lsi_mega_raid_member",
    "nvidia_raid_member",
    "promise_fasttrack_raid_member",
    "silicon_medley_raid_member",
    "via_raid_member",
];

/// ID_FS_TYPE values blkid reports for Linux software RAID members.
pub const MDRAID_MEMBER_FS_TYPES: &[&str] = &[MDRAID_MEMBER_FS_TYPE];

pub const MDRAID_MEMBER_FS_TYPE: &str = "linux_raid_member";

// Startup

/// Kernel module whose load blocks until SCSI bus scans complete.
pub const SCSI_WAIT_SCAN_MODULE: &str = "scsi_wait_scan";

/// Upper bound for `udevadm settle`, in seconds.
pub const SETTLE_TIMEOUT_SECS: u64 = 300;

/// md array state reported by an array that has been stopped.
pub const MD_ARRAY_STATE_CLEAR: &str = "clear";
