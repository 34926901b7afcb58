//! Full pipeline against a fabricated sysfs, udev database and /dev tree.

use std::{
    fs,
    os::unix::fs::symlink,
    path::{Path, PathBuf},
};

use indoc::indoc;
use maplit::btreeset;
use tempfile::TempDir;

use disktopo::{
    cli::{self, OutputFormat},
    DisktopoConfig, HostDevFs, StorageInventory, SysfsSource, TopologyNode,
};

const PCI: &str = "devices/pci0000:00/0000:00:1f.2";

struct FakeHost {
    root: TempDir,
}

impl FakeHost {
    fn new() -> Self {
        let host = Self {
            root: tempfile::tempdir().unwrap(),
        };
        fs::create_dir_all(host.path("sys/class/block")).unwrap();
        fs::create_dir_all(host.path("run/udev/data")).unwrap();
        fs::create_dir_all(host.path("dev/mapper")).unwrap();
        host
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Adds a device directory below `sys/<devpath>` and links it from the
    /// block class.
    fn device(&self, devpath: &str, uevent: &str) -> &Self {
        let dir = self.path(&format!("sys/{devpath}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("uevent"), uevent).unwrap();

        let name = Path::new(devpath).file_name().unwrap();
        symlink(&dir, self.path("sys/class/block").join(name)).unwrap();
        self
    }

    fn attribute(&self, devpath: &str, attribute: &str, value: &str) -> &Self {
        let path = self.path(&format!("sys/{devpath}/{attribute}"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, value).unwrap();
        self
    }

    fn slaves(&self, devpath: &str, slaves: &[&str]) -> &Self {
        let dir = self.path(&format!("sys/{devpath}/slaves"));
        fs::create_dir_all(&dir).unwrap();
        for slave in slaves {
            fs::write(dir.join(slave), "").unwrap();
        }
        self
    }

    fn udev(&self, devnum: &str, content: &str) -> &Self {
        fs::write(self.path(&format!("run/udev/data/b{devnum}")), content).unwrap();
        self
    }

    /// Creates the node `dev/<node>` and a `dev/mapper/<alias>` link to it.
    fn mapper_alias(&self, alias: &str, node: &str) -> &Self {
        fs::write(self.path("dev").join(node), "").unwrap();
        symlink(format!("../{node}"), self.path("dev/mapper").join(alias)).unwrap();
        self
    }

    fn inventory(&self) -> StorageInventory<HostDevFs> {
        self.inventory_with_dev_root("/dev")
    }

    fn inventory_with_dev_root(&self, dev_root: &str) -> StorageInventory<HostDevFs> {
        let source = SysfsSource::with_roots(
            self.path("sys"),
            self.path("run/udev/data"),
            dev_root,
        );
        StorageInventory::scan(
            &source,
            HostDevFs::rooted(self.root.path()),
            &DisktopoConfig::default(),
        )
        .unwrap()
    }
}

fn populate(host: &FakeHost) {
    let sda = format!("{PCI}/ata1/host0/target0:0:0/0:0:0:0/block/sda");
    let sdb = format!("{PCI}/ata2/host1/target1:0:0/1:0:0:0/block/sdb");
    let sdc = format!("{PCI}/ata3/host2/target2:0:0/2:0:0:0/block/sdc");

    host.device(&sda, "MAJOR=8\nMINOR=0\nDEVNAME=sda\nDEVTYPE=disk\n")
        .attribute(&sda, "range", "16")
        .attribute(&sda, "device/model", "QEMU HARDDISK")
        .udev("8:0", "S:disk/by-id/ata-QEMU_HARDDISK_QM00001\nE:ID_TYPE=disk\n")
        .device(
            &format!("{sda}/sda1"),
            "MAJOR=8\nMINOR=1\nDEVNAME=sda1\nDEVTYPE=partition\nPARTN=1\n",
        )
        .udev("8:1", "E:ID_FS_TYPE=ext4\n");

    host.device(&sdb, "MAJOR=8\nMINOR=16\nDEVNAME=sdb\nDEVTYPE=disk\n")
        .udev("8:16", "E:ID_FS_TYPE=isw_raid_member\n")
        .device(&sdc, "MAJOR=8\nMINOR=32\nDEVNAME=sdc\nDEVTYPE=disk\n")
        .udev("8:32", "E:ID_FS_TYPE=isw_raid_member\n");

    host.device(
        "devices/virtual/block/md126",
        "MAJOR=9\nMINOR=126\nDEVNAME=md126\nDEVTYPE=disk\n",
    )
    .attribute("devices/virtual/block/md126", "md/array_state", "active")
    .slaves("devices/virtual/block/md126", &["sdc", "sdb"])
    .udev("9:126", "E:MD_LEVEL=raid1\n");

    host.device(
        "devices/virtual/block/md127",
        "MAJOR=9\nMINOR=127\nDEVNAME=md127\nDEVTYPE=disk\n",
    )
    .attribute("devices/virtual/block/md127", "md/array_state", "clear");

    host.device(
        "devices/virtual/block/dm-0",
        "MAJOR=253\nMINOR=0\nDEVNAME=dm-0\nDEVTYPE=disk\n",
    )
    .udev(
        "253:0",
        indoc! {"
            S:disk/by-id/dm-name-mpatha
            S:disk/by-id/dm-uuid-mpath-3600508b400105e21
            E:DM_NAME=mpatha
            E:DM_UUID=mpath-3600508b400105e21
        "},
    )
    .device(
        "devices/virtual/block/dm-1",
        "MAJOR=253\nMINOR=1\nDEVNAME=dm-1\nDEVTYPE=disk\n",
    )
    .udev(
        "253:1",
        indoc! {"
            S:disk/by-id/dm-name-mpatha1
            E:DM_NAME=mpatha1
            E:DM_UUID=part1-mpath-3600508b400105e21
        "},
    )
    .mapper_alias("mpatha", "dm-0")
    .mapper_alias("mpatha1", "dm-1");

    host.device(
        "devices/pci0000:00/0000:00:1f.1/ata4/host3/target3:0:0/3:0:0:0/block/sr0",
        "MAJOR=11\nMINOR=0\nDEVNAME=sr0\nDEVTYPE=disk\n",
    )
    .udev("11:0", "E:ID_CDROM=1\n");

    host.device(
        "devices/virtual/block/loop0",
        "MAJOR=7\nMINOR=0\nDEVNAME=loop0\nDEVTYPE=disk\n",
    );
}

#[test]
fn test_snapshot_contents() {
    let host = FakeHost::new();
    populate(&host);
    let inventory = host.inventory();

    let names = inventory
        .devices()
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["dm-0", "dm-1", "md126", "sda", "sda1", "sdb", "sdc", "sr0"]
    );

    let sda = inventory.device_by_name("sda").unwrap();
    assert_eq!(sda.devname.as_deref(), Some("/dev/sda"));
    assert!(sda.has_range);
    assert_eq!(sda.symlinks, vec!["/dev/disk/by-id/ata-QEMU_HARDDISK_QM00001"]);
    assert_eq!(sda.property("ID_TYPE"), Some("disk"));
    assert_eq!(sda.property("MAJOR"), Some("8"));

    let md126 = inventory.device_by_name("md126").unwrap();
    assert_eq!(md126.slaves, vec!["sdb", "sdc"]);
    assert_eq!(md126.md_level.as_deref(), Some("raid1"));
}

#[test]
fn test_classification() {
    let host = FakeHost::new();
    populate(&host);
    let inventory = host.inventory();

    let useful = inventory
        .useful_hard_devices()
        .into_iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(useful, vec!["dm-0", "md126", "sda"]);

    assert_eq!(inventory.raid_members(), vec!["/dev/sdb", "/dev/sdc"]);
    assert_eq!(inventory.raid_maps(), vec!["/dev/md126"]);
}

#[test]
fn test_topology() {
    let host = FakeHost::new();
    populate(&host);
    let inventory = host.inventory();

    assert_eq!(
        inventory.devices_ptinfo(),
        vec![
            TopologyNode {
                hard_disk: "/dev/mapper/mpatha".into(),
                partitions: btreeset! {"/dev/mapper/mpatha1".to_string()},
            },
            TopologyNode {
                hard_disk: "/dev/md126".into(),
                partitions: btreeset! {},
            },
            TopologyNode {
                hard_disk: "/dev/sda".into(),
                partitions: btreeset! {"/dev/sda1".to_string()},
            },
        ]
    );

    let rendered = cli::render(&inventory.devices_ptinfo(), OutputFormat::Yaml).unwrap();
    assert_eq!(
        rendered,
        indoc! {"
            - hard_disk: /dev/mapper/mpatha
              partitions:
              - /dev/mapper/mpatha1
            - hard_disk: /dev/md126
              partitions: []
            - hard_disk: /dev/sda
              partitions:
              - /dev/sda1
        "}
    );
}

#[test]
fn test_blacklisted_model_skipped() {
    let host = FakeHost::new();
    let lunz = format!("{PCI}/host5/target5:0:0/5:0:0:0/block/sdz");
    host.device(&lunz, "MAJOR=65\nMINOR=144\nDEVNAME=sdz\nDEVTYPE=disk\n")
        .attribute(&lunz, "device/model", "DGC LUNZ        ");

    assert!(host.inventory().devices().is_empty());
}

#[test]
fn test_missing_class_directory_is_empty() {
    let host = FakeHost::new();
    fs::remove_dir(host.path("sys/class/block")).unwrap();
    assert!(host.inventory().devices().is_empty());
}

#[test]
fn test_dev_root_prefixes_reported_paths_only() {
    let host = FakeHost::new();
    populate(&host);
    let inventory = host.inventory_with_dev_root("/target/dev");

    let sda = inventory.device_by_name("sda").unwrap();
    assert_eq!(sda.devname.as_deref(), Some("/target/dev/sda"));
    assert_eq!(
        sda.symlinks,
        vec!["/target/dev/disk/by-id/ata-QEMU_HARDDISK_QM00001"]
    );
    assert_eq!(inventory.dev_name(sda), "/target/dev/sda");

    // Mapper aliases still come from the device tree the inventory was given.
    let dm0 = inventory.device_by_name("dm-0").unwrap();
    assert_eq!(inventory.dev_name(dm0), "/dev/mapper/mpatha");
}
