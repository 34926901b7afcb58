use log::{debug, info, warn};

use osutils::{modprobe, udevadm};

use crate::config::SettleConfig;

/// Lets pending SCSI scans and udev events finish so the snapshot sees every
/// disk. Failures are logged and otherwise ignored.
pub fn wait_for_devices(config: &SettleConfig) {
    if !config.enabled {
        debug!("Skipping wait for devices");
        return;
    }

    info!("Waiting for devices to settle");

    // Loading the module blocks until outstanding SCSI scans complete.
    if let Err(e) = modprobe::load(&config.probe_module) {
        warn!("{e:?}");
    }
    if let Err(e) = modprobe::unload(&config.probe_module) {
        warn!("{e:?}");
    }

    if let Err(e) = udevadm::settle(config.timeout()) {
        warn!("{e:?}");
    }
}
