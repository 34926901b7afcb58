use std::{process::Command, time::Duration};

use anyhow::{Context, Error};
use log::debug;

use crate::exe::RunAndCheck;

fn settle_command(timeout: Duration) -> Command {
    let mut command = Command::new("udevadm");
    command
        .arg("settle")
        .arg(format!("--timeout={}", timeout.as_secs()));
    command
}

/// Blocks until the udev event queue is empty or `timeout` elapses.
pub fn settle(timeout: Duration) -> Result<(), Error> {
    debug!("Waiting up to {}s for udev to settle", timeout.as_secs());
    settle_command(timeout)
        .run_and_check()
        .context("Failed to settle udev")
}
