use std::process::Command;

use anyhow::{Context, Error};
use log::debug;

use crate::exe::RunAndCheck;

/// Loads a kernel module.
pub fn load(module: &str) -> Result<(), Error> {
    debug!("Loading kernel module '{module}'");
    Command::new("modprobe")
        .arg(module)
        .run_and_check()
        .with_context(|| format!("Failed to load kernel module '{module}'"))
}

/// Unloads a kernel module.
pub fn unload(module: &str) -> Result<(), Error> {
    debug!("Unloading kernel module '{module}'");
    Command::new("rmmod")
        .arg(module)
        .run_and_check()
        .with_context(|| format!("Failed to unload kernel module '{module}'"))
}
