pub mod exe;
pub mod files;
pub mod modprobe;
pub mod path;
pub mod udevadm;

pub(crate) mod crate_private {
    pub trait Sealed {}
}
