use std::path::{Path, PathBuf};

fn strip_root(path: &Path) -> &Path {
    match path.strip_prefix("/") {
        Ok(relative) => relative,
        Err(_) => path,
    }
}

/// Joins an absolute path below `root`, treating it as relative to `root`.
///
/// `join_relative("/sys", "/devices/virtual/block/md126")` yields
/// `/sys/devices/virtual/block/md126`, whereas `Path::join` would discard the
/// root entirely.
pub fn join_relative(root: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join(strip_root(path.as_ref()))
}

/// Returns the final component of a path as an owned string, if it has one.
pub fn file_name_string(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
