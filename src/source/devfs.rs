use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Error};
use osutils::path::join_relative;

use super::{DevFs, DirEntryLink};

/// The live device node tree, optionally relocated below another root.
#[derive(Debug, Clone)]
pub struct HostDevFs {
    root: PathBuf,
}

impl Default for HostDevFs {
    fn default() -> Self {
        Self::rooted("/")
    }
}

impl HostDevFs {
    /// Resolves every absolute path below `root` instead of `/`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn host_path(&self, path: &Path) -> PathBuf {
        join_relative(&self.root, path)
    }
}

impl DevFs for HostDevFs {
    fn exists(&self, path: &Path) -> bool {
        self.host_path(path).exists()
    }

    fn read_link(&self, path: &Path) -> Result<PathBuf, Error> {
        fs::read_link(self.host_path(path))
            .with_context(|| format!("Failed to read symlink '{}'", path.display()))
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntryLink>, Error> {
        let host_dir = self.host_path(dir);
        let mut entries = fs::read_dir(&host_dir)
            .with_context(|| format!("Failed to list directory '{}'", dir.display()))?
            .map(|entry| {
                let entry = entry?;
                Ok(DirEntryLink {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    target: fs::read_link(entry.path()).ok(),
                })
            })
            .collect::<Result<Vec<_>, std::io::Error>>()
            .with_context(|| format!("Failed to read entry of '{}'", dir.display()))?;

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
