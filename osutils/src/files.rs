use std::{fs, io, path::Path};

use anyhow::{Context, Error};
use log::trace;

/// Reads the content of a file and trims it
pub fn read_file_trim<S>(file_path: &S) -> Result<String, Error>
where
    S: AsRef<Path> + ?Sized,
{
    let content = fs::read_to_string(file_path.as_ref()).context(format!(
        "Could not read file contents: {:?}",
        file_path.as_ref()
    ))?;
    Ok(content.trim().to_string())
}

/// Reads a sysfs-style attribute file, returning `None` when it is missing or
/// cannot be read.
pub fn read_attribute<S>(file_path: &S) -> Option<String>
where
    S: AsRef<Path> + ?Sized,
{
    match read_file_trim(file_path) {
        Ok(value) => Some(value),
        Err(e) => {
            trace!("Attribute unavailable: {e:#}");
            None
        }
    }
}

/// Lists the entry names of a directory in ascending order.
///
/// A directory that does not exist is reported as empty.
pub fn list_dir_names<S>(dir: &S) -> Result<Vec<String>, Error>
where
    S: AsRef<Path> + ?Sized,
{
    let entries = match fs::read_dir(dir.as_ref()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e).context(format!(
                "Could not list directory: {}",
                dir.as_ref().display()
            ))
        }
    };

    let mut names = entries
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()
        .context(format!(
            "Could not read directory entry in {}",
            dir.as_ref().display()
        ))?;
    names.sort();
    Ok(names)
}
