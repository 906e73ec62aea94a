//! JSON document persistence with file locking.
//!
//! Every document is read whole and written whole. Writes go to a temp file
//! in the same directory, which is locked, fsynced and renamed over the
//! target, so an interrupted save never leaves a half-written document.

use crate::{Error, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A loaded document plus the warning raised if it had to be replaced
#[derive(Debug)]
pub struct Recovered<T> {
    pub value: T,
    pub warning: Option<String>,
}

/// Load a JSON document with shared locking
///
/// Returns `Ok(None)` if the file doesn't exist and `CorruptState` if it
/// exists but cannot be parsed.
pub fn load_json<T: DeserializeOwned>(path: &Path, name: &str) -> Result<Option<T>> {
    if !path.exists() {
        tracing::debug!("No {} found at {:?}", name, path);
        return Ok(None);
    }

    let file = File::open(path)?;

    // Acquire shared lock for reading
    file.lock_shared()?;
    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    let _ = file.unlock();
    read?;

    match serde_json::from_str::<T>(&contents) {
        Ok(value) => {
            tracing::debug!("Loaded {} from {:?}", name, path);
            Ok(Some(value))
        }
        Err(e) => Err(Error::corrupt(name, format!("{:?}: {}", path, e))),
    }
}

/// Load a document, replacing a corrupt one with the default value
///
/// The unreadable file is moved aside to `<name>.corrupt` rather than
/// deleted, and the returned warning must be shown to the user.
pub fn load_or_recover<T>(path: &Path, name: &str) -> Result<Recovered<T>>
where
    T: DeserializeOwned + Default,
{
    match load_json(path, name) {
        Ok(value) => Ok(Recovered {
            value: value.unwrap_or_default(),
            warning: None,
        }),
        Err(err @ Error::CorruptState { .. }) => {
            let backup = corrupt_backup_path(path);
            std::fs::rename(path, &backup)?;
            let warning = format!(
                "{}; starting from an empty {} (previous file kept at {})",
                err,
                name,
                backup.display()
            );
            tracing::warn!("{}", warning);
            Ok(Recovered {
                value: T::default(),
                warning: Some(warning),
            })
        }
        Err(err) => Err(err),
    }
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".corrupt");
    path.with_file_name(name)
}

/// Save a document as compact JSON
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_vec(value)?;
    write_atomic(path, &contents)
}

/// Save a document as indented JSON (for files people edit by hand)
pub fn save_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_vec_pretty(value)?;
    write_atomic(path, &contents)
}

/// Atomically replace `path` with `contents`
///
/// 1. Write to a temp file in the same directory
/// 2. Sync it to disk
/// 3. Rename it over the original
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "document path missing parent")
    })?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;

    // Acquire exclusive lock on the temp file to serialize concurrent writers
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(contents)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved {:?}", path);
    Ok(())
}
