//! Local persistence for sealed item records.
//!
//! Files are written owner-only (0600) via write-temp, fsync, atomic-rename.
//! Contents are already encrypted; this module never sees plaintext.

use std::fs;
use std::io::Write;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

#[cfg(unix)]
use std::fs::File;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path has no parent directory")]
    NoParentDir,
}

pub fn read_sealed(path: &Path) -> Result<String, StoreError> {
    let contents = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = contents.len(), "read sealed file");
    Ok(contents)
}

pub fn write_sealed_atomic(path: &Path, contents: &str) -> Result<(), StoreError> {
    let dir = parent_dir(path)?;
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    #[cfg(unix)]
    tmp.as_file()
        .set_permissions(fs::Permissions::from_mode(0o600))?;

    tmp.as_file_mut().write_all(contents.as_bytes())?;
    tmp.as_file_mut().write_all(b"\n")?;
    tmp.as_file_mut().sync_all()?;

    tmp.persist(path).map_err(|err| StoreError::Io(err.error))?;
    fsync_dir(dir)?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote sealed file");
    Ok(())
}

fn parent_dir(path: &Path) -> Result<&Path, StoreError> {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Ok(Path::new(".")),
        Some(parent) => Ok(parent),
        None => Err(StoreError::NoParentDir),
    }
}

fn fsync_dir(dir: &Path) -> Result<(), StoreError> {
    #[cfg(unix)]
    {
        File::open(dir)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = dir;
    }
    Ok(())
}
