//! Loading and saving config files (SPEC_FULL.md §4.10).
//!
//! Two save strategies, mirroring `confctl_save_atomic`/`confctl_save_in_place`:
//!
//! - atomic: write to a temp file next to the target, `fsync`, then `rename`
//!   over it. The target is never observed in a half-written state.
//! - in-place: `flock(2)` the target exclusively, truncate, write, `fsync`,
//!   unlock. Used when a concurrent in-place editor (e.g. another `brconf
//!   -w`) must see the lock.
//!
//! The original's in-place path opens the file for write — which truncates
//! it — *before* taking the lock, so a second writer can observe (and a
//! crash can persist) a zeroed file between truncation and the first
//! writer's unlock. Here the lock is acquired first and truncation happens
//! only after it's held (SPEC_FULL.md §9 Open Question resolution).

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::IoError;

/// Reads `path` fully into memory. When `shared_lock` is set (used when the
/// caller intends to rewrite the file in place), takes a shared `flock`
/// first so a concurrent in-place writer can't truncate the file out from
/// under this read.
pub fn load(path: &Path, shared_lock: bool) -> Result<Vec<u8>, IoError> {
    let mut file = File::open(path).map_err(|source| IoError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    if shared_lock {
        lock(&file, libc::LOCK_SH, path)?;
    }

    let mut buf = Vec::new();
    let result = file.read_to_end(&mut buf).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    });

    if shared_lock {
        let _ = unlock(&file);
    }

    result?;
    Ok(buf)
}

/// Writes `bytes` to a fresh temp file beside `path`, `fsync`s it, then
/// renames it over `path`. The temp file is removed if any step fails.
pub fn save_atomic(path: &Path, bytes: &[u8]) -> Result<(), IoError> {
    log::debug!("atomic save: {} bytes to {}", bytes.len(), path.display());
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|source| IoError::TempFile {
        path: path.to_path_buf(),
        source,
    })?;

    tmp.write_all(bytes).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.as_file().sync_all().map_err(|source| IoError::Sync {
        path: path.to_path_buf(),
        source,
    })?;
    tmp.persist(path)
        .map_err(|e| IoError::Rename {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    Ok(())
}

/// Locks `path` exclusively, truncates and rewrites it in place, `fsync`s,
/// then unlocks — in that order, so the lock covers the entire window in
/// which the file could be observed empty or partially written.
pub fn save_in_place(path: &Path, bytes: &[u8]) -> Result<(), IoError> {
    log::debug!("in-place save: {} bytes to {}", bytes.len(), path.display());
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|source| IoError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    lock(&file, libc::LOCK_EX, path)?;

    let result = write_in_place(&file, bytes, path);

    let _ = unlock(&file);
    result
}

fn write_in_place(mut file: &File, bytes: &[u8], path: &Path) -> Result<(), IoError> {
    use std::io::{Seek, SeekFrom};

    file.set_len(0).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    file.seek(SeekFrom::Start(0)).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(bytes).map_err(|source| IoError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    file.sync_all().map_err(|source| IoError::Sync {
        path: path.to_path_buf(),
        source,
    })
}

fn lock(file: &File, how: libc::c_int, path: &Path) -> Result<(), IoError> {
    let rc = unsafe { libc::flock(file.as_raw_fd(), how) };
    if rc != 0 {
        return Err(IoError::Lock {
            path: path.to_path_buf(),
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

fn unlock(file: &File) -> std::io::Result<()> {
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_UN) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// Removes a path that might not exist; used by tests to clean up temp files.
#[cfg(test)]
fn remove_if_exists(path: &Path) {
    let _ = fs::remove_file(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("brconf-io-test-{}-{}", std::process::id(), name))
    }

    #[test]
    fn atomic_save_then_load_roundtrips() {
        let path = temp_path("atomic");
        remove_if_exists(&path);
        save_atomic(&path, b"hello\n").unwrap();
        let bytes = load(&path, false).unwrap();
        assert_eq!(bytes, b"hello\n");
        remove_if_exists(&path);
    }

    #[test]
    fn in_place_save_then_load_roundtrips() {
        let path = temp_path("inplace");
        remove_if_exists(&path);
        save_in_place(&path, b"one\n").unwrap();
        save_in_place(&path, b"two\n").unwrap();
        let bytes = load(&path, false).unwrap();
        assert_eq!(bytes, b"two\n");
        remove_if_exists(&path);
    }

    #[test]
    fn in_place_save_shrinks_file() {
        let path = temp_path("shrink");
        remove_if_exists(&path);
        save_in_place(&path, b"a long first line\n").unwrap();
        save_in_place(&path, b"x\n").unwrap();
        let bytes = load(&path, false).unwrap();
        assert_eq!(bytes, b"x\n");
        remove_if_exists(&path);
    }
}
