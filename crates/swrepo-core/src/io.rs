//! Filesystem side effects.
//!
//! Every file swrepo publishes is written to a temporary file in the target
//! directory and renamed into place, so readers only ever see the old or the
//! new content.

use crate::error::{RepoError, Result};
use std::io::Write;
use std::path::Path;

/// Prefix of temporary files; the startup scan skips dot-files.
pub const TEMP_PREFIX: &str = ".swrepo-";

/// Read a whole file, attaching the path to any error.
///
/// # Errors
///
/// Returns [`RepoError::Io`] if the file cannot be read.
pub fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| RepoError::io(path, e))
}

/// Create `dir` and its parents if missing.
///
/// # Errors
///
/// Returns [`RepoError::Io`] if the directory cannot be created.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| RepoError::io(dir, e))
}

/// Atomically replace `path` with `bytes`.
///
/// # Errors
///
/// Returns [`RepoError::Io`] if writing or renaming fails; the target is
/// left untouched in that case.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    publish(path, bytes, |_| Ok(()))
}

/// Write `bytes` to a temporary sibling of `path`, run `check` against the
/// written copy, and only then rename it over `path`.
///
/// The temporary file is removed if any step fails.
///
/// # Errors
///
/// Returns whatever `check` returns, or [`RepoError::Io`] for filesystem
/// failures.
pub fn publish<F>(path: &Path, bytes: &[u8], check: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| RepoError::io(dir, e))?;

    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| RepoError::io(tmp.path(), e))?;

    check(tmp.path())?;

    tmp.persist(path).map_err(|e| RepoError::io(path, e.error))?;
    Ok(())
}
