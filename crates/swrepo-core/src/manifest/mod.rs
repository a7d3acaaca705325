//! Consolidated compatibility manifest: loading, merging, filtering and
//! persisting.
//!
//! [`merge`] and [`filter`] are pure functions over [`Document`] values; only
//! [`load`] and [`store`] touch the filesystem.

mod filter;
mod merge;

pub use filter::filter;
pub use merge::{merge, MergeOutcome};

use crate::error::{RepoError, Result};
use crate::io;
use std::path::Path;
use swrepo_schema::Document;

/// Read and parse the manifest at `path`.
///
/// A missing or empty file means there is no manifest yet.
///
/// # Errors
///
/// [`RepoError::Io`] if the file exists but cannot be read,
/// [`RepoError::MalformedManifest`] if it does not parse.
pub fn load(path: &Path) -> Result<Option<Document>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RepoError::io(path, e)),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let doc = Document::parse(&bytes)
        .map_err(|e| RepoError::malformed(format!("{}: {e}", path.display())))?;
    Ok(Some(doc))
}

/// Serialize `doc` and atomically replace the file at `path` with it.
///
/// # Errors
///
/// [`RepoError::MalformedManifest`] if serialization fails, [`RepoError::Io`]
/// if the file cannot be published.
pub fn store(path: &Path, doc: &Document) -> Result<()> {
    let bytes = doc.to_bytes()?;
    io::write_atomic(path, &bytes)
}
