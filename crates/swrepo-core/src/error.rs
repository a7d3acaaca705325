//! Error taxonomy for repository operations.

use std::path::PathBuf;
use swrepo_schema::{LoadError, PartNumber, XmlError};
use thiserror::Error;

/// Result alias used throughout `swrepo-core`.
pub type Result<T, E = RepoError> = std::result::Result<T, E>;

/// Everything a repository operation can fail with.
///
/// Validation and merge failures never leave partial state behind: the
/// operation is aborted before anything is published.
#[derive(Error, Debug)]
pub enum RepoError {
    /// Load decoding or checksum failure (`TooShort`, `ChecksumMismatch`).
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Missing root, `SOFTWARE` element or `PN` attribute, or a stored
    /// manifest that no longer parses.
    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),

    /// Unknown part number.
    #[error("Part number not found: {0}")]
    NotFound(PartNumber),

    /// Attempt to remove the reserved compatibility manifest entry.
    #[error("Part number {0} is reserved for the compatibility manifest")]
    Protected(PartNumber),

    /// A filtered manifest was aimed at the consolidated manifest or a
    /// stored load.
    #[error("Refusing to overwrite repository file {}", .0.display())]
    StoredPath(PathBuf),

    /// A filter request named no part numbers.
    #[error("No part numbers selected")]
    EmptySelection,

    /// Open/read/write/rename failure.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Configuration could not be resolved or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RepoError {
    /// Attach the path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap an XML error as a malformed manifest.
    pub fn malformed(err: impl std::fmt::Display) -> Self {
        Self::MalformedManifest(err.to_string())
    }
}

impl From<XmlError> for RepoError {
    fn from(err: XmlError) -> Self {
        Self::malformed(err)
    }
}
