//! Core library for swrepo.
//!
//! A [`Repository`] keeps a directory of software loads indexed by part
//! number, together with one consolidated compatibility manifest that
//! imported XML fragments are merged into.

pub mod config;
pub mod error;
pub mod index;
pub mod io;
pub mod manifest;
pub mod paths;
pub mod repository;
pub mod validator;

pub use config::RepoConfig;
pub use error::{RepoError, Result};
pub use index::RepositoryIndex;
pub use manifest::MergeOutcome;
pub use repository::Repository;
pub use validator::{classify, Imported};

// Schema types that appear in the public API
pub use swrepo_schema::{Compatibility, Document, LoadError, LoadImage, PartNumber};
