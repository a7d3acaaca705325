//! Subcommand implementations.

pub mod compat;
pub mod completions;
pub mod import;
pub mod list;
pub mod pack;
pub mod path;
pub mod remove;
pub mod show;
pub mod status;
pub mod verify;

use anyhow::{Context, Result};
use swrepo_core::{RepoConfig, Repository};

/// Open the repository, attaching its location to any error.
pub(crate) fn open(config: &RepoConfig) -> Result<Repository> {
    Repository::open(config.clone())
        .with_context(|| format!("Failed to open repository at {}", config.root.display()))
}
