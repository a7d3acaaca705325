//! Compat command: publish a filtered compatibility manifest
use anyhow::{Context, Result};
use std::path::Path;
use swrepo_core::RepoConfig;

/// Publish the consolidated manifest restricted to `pns` and print where it
/// was written.
pub fn compat(config: &RepoConfig, pns: &[String], output: Option<&Path>) -> Result<()> {
    let repo = super::open(config)?;

    let path = match output {
        Some(dest) => {
            repo.write_filtered_manifest(pns, dest)
                .with_context(|| format!("Failed to write {}", dest.display()))?;
            dest.to_path_buf()
        }
        None => repo
            .filtered_manifest_path(pns)
            .context("Failed to publish filtered manifest")?,
    };

    println!("{}", path.display());
    Ok(())
}
