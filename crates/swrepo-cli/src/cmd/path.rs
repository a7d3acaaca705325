//! Path command
use anyhow::Result;
use swrepo_core::{PartNumber, RepoConfig};

/// Print the stored path of a part number, unstyled so scripts can use it.
pub fn path(config: &RepoConfig, pn: &PartNumber) -> Result<()> {
    let repo = super::open(config)?;
    println!("{}", repo.path(pn)?.display());
    Ok(())
}
