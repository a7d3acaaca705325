//! Remove command
use crate::ui;
use anyhow::{Result, bail};
use swrepo_core::{PartNumber, RepoConfig};

/// Remove loads by part number
pub fn remove(config: &RepoConfig, pns: &[PartNumber]) -> Result<()> {
    let mut repo = super::open(config)?;
    let mut failed = 0;

    for pn in pns {
        match repo.remove(pn) {
            Ok(path) => ui::ok(pn, path.display()),
            Err(e) => {
                failed += 1;
                ui::failed(pn, e);
            }
        }
    }

    if failed > 0 {
        bail!(ui::summary("removed", pns.len() - failed, failed));
    }
    Ok(())
}
