//! Import command
use crate::ui;
use anyhow::{Result, bail};
use std::path::PathBuf;
use swrepo_core::RepoConfig;

/// Import each file, reporting the part number it was stored under.
///
/// Every file is attempted; the command fails if any of them did.
pub fn import(config: &RepoConfig, files: &[PathBuf]) -> Result<()> {
    let mut repo = super::open(config)?;
    let reserved = config.reserved_pn.clone();
    let mut failed = 0;

    for file in files {
        match repo.import(file) {
            Ok(pn) if pn == reserved => ui::ok(pn, format!("{} (manifest)", file.display())),
            Ok(pn) => ui::ok(pn, file.display()),
            Err(e) => {
                failed += 1;
                ui::failed(file.display(), e);
            }
        }
    }

    let summary = ui::summary("imported", files.len() - failed, failed);
    if failed > 0 {
        bail!(summary);
    }
    tracing::debug!("{summary}");
    Ok(())
}
