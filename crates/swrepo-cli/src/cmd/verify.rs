//! Verify command: classify files without touching the repository
use crate::ui;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use swrepo_core::{Compatibility, Imported, classify};

/// Check that each file would import, and say what it would import as.
pub fn verify(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    for file in files {
        match describe(file) {
            Ok(what) => ui::ok(file.display(), what),
            Err(e) => {
                failed += 1;
                ui::failed(file.display(), format!("{e:#}"));
            }
        }
    }

    if failed > 0 {
        bail!(ui::summary("valid", files.len() - failed, failed));
    }
    Ok(())
}

fn describe(file: &Path) -> Result<String> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let what = match classify(&bytes)? {
        Imported::Manifest(doc) => {
            format!("manifest, {} SOFTWARE entries", Compatibility::collect(&doc).len())
        }
        Imported::Load(image) => format!(
            "load {}, {} byte payload, sha256 {}",
            image.part_number(),
            image.payload().len(),
            image.digest()
        ),
    };
    Ok(what)
}
