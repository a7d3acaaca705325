//! Pack command: build a load file for testing and authoring
use anyhow::{Context, Result};
use std::path::Path;
use swrepo_schema::{LoadImage, PartNumber, Sha256Digest};

/// Wrap `payload` in a load header for `pn` and write it to `output`.
pub fn pack(pn: &PartNumber, payload: &Path, output: &Path) -> Result<()> {
    let data = std::fs::read(payload)
        .with_context(|| format!("Failed to read payload {}", payload.display()))?;
    let load = LoadImage::encode(pn, &data);

    swrepo_core::io::write_atomic(output, &load)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{}", output.display());
    tracing::debug!(
        "Packed {pn}: {} byte payload, sha256 {}",
        data.len(),
        Sha256Digest::compute(&data)
    );
    Ok(())
}
