//! Show command: consolidated manifest as SOFTWARE → LRU rows
use anyhow::{Context, Result};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use swrepo_core::RepoConfig;

/// Print every `SOFTWARE` entry of the consolidated manifest with its
/// compatible modules.
pub fn show(config: &RepoConfig, json: bool) -> Result<()> {
    let repo = super::open(config)?;
    let entries = repo
        .compatibility()
        .context("Failed to read compatibility manifest")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if !repo.has_manifest() {
        println!();
        println!("  No compatibility manifest imported.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["software", "lru", "lru pn"]);

    let dash = || "-".to_string();
    for entry in &entries {
        if entry.lrus.is_empty() {
            table.add_row(vec![entry.part_number.clone(), dash(), dash()]);
        }
        for lru in &entry.lrus {
            table.add_row(vec![
                entry.part_number.clone(),
                lru.name.clone().unwrap_or_else(dash),
                lru.part_number.clone().unwrap_or_else(dash),
            ]);
        }
    }

    println!("{table}");
    Ok(())
}
