//! List command
use anyhow::Result;
use crossterm::style::Stylize;
use serde::Serialize;
use std::path::PathBuf;
use swrepo_core::RepoConfig;

#[derive(Debug, Serialize)]
struct ListEntry {
    part_number: String,
    path: PathBuf,
    size: Option<u64>,
}

/// List imported loads in part number order
pub fn list(config: &RepoConfig, json: bool) -> Result<()> {
    let repo = super::open(config)?;

    let entries: Vec<ListEntry> = repo
        .list()
        .into_iter()
        .filter_map(|pn| {
            let path = repo.path(&pn).ok()?;
            let size = std::fs::metadata(&path).ok().map(|m| m.len());
            Some(ListEntry {
                part_number: pn.to_string(),
                path,
                size,
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if repo.is_empty() {
        println!();
        println!("  No loads imported.");
        println!("  Run 'swrepo import <FILE>' to get started.");
        return Ok(());
    }

    println!();
    let header = format!("  {:<10} {:>10}   {}", "pn", "size", "path");
    println!("{}", header.dark_grey());
    let mut total: u64 = 0;
    for entry in &entries {
        let size = entry.size.unwrap_or_default();
        total += size;
        let pn_part = format!("{:<10}", entry.part_number);
        println!(
            "  {} {:>10}   {}",
            pn_part.cyan(),
            size,
            entry.path.display().to_string().dark_grey()
        );
    }
    println!();
    println!(
        "{}",
        format!("  {} loads, {total} bytes", entries.len()).dark_grey()
    );
    Ok(())
}
