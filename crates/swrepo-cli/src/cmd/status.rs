//! Status command
use crate::ui;
use anyhow::Result;
use crossterm::style::Stylize;
use swrepo_core::RepoConfig;

/// Summarize where the repository lives and what it holds
pub fn status(config: &RepoConfig) -> Result<()> {
    let repo = super::open(config)?;

    ui::section("Repository status");
    ui::field("Version:", env!("SWREPO_VERSION"));
    ui::field("Root:", config.root.display());

    let manifest = if repo.has_manifest() {
        match repo.compatibility() {
            Ok(entries) => format!("{} SOFTWARE entries", entries.len()),
            Err(e) => format!("unreadable ({e})").red().to_string(),
        }
    } else {
        "Not found".to_string()
    };
    ui::field("Manifest:", manifest);
    ui::field("Loads:", format!("{} imported", repo.len()));
    ui::field("Output:", config.filtered_output.display());

    println!();
    Ok(())
}
