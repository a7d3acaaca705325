//! swrepo - software load repository
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Command-line front end for [`swrepo_core::Repository`].
//!
//! # Directory Layout
//!
//! ```text
//! ~/.swrepo/
//! └── images/
//!     ├── compatibility.xml   # Consolidated compatibility manifest
//!     ├── <PN>.bin            # Imported loads, one per part number
//!     └── out/
//!         └── compatibility.xml   # Last published filtered manifest
//! ```

pub mod cmd;
pub mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use swrepo_core::{PartNumber, RepoConfig};

#[derive(Debug, Parser)]
#[command(name = "swrepo")]
#[command(author, version = env!("SWREPO_VERSION"), about = "swrepo - software load repository")]
pub struct Cli {
    /// Repository directory (overrides the config file)
    #[arg(long, global = true, env = "SWREPO_ROOT")]
    pub root: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true, env = "SWREPO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Resolve the repository configuration: environment defaults, then the
    /// config file, then `--root`.
    pub fn repo_config(&self) -> Result<RepoConfig> {
        let mut config = RepoConfig::from_env().context("Failed to resolve repository location")?;
        if let Some(path) = &self.config {
            config = config
                .merge_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
        }
        if let Some(root) = &self.root {
            config = config.with_root(root);
        }
        tracing::debug!("Using repository at {}", config.root.display());
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import loads and compatibility manifests
    Import {
        /// Load (.bin) or manifest (.xml) files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove loads from the repository
    Remove {
        /// Part numbers (8 hex digits)
        #[arg(required = true)]
        pns: Vec<PartNumber>,
    },
    /// List imported loads
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the stored path of a part number
    Path {
        /// Part number (8 hex digits)
        pn: PartNumber,
    },
    /// Publish a compatibility manifest restricted to some part numbers
    Compat {
        /// Part numbers to keep
        #[arg(required = true)]
        pns: Vec<String>,
        /// Write here instead of the configured output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the consolidated compatibility manifest
    Show {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check files without importing them
    Verify {
        /// Files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Build a load file from a raw payload (for load authoring)
    #[command(hide = true)]
    Pack {
        /// Part number to embed
        #[arg(long)]
        pn: PartNumber,
        /// Payload file
        payload: PathBuf,
        /// Output load file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show repository status
    Status,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
