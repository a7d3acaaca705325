//! swrepo - software load repository CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use swrepo_cli::cmd;
use swrepo_cli::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Import { files } => cmd::import::import(&cli.repo_config()?, files),
        Commands::Remove { pns } => cmd::remove::remove(&cli.repo_config()?, pns),
        Commands::List { json } => cmd::list::list(&cli.repo_config()?, *json),
        Commands::Path { pn } => cmd::path::path(&cli.repo_config()?, pn),
        Commands::Compat { pns, output } => {
            cmd::compat::compat(&cli.repo_config()?, pns, output.as_deref())
        }
        Commands::Show { json } => cmd::show::show(&cli.repo_config()?, *json),
        Commands::Verify { files } => cmd::verify::verify(files),
        Commands::Pack {
            pn,
            payload,
            output,
        } => cmd::pack::pack(pn, payload, output),
        Commands::Status => cmd::status::status(&cli.repo_config()?),
        Commands::Completions { shell } => {
            cmd::completions::completions(*shell);
            Ok(())
        }
    }
}
