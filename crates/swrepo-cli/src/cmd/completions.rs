//! Shell completions
use crate::Cli;
use clap::CommandFactory;
use clap_complete::{Shell, generate};

/// Write completions for `shell` to stdout
pub fn completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "swrepo", &mut std::io::stdout());
}
