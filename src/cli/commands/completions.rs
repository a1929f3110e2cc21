//! Completions command - generate shell completion scripts.
//!
//! Generates shell completion scripts that enable tab-completion of
//! git-global-log commands and options.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io;

/// Arguments for the completions command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    git-global-log completions bash > ~/.local/share/bash-completion/completions/git-global-log\n    \
    git-global-log completions zsh > ~/.zfunc/_git-global-log\n    \
    git-global-log completions fish > ~/.config/fish/completions/git-global-log.fish")]
pub struct Args {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Writes the completion script for `shell` to stdout.
///
/// Takes the clap Command from main.rs, which owns the Cli definition.
pub fn generate_completions(cmd: &mut Command, shell: Shell) {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, &mut io::stdout());
}
