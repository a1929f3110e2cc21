use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::commands;
use git_global_log::config::{Config, DB_PATH_ENV};

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "git-global-log")]
#[command(version)]
#[command(about = "Record selected commits from any repository into one shared log")]
#[command(long_about = "git-global-log keeps a single SQLite log of commits picked from\n\
    any number of local repositories, so history can be queried across\n\
    all projects from one place.\n\n\
    Installed on PATH it can also be run as 'git global-log'.")]
#[command(after_help = "EXAMPLES:\n    \
    git-global-log add HEAD                 Record the current commit\n    \
    git-global-log drop HEAD                Remove it again\n    \
    git-global-log add HEAD --db-path x.db  Use a different log file\n\n\
    For more information about a command, run 'git-global-log <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the SQLite log
    #[arg(long, global = true, value_name = "PATH", env = DB_PATH_ENV)]
    #[arg(long_help = "Path to the SQLite log file. Defaults to db_path from\n\
        the config file, then ~/.local/share/git-commits/log.sqlite.")]
    db_path: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Record a commit in the log
    #[command(long_about = "Resolves the commit in the current repository and records\n\
        its hash, time, author, message, branch, repository path and\n\
        changed-file count. Adding a commit twice is harmless.")]
    Add(commands::add::Args),

    /// Remove a commit from the log
    #[command(long_about = "Deletes the commit's entry from the log. Reports whether\n\
        anything was removed; a missing entry is not an error.")]
    Drop(commands::drop::Args),

    /// Generate shell completion scripts
    Completions(commands::completions::Args),
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too and are not failures.
            // If the message cannot be written the exit code still reports it.
            err.print().ok();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging
    let filter = if cli.verbose {
        "git_global_log=debug"
    } else {
        "git_global_log=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Add(args) => commands::add::run(args, &resolve_config(cli.db_path)?),
        Commands::Drop(args) => commands::drop::run(args, &resolve_config(cli.db_path)?),
        Commands::Completions(args) => {
            commands::completions::generate_completions(&mut Cli::command(), args.shell);
            Ok(())
        }
    }
}

fn resolve_config(db_path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config = Config::resolve(db_path)?;
    tracing::debug!(db_path = %config.db_path.display(), "using commit log");
    Ok(config)
}
