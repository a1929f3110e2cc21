//! Drop command - remove a commit from the global log.
//!
//! The reference is resolved to a full hash when possible. Outside a
//! repository, or when git cannot resolve it, the argument is used as the
//! key verbatim. Removing a commit that is not in the log is not an error.

use anyhow::Result;
use colored::Colorize;

use git_global_log::config::Config;
use git_global_log::git::{Extractor, GitCli, GitError, VersionControlSource};
use git_global_log::storage::Database;

/// Arguments for the drop command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    git-global-log drop HEAD         Remove the current commit\n    \
    git-global-log drop 9f8e7d6c...  Remove by full hash (works anywhere)")]
pub struct Args {
    /// Commit to remove (any git revision, or a full hash)
    #[arg(value_name = "COMMIT")]
    #[arg(
        long_help = "The commit to remove. Inside a repository any revision git\n\
        understands is resolved first. Elsewhere the value must be the\n\
        full hash stored in the log."
    )]
    pub commit: String,
}

/// Executes the drop command.
pub fn run(args: Args, config: &Config) -> Result<()> {
    let Some(db) = Database::open_existing(&config.db_path)? else {
        println!("{}", "No commit log found".dimmed());
        return Ok(());
    };

    let key = lookup_key(&Extractor::new(GitCli::new()), &args.commit);

    if db.delete_commit(&key)? {
        println!("{} commit {}", "Removed".green(), key);
    } else {
        println!("Commit {} {}", key, "not found in log".yellow());
    }

    Ok(())
}

/// The hash to delete: the resolved reference, or the raw argument when
/// resolution is not possible.
fn lookup_key<S: VersionControlSource>(extractor: &Extractor<S>, reference: &str) -> String {
    match extractor.resolve(reference) {
        Ok(hash) => hash,
        Err(GitError::NotAGitRepository) => {
            tracing::debug!(reference, "not in a repository, using reference as-is");
            reference.to_string()
        }
        Err(err) => {
            tracing::warn!("{err}; trying '{reference}' as a stored hash");
            reference.to_string()
        }
    }
}
