//! Add command - record a commit in the global log.
//!
//! Resolves the reference in the current repository, gathers the commit's
//! metadata and inserts it. Adding a commit that is already recorded is a
//! silent success.

use anyhow::{anyhow, Result};

use git_global_log::config::Config;
use git_global_log::git::{Extractor, GitCli};
use git_global_log::storage::{Database, InsertOutcome, StoreError};

/// Printed after any store failure during `add`.
const STORE_HINT: &str = "Check database permissions and disk space";

/// Arguments for the add command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    git-global-log add HEAD          Record the current commit\n    \
    git-global-log add abc123        Record a commit by short hash\n    \
    git-global-log add v1.2.0        Record the commit a tag points to")]
pub struct Args {
    /// Commit to record (hash, branch, tag, or any git revision)
    #[arg(value_name = "COMMIT")]
    pub commit: String,
}

/// Executes the add command.
///
/// Extraction completes before the database is touched, so a failed git
/// query never leaves anything behind in the store.
pub fn run(args: Args, config: &Config) -> Result<()> {
    let extractor = Extractor::new(GitCli::new());
    let metadata = extractor.resolve_and_extract(&args.commit)?;

    let db = Database::open(&config.db_path).map_err(with_store_hint)?;
    match db.insert_commit(&metadata).map_err(with_store_hint)? {
        InsertOutcome::Inserted => {
            tracing::debug!(hash = %metadata.commit_hash, repo = %metadata.repo_path, "recorded commit");
        }
        InsertOutcome::AlreadyPresent => {
            tracing::debug!(hash = %metadata.commit_hash, "commit already recorded");
        }
    }

    Ok(())
}

fn with_store_hint(err: StoreError) -> anyhow::Error {
    anyhow!("{err}\n{STORE_HINT}")
}
