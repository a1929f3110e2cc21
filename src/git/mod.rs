//! Git integration.
//!
//! Resolves commit references and gathers the metadata recorded in the
//! log. All access to git goes through [`VersionControlSource`]; the
//! production implementation is [`GitCli`], which shells out to `git`.

mod cli;

pub use cli::GitCli;

use std::collections::BTreeSet;

use crate::storage::CommitMetadata;

/// Abbreviated symbolic ref reported by git when HEAD is detached.
const DETACHED_HEAD: &str = "HEAD";

/// Errors that can occur while talking to git.
#[derive(Debug, thiserror::Error)]
pub enum GitError {
    /// The working directory is not inside a git repository.
    #[error("Not in a git repository")]
    NotAGitRepository,

    /// Git could not turn the reference into a commit.
    #[error("Cannot resolve '{reference}' to a commit: {detail}")]
    UnresolvableReference {
        /// The reference as given by the user.
        reference: String,
        /// Git's diagnostic output.
        detail: String,
    },

    /// A git query exited with a non-zero status or produced unusable output.
    #[error("Git command failed: {0}")]
    ExtractionFailed(String),

    /// The git executable could not be started.
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Descriptive fields of a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitFields {
    /// Commit time, seconds since the Unix epoch.
    pub timestamp: i64,
    pub author_name: String,
    pub author_email: String,
    /// Full message body.
    pub message: String,
}

/// The narrow set of queries the extractor needs from a version-control tool.
pub trait VersionControlSource {
    /// Whether the working directory is inside a repository.
    ///
    /// Fails only when the tool itself cannot be run.
    fn is_repository(&self) -> Result<bool, GitError>;

    /// Resolve any reference git accepts to the full commit hash.
    fn resolve_reference(&self, reference: &str) -> Result<String, GitError>;

    /// Read timestamp, author and message for a resolved hash.
    fn read_commit_fields(&self, hash: &str) -> Result<CommitFields, GitError>;

    /// Absolute path of the repository's top-level directory.
    fn repository_root(&self) -> Result<String, GitError>;

    /// Paths touched by the commit relative to its parent(s).
    ///
    /// May contain duplicates for merge commits.
    fn read_changed_paths(&self, hash: &str) -> Result<Vec<String>, GitError>;

    /// Abbreviated symbolic name of HEAD (`"HEAD"` when detached).
    fn read_current_symbolic_ref(&self) -> Result<String, GitError>;
}

/// Builds [`CommitMetadata`] from a [`VersionControlSource`].
pub struct Extractor<S> {
    source: S,
}

impl<S: VersionControlSource> Extractor<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Resolve a user-supplied reference to its canonical commit hash.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotAGitRepository`] outside a repository,
    /// [`GitError::UnresolvableReference`] when git does not know the
    /// reference and [`GitError::Spawn`] when git cannot be started.
    pub fn resolve(&self, reference: &str) -> Result<String, GitError> {
        if !self.source.is_repository()? {
            return Err(GitError::NotAGitRepository);
        }

        // Would otherwise be parsed as an option by git.
        if reference.is_empty() || reference.starts_with('-') {
            return Err(GitError::UnresolvableReference {
                reference: reference.to_string(),
                detail: "not a valid revision".to_string(),
            });
        }

        self.source
            .resolve_reference(reference)
            .map_err(|err| GitError::UnresolvableReference {
                reference: reference.to_string(),
                detail: match err {
                    GitError::ExtractionFailed(detail) if !detail.is_empty() => detail,
                    GitError::ExtractionFailed(_) => "unknown revision".to_string(),
                    other => other.to_string(),
                },
            })
    }

    /// Gather everything recorded for an already-resolved commit.
    ///
    /// Either every query succeeds or the whole extraction fails; a
    /// partially filled record is never returned.
    pub fn extract(&self, hash: &str) -> Result<CommitMetadata, GitError> {
        let fields = self.source.read_commit_fields(hash)?;
        let repo_path = self.source.repository_root()?;
        let changed: BTreeSet<String> = self
            .source
            .read_changed_paths(hash)?
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();
        let symbolic = self.source.read_current_symbolic_ref()?;

        let branch_name = match symbolic.trim() {
            DETACHED_HEAD => None,
            name => Some(name.to_string()),
        };

        let files_changed = u32::try_from(changed.len()).map_err(|_| {
            GitError::ExtractionFailed(format!("too many changed paths in {hash}"))
        })?;

        Ok(CommitMetadata {
            commit_hash: hash.to_string(),
            timestamp: fields.timestamp,
            repo_path,
            commit_message: fields.message,
            author_name: fields.author_name,
            author_email: fields.author_email,
            branch_name,
            files_changed,
        })
    }

    /// Resolve `reference` and extract its metadata in one step.
    pub fn resolve_and_extract(&self, reference: &str) -> Result<CommitMetadata, GitError> {
        let hash = self.resolve(reference)?;
        tracing::debug!(reference, %hash, "resolved reference");
        self.extract(&hash)
    }
}
