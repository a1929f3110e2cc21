//! [`VersionControlSource`] backed by the `git` executable.

use std::path::PathBuf;
use std::process::Command;

use super::{CommitFields, GitError, VersionControlSource};

/// Separator between fields in the `git show` format string.
const FIELD_SEP: char = '\0';

/// Runs `git` as a subprocess, either in the process's current directory
/// or in an explicit one.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    workdir: Option<PathBuf>,
}

impl GitCli {
    /// Query the repository containing the current directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query the repository containing `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: Some(dir.into()),
        }
    }

    /// Run git and return its stdout; a non-zero exit becomes
    /// [`GitError::ExtractionFailed`] carrying stderr.
    fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd.output()?;
        tracing::debug!(?args, status = %output.status, "git");

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::ExtractionFailed(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl VersionControlSource for GitCli {
    fn is_repository(&self) -> Result<bool, GitError> {
        match self.run(&["rev-parse", "--git-dir"]) {
            Ok(_) => Ok(true),
            Err(GitError::ExtractionFailed(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn resolve_reference(&self, reference: &str) -> Result<String, GitError> {
        let peeled = format!("{reference}^{{commit}}");
        let hash = self.run(&["rev-parse", "--verify", "--quiet", &peeled])?;
        let hash = hash.trim();
        if hash.is_empty() {
            return Err(GitError::ExtractionFailed(format!(
                "'{reference}' did not resolve to a commit"
            )));
        }
        Ok(hash.to_string())
    }

    fn read_commit_fields(&self, hash: &str) -> Result<CommitFields, GitError> {
        let out = self.run(&[
            "show",
            "-s",
            "--no-show-signature",
            "--format=%at%x00%an%x00%ae%x00%B",
            hash,
        ])?;
        parse_commit_fields(&out)
    }

    fn repository_root(&self) -> Result<String, GitError> {
        Ok(self.run(&["rev-parse", "--show-toplevel"])?.trim().to_string())
    }

    fn read_changed_paths(&self, hash: &str) -> Result<Vec<String>, GitError> {
        let out = self.run(&[
            "diff-tree",
            "--no-commit-id",
            "--name-only",
            "-r",
            "-z",
            "--root",
            "-m",
            hash,
        ])?;
        Ok(out
            .split(FIELD_SEP)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn read_current_symbolic_ref(&self) -> Result<String, GitError> {
        Ok(self
            .run(&["rev-parse", "--abbrev-ref", "HEAD"])?
            .trim()
            .to_string())
    }
}

/// Split the NUL-separated `%at %an %ae %B` output of `git show`.
fn parse_commit_fields(out: &str) -> Result<CommitFields, GitError> {
    let mut parts = out.splitn(4, FIELD_SEP);
    let (Some(ts), Some(name), Some(email), Some(message)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(GitError::ExtractionFailed(
            "unexpected output from git show".to_string(),
        ));
    };

    let timestamp = ts.trim().parse::<i64>().map_err(|_| {
        GitError::ExtractionFailed(format!("invalid commit timestamp '{}'", ts.trim()))
    })?;

    Ok(CommitFields {
        timestamp,
        author_name: name.to_string(),
        author_email: email.to_string(),
        message: message.trim().to_string(),
    })
}
