//! Local git queries.

use std::path::Path;
use std::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Could not run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {args} failed: {stderr}")]
    Failed { args: String, stderr: String },

    #[error("HEAD is detached; check out a branch first")]
    DetachedHead,
}

/// Name of the branch checked out in `repo`.
pub fn current_branch(repo: &Path) -> Result<String, GitError> {
    let branch = run(repo, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    if branch == "HEAD" {
        return Err(GitError::DetachedHead);
    }
    Ok(branch)
}

fn run(repo: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git").args(args).current_dir(repo).output()?;
    if !output.status.success() {
        return Err(GitError::Failed {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
