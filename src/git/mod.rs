//! Local git operations for inspecting a pull request.
//!
//! This module implements the checkout collaborator the event pipeline
//! depends on:
//! - Scratch working-copy management (reset before clone, removed on drop)
//! - Fetching a PR's head ref
//! - Diffing the changed paths between two revisions
//! - Detached checkout of a specific revision
//!
//! All commands run with a clean git environment (no system/user config) for
//! consistent behavior across machines, and with terminal prompts disabled.

use std::path::{Path, PathBuf};
use std::process::Output;

use thiserror::Error;
use tracing::debug;

use crate::types::{PrNumber, RepoId, Sha};

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command failed.
    #[error("git command failed: {command}\nstderr: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for git operations.
pub type GitResult<T> = Result<T, GitError>;

/// Create a git Command with clean environment (no system/user config).
pub(crate) fn git_command(workdir: &Path) -> std::process::Command {
    use std::process::Command;

    let mut cmd = Command::new("git");
    cmd.current_dir(workdir);

    // Disable system and user config for reproducible behavior
    cmd.env("GIT_CONFIG_NOSYSTEM", "1");
    cmd.env("GIT_CONFIG_GLOBAL", "/dev/null");

    // Disable terminal prompts
    cmd.env("GIT_TERMINAL_PROMPT", "0");

    cmd
}

/// Run a git command in the given working directory.
///
/// Returns the command output on success, or a GitError on failure.
pub fn run_git_sync(workdir: &Path, args: &[&str]) -> GitResult<Output> {
    let output = git_command(workdir).args(args).output()?;

    if output.status.success() {
        Ok(output)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let command = format!("git {}", args.join(" "));
        Err(GitError::CommandFailed { command, stderr })
    }
}

/// Run a git command and return stdout as a string.
pub fn run_git_stdout(workdir: &Path, args: &[&str]) -> GitResult<String> {
    let output = run_git_sync(workdir, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Get the SHA of a revision.
pub fn rev_parse(workdir: &Path, rev: &str) -> GitResult<Sha> {
    let sha_str = run_git_stdout(workdir, &["rev-parse", rev])?;
    Sha::parse(&sha_str).map_err(|invalid| GitError::CommandFailed {
        command: format!("git rev-parse {}", rev),
        stderr: invalid.to_string(),
    })
}

/// A working copy of a repository, cloned into scratch space for the
/// duration of one event.
///
/// The scratch location is shared across events and reset before every
/// clone. The working copy is removed unconditionally when the checkout is
/// dropped, on every exit path of event processing.
#[derive(Debug)]
pub struct ScratchCheckout {
    workdir: PathBuf,
}

impl ScratchCheckout {
    /// Resets the scratch slot for `repo` and clones it from
    /// `<clone_base>/<owner>/<repo>`.
    ///
    /// `clone_base` is normally `https://github.com`, but any base a `git
    /// clone` accepts works (a local directory in tests, a GitHub Enterprise
    /// host in production).
    pub fn clone(scratch_dir: &Path, repo: &RepoId, clone_base: &str) -> GitResult<Self> {
        let dir_name = format!("{}-{}", repo.owner, repo.repo);
        let workdir = scratch_dir.join(&dir_name);

        // Reset the scratch slot before cloning
        if workdir.exists() {
            std::fs::remove_dir_all(&workdir)?;
        }
        std::fs::create_dir_all(scratch_dir)?;

        let url = format!("{}/{}/{}", clone_base, repo.owner, repo.repo);
        debug!(%repo, %url, "cloning");
        run_git_sync(scratch_dir, &["clone", "--quiet", &url, &dir_name])?;

        Ok(ScratchCheckout { workdir })
    }

    /// Returns the path to the working copy's root.
    pub fn path(&self) -> &Path {
        &self.workdir
    }

    /// Fetches a pull request's head ref (`refs/pull/<n>/head`) from origin.
    pub fn fetch_pull_request(&self, pr: PrNumber) -> GitResult<()> {
        let refspec = format!("refs/pull/{}/head", pr.0);
        run_git_sync(&self.workdir, &["fetch", "--quiet", "origin", &refspec])?;
        Ok(())
    }

    /// Returns the paths changed between two revisions, one per diff entry.
    pub fn changed_paths(&self, base: &Sha, head: &Sha) -> GitResult<Vec<String>> {
        let stdout = run_git_stdout(
            &self.workdir,
            &["diff", "--name-only", base.as_str(), head.as_str()],
        )?;
        Ok(stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect())
    }

    /// Checks out a specific revision in detached HEAD mode.
    pub fn checkout(&self, rev: &Sha) -> GitResult<()> {
        run_git_sync(
            &self.workdir,
            &["checkout", "--quiet", "--detach", rev.as_str()],
        )?;
        Ok(())
    }
}

impl Drop for ScratchCheckout {
    fn drop(&mut self) {
        // Best-effort release of the working copy; a leftover directory is
        // reset by the next clone of the same repo anyway.
        let _ = std::fs::remove_dir_all(&self.workdir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Creates a local origin repo at `<root>/<owner>/<repo>` with two
    /// commits and a PR ref pointing at the second. Returns (base, head).
    fn make_origin(root: &Path, repo: &RepoId, pr: PrNumber) -> (Sha, Sha) {
        let origin = root.join(&repo.owner).join(&repo.repo);
        std::fs::create_dir_all(&origin).unwrap();

        run_git_sync(&origin, &["init", "--quiet", "--initial-branch=master"]).unwrap();
        let identity = [
            "-c",
            "user.name=test",
            "-c",
            "user.email=test@example.com",
        ];

        std::fs::write(origin.join("file.txt"), "base\n").unwrap();
        run_git_sync(&origin, &["add", "."]).unwrap();
        let mut commit = identity.to_vec();
        commit.extend(["commit", "--quiet", "-m", "base"]);
        run_git_sync(&origin, &commit).unwrap();
        let base = rev_parse(&origin, "HEAD").unwrap();

        std::fs::write(origin.join("file.txt"), "head\n").unwrap();
        std::fs::write(origin.join("other.txt"), "added\n").unwrap();
        run_git_sync(&origin, &["add", "."]).unwrap();
        let mut commit = identity.to_vec();
        commit.extend(["commit", "--quiet", "-m", "head"]);
        run_git_sync(&origin, &commit).unwrap();
        let head = rev_parse(&origin, "HEAD").unwrap();

        // Simulate GitHub's PR ref
        let pr_ref = format!("refs/pull/{}/head", pr.0);
        run_git_sync(&origin, &["update-ref", &pr_ref, head.as_str()]).unwrap();

        (base, head)
    }

    #[test]
    fn clone_fetch_diff_checkout() {
        let origin_root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let repo = RepoId::new("org", "repo");
        let pr = PrNumber(7);

        let (base, head) = make_origin(origin_root.path(), &repo, pr);

        let clone_base = origin_root.path().to_str().unwrap();
        let checkout = ScratchCheckout::clone(scratch.path(), &repo, clone_base).unwrap();
        checkout.fetch_pull_request(pr).unwrap();

        let changed = checkout.changed_paths(&base, &head).unwrap();
        assert_eq!(changed, vec!["file.txt".to_string(), "other.txt".to_string()]);

        checkout.checkout(&base).unwrap();
        assert_eq!(
            std::fs::read_to_string(checkout.path().join("file.txt")).unwrap(),
            "base\n"
        );
        assert!(!checkout.path().join("other.txt").exists());

        checkout.checkout(&head).unwrap();
        assert_eq!(
            std::fs::read_to_string(checkout.path().join("file.txt")).unwrap(),
            "head\n"
        );
    }

    #[test]
    fn drop_removes_working_copy() {
        let origin_root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let repo = RepoId::new("org", "repo");
        make_origin(origin_root.path(), &repo, PrNumber(1));

        let clone_base = origin_root.path().to_str().unwrap();
        let workdir = {
            let checkout = ScratchCheckout::clone(scratch.path(), &repo, clone_base).unwrap();
            assert!(checkout.path().exists());
            checkout.path().to_path_buf()
        };

        assert!(!workdir.exists());
    }

    #[test]
    fn clone_resets_a_stale_scratch_slot() {
        let origin_root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let repo = RepoId::new("org", "repo");
        make_origin(origin_root.path(), &repo, PrNumber(1));

        // Leave debris where the clone wants to go
        let slot = scratch.path().join("org-repo");
        std::fs::create_dir_all(&slot).unwrap();
        std::fs::write(slot.join("stale.txt"), "leftover").unwrap();

        let clone_base = origin_root.path().to_str().unwrap();
        let checkout = ScratchCheckout::clone(scratch.path(), &repo, clone_base).unwrap();

        assert!(!checkout.path().join("stale.txt").exists());
        assert!(checkout.path().join("file.txt").exists());
    }

    #[test]
    fn clone_of_missing_repo_fails() {
        let origin_root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let repo = RepoId::new("no-such", "repo");

        let clone_base = origin_root.path().to_str().unwrap();
        let result = ScratchCheckout::clone(scratch.path(), &repo, clone_base);
        assert!(matches!(result, Err(GitError::CommandFailed { .. })));
    }

    #[test]
    fn changed_paths_identical_revisions_is_empty() {
        let origin_root = tempdir().unwrap();
        let scratch = tempdir().unwrap();
        let repo = RepoId::new("org", "repo");
        let (base, _head) = make_origin(origin_root.path(), &repo, PrNumber(1));

        let clone_base = origin_root.path().to_str().unwrap();
        let checkout = ScratchCheckout::clone(scratch.path(), &repo, clone_base).unwrap();

        assert!(checkout.changed_paths(&base, &base).unwrap().is_empty());
    }
}
