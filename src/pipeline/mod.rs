//! Per-event orchestration: from a parsed pull request event to emitted job
//! runs.
//!
//! The pipeline is synchronous and strictly sequential; one event is fully
//! processed before control returns to the caller. Unrecoverable setup
//! failures (clone, fetch, diff, checkout, an invalid path pattern) abort
//! the event with an [`EventError`] that the caller logs and drops; per-item
//! failures (one config file, one record write) are absorbed inside the
//! loader and sink. The scratch working copy is released on every exit path
//! via [`ScratchCheckout`]'s `Drop`.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::git::{GitError, ScratchCheckout};
use crate::jobs::{materialize, write_jobs};
use crate::pathfilter::filter_by_pattern;
use crate::presubmits::{load_snapshot, squash};
use crate::webhooks::PullRequestEvent;

/// Caller-supplied configuration for the event pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Path of the shared global config, relative to the repository root.
    pub global_config_path: PathBuf,

    /// Glob pattern identifying job-config files (e.g., `jobs/*.yaml`).
    pub job_config_pattern: String,

    /// Scratch directory for working copies; reset per repo before cloning.
    pub scratch_dir: PathBuf,

    /// Directory job-run documents are written into.
    pub output_dir: PathBuf,

    /// The default branch name used as the base ref of attached source
    /// references (e.g., `master`).
    pub default_branch: String,

    /// Base URL (or local path) repositories are cloned from. Normally
    /// `https://github.com`.
    pub clone_base: String,
}

/// Errors that abort processing of one event.
///
/// These never crash the host process: the supervising call site logs the
/// error and drops the event (no retry, no dead-letter).
#[derive(Debug, Error)]
pub enum EventError {
    /// Git setup failed (clone, fetch, diff, or checkout).
    #[error("git error: {0}")]
    Git(#[from] GitError),

    /// The configured job-config pattern is not a valid glob.
    #[error("invalid job config pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// What processing an event amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The action is not in the allow-list; nothing was done.
    Ignored,

    /// The PR does not touch any job-config files; nothing was done beyond
    /// the diff.
    NoConfigChanges,

    /// Job runs were materialized and emitted.
    Triggered {
        /// Number of job-run documents written.
        jobs: usize,
    },
}

/// Processes one pull request event to completion.
///
/// Flow: action allow-list -> clone + fetch PR -> diff base..head -> filter
/// to config paths -> load head and base snapshots -> squash -> materialize
/// -> emit.
#[instrument(skip_all, fields(repo = %event.repo, pr = %event.pr_number, action = ?event.action))]
pub fn process_event(
    event: &PullRequestEvent,
    config: &PipelineConfig,
) -> Result<EventOutcome, EventError> {
    if !event.action.should_trigger() {
        debug!("nothing to do for this action");
        return Ok(EventOutcome::Ignored);
    }

    let checkout = ScratchCheckout::clone(&config.scratch_dir, &event.repo, &config.clone_base)?;
    checkout.fetch_pull_request(event.pr_number)?;

    let changed = checkout.changed_paths(&event.base_sha, &event.head_sha)?;
    let config_paths = filter_by_pattern(&changed, &config.job_config_pattern)?;
    if config_paths.is_empty() {
        info!("no job configs were modified - nothing to do");
        return Ok(EventOutcome::NoConfigChanges);
    }
    debug!(paths = ?config_paths, "modified job configs");

    checkout.checkout(&event.head_sha)?;
    let head = load_snapshot(checkout.path(), &config.global_config_path, &config_paths);

    checkout.checkout(&event.base_sha)?;
    let base = load_snapshot(checkout.path(), &config.global_config_path, &config_paths);

    let squashed = squash(&base, &head);
    let runs = materialize(&squashed, event, &config.default_branch);
    let jobs = write_jobs(&config.output_dir, &runs);

    info!(jobs, "event processed");
    Ok(EventOutcome::Triggered { jobs })
}
