//! GitHub webhook event types.
//!
//! This module defines the typed representation of the one webhook event the
//! bot handles: `pull_request`. The event carries everything the pipeline
//! needs - the base and head revisions to diff, the PR number for fetching
//! the PR ref, and the delivery GUID used as the idempotency token for the
//! job runs it produces.

use serde::{Deserialize, Serialize};

use crate::types::{DeliveryId, PrNumber, RepoId, Sha};

/// Action performed on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    /// PR was opened.
    Opened,
    /// PR was closed (merged or not).
    Closed,
    /// PR was edited (title, body, or base branch changed).
    Edited,
    /// PR head was updated (new commits pushed).
    Synchronize,
    /// PR was reopened.
    Reopened,
}

impl PrAction {
    /// Returns true if this action should trigger job evaluation.
    ///
    /// Only `opened`, `edited`, and `synchronize` change what should run;
    /// everything else is ignored with no side effects.
    pub fn should_trigger(&self) -> bool {
        matches!(self, PrAction::Opened | PrAction::Edited | PrAction::Synchronize)
    }
}

/// A pull request event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    /// The repository the PR belongs to.
    pub repo: RepoId,

    /// The action that triggered this event.
    pub action: PrAction,

    /// The PR number.
    pub pr_number: PrNumber,

    /// The SHA of the PR's base revision (what the PR merges into).
    pub base_sha: Sha,

    /// The current head SHA of the PR branch.
    pub head_sha: Sha,

    /// The base branch name (e.g., "main").
    pub base_branch: String,

    /// The webhook delivery GUID, used as the idempotency token when naming
    /// the job runs this event produces.
    pub delivery: DeliveryId,
}
