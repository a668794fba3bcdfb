//! Job-run record types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::presubmits::Presubmit;
use crate::types::{DeliveryId, PrNumber, Sha};
use crate::webhooks::PullRequestEvent;

/// A reference to a source repository a job run checks out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Repository owner.
    pub org: String,

    /// Repository name.
    pub repo: String,

    /// Browsable link to the repository.
    pub repo_link: String,

    /// The ref checked out as the base (e.g., `refs/heads/master`).
    pub base_ref: String,

    /// Clone depth for the checkout.
    pub clone_depth: u32,

    /// Whether this ref is the primary checkout (the job's working
    /// directory). Exactly one ref per run carries this flag.
    pub workdir: bool,
}

/// One job run to be executed, bound to the pull request event that
/// triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRun {
    /// Generated record name, unique per (repo, job, delivery). Also the
    /// file stem the sink writes this record under.
    pub name: String,

    /// The presubmit's job name.
    pub job: String,

    /// Labels resolved from the presubmit spec.
    pub labels: BTreeMap<String, String>,

    /// Maximum number of concurrent runs of this job.
    pub max_concurrency: u32,

    /// The task definition executed by the job runner. Opaque to the bot.
    pub task: serde_yaml::Value,

    /// The triggering pull request.
    pub pr_number: PrNumber,

    /// The base revision the PR merges into.
    pub base_sha: Sha,

    /// The webhook delivery GUID (idempotency token). Re-delivering the
    /// same event regenerates the same record names.
    pub delivery: DeliveryId,

    /// When this record was constructed.
    pub created_at: DateTime<Utc>,

    /// Source references; exactly one is the primary checkout.
    pub refs: Vec<SourceRef>,
}

impl JobRun {
    /// Builds the base record for one presubmit triggered by `event`, before
    /// any source reference is attached.
    ///
    /// The generated name is deterministic over (repo, job, PR, delivery),
    /// so reprocessing the same delivery overwrites rather than duplicates.
    pub fn from_presubmit(presubmit: &Presubmit, repo_key: &str, event: &PullRequestEvent) -> Self {
        let name = format!(
            "{}-{}-pr{}-{}",
            repo_key.replace('/', "-"),
            presubmit.name,
            event.pr_number.0,
            event.delivery.short(),
        );

        JobRun {
            name,
            job: presubmit.name.clone(),
            labels: presubmit.spec.labels.clone(),
            max_concurrency: presubmit.spec.max_concurrency,
            task: presubmit.spec.task.clone(),
            pr_number: event.pr_number,
            base_sha: event.base_sha.clone(),
            delivery: event.delivery.clone(),
            created_at: Utc::now(),
            refs: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presubmits::JobSpec;
    use crate::types::RepoId;
    use crate::webhooks::PrAction;

    fn event() -> PullRequestEvent {
        PullRequestEvent {
            repo: RepoId::new("org", "repo"),
            action: PrAction::Opened,
            pr_number: PrNumber(42),
            base_sha: Sha::parse("a".repeat(40)).unwrap(),
            head_sha: Sha::parse("b".repeat(40)).unwrap(),
            base_branch: "master".to_string(),
            delivery: DeliveryId::new("550e8400-e29b-41d4-a716-446655440000"),
        }
    }

    fn presubmit(name: &str) -> Presubmit {
        Presubmit {
            name: name.to_string(),
            spec: JobSpec::with_concurrency(2),
        }
    }

    #[test]
    fn generated_name_is_deterministic() {
        let a = JobRun::from_presubmit(&presubmit("unit-tests"), "foo/bar", &event());
        let b = JobRun::from_presubmit(&presubmit("unit-tests"), "foo/bar", &event());
        assert_eq!(a.name, b.name);
        assert_eq!(a.name, "foo-bar-unit-tests-pr42-550e8400");
    }

    #[test]
    fn record_binds_event_and_spec() {
        let run = JobRun::from_presubmit(&presubmit("unit-tests"), "foo/bar", &event());
        assert_eq!(run.job, "unit-tests");
        assert_eq!(run.max_concurrency, 2);
        assert_eq!(run.pr_number, PrNumber(42));
        assert_eq!(run.base_sha, Sha::parse("a".repeat(40)).unwrap());
        assert!(run.refs.is_empty());
    }

    #[test]
    fn record_yaml_roundtrip() {
        let run = JobRun::from_presubmit(&presubmit("unit-tests"), "foo/bar", &event());
        let yaml = serde_yaml::to_string(&run).unwrap();
        let parsed: JobRun = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(run, parsed);
    }
}
