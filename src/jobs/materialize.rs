//! Expansion of squashed config documents into job runs.
//!
//! Every presubmit of every repository in the squashed set becomes one
//! [`JobRun`] bound to the triggering event, with a source reference for the
//! repository the presubmit belongs to.

use tracing::info;

use crate::presubmits::JobConfig;
use crate::webhooks::PullRequestEvent;

use super::run::{JobRun, SourceRef};

/// Clone depth for attached source references.
const CLONE_DEPTH: u32 = 50;

/// Materializes job runs for every presubmit in `configs`.
///
/// Pure construction: no I/O beyond one log line per record, no failure
/// path. Repo keys that are not `"org/name"` are a config-loader bug, not a
/// runtime condition.
pub fn materialize(
    configs: &[JobConfig],
    event: &PullRequestEvent,
    default_branch: &str,
) -> Vec<JobRun> {
    let mut runs = Vec::new();

    info!(configs = configs.len(), pr = %event.pr_number, "materializing job runs");
    for config in configs {
        for (repo_key, presubmits) in &config.presubmits {
            for presubmit in presubmits {
                let mut run = JobRun::from_presubmit(presubmit, repo_key, event);
                attach_repo_ref(&mut run, repo_key, default_branch);
                info!(job = %run.name, "adding job");
                runs.push(run);
            }
        }
    }

    runs
}

/// Attaches a source reference for `repo_key` to the run.
///
/// The new ref becomes the primary checkout only if the run has none yet;
/// the first primary wins and is never overwritten.
fn attach_repo_ref(run: &mut JobRun, repo_key: &str, default_branch: &str) {
    let has_primary = run.refs.iter().any(|r| r.workdir);

    let (org, repo) = repo_key
        .split_once('/')
        .expect("presubmit repo key must be org/name");

    run.refs.push(SourceRef {
        org: org.to_string(),
        repo: repo.to_string(),
        repo_link: format!("https://github.com/{}", repo_key),
        base_ref: format!("refs/heads/{}", default_branch),
        clone_depth: CLONE_DEPTH,
        workdir: !has_primary,
    });
}
