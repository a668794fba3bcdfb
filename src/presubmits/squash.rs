//! Squashing: reducing two config snapshots to the jobs that must run.
//!
//! Given the snapshot at a PR's base revision and the snapshot at its head,
//! the squash produces config documents containing only presubmits that are
//! new or whose spec changed. The guarantee is idempotent, minimal
//! triggering: a job is scheduled iff it is new or modified, so re-delivering
//! the same synchronize event never re-triggers unchanged jobs, while any
//! spec change (even scheduling metadata like concurrency) always does.
//!
//! Removed paths, repositories, and jobs contribute nothing to the output:
//! the bot only emits jobs to run, never cancellations.
//!
//! Pure functions over already-loaded structures; no I/O, no failure path.
//! An empty snapshot is a valid input.

use std::collections::BTreeMap;

use super::config::{ConfigSnapshot, JobConfig, Presubmit};

/// Squashes base and head snapshots, returning one config document per path
/// present in `head`.
///
/// A path absent from `base` is entirely new: its head document is emitted
/// unchanged, in full. A path present in both is reduced to its new-or-
/// changed presubmits.
pub fn squash(base: &ConfigSnapshot, head: &ConfigSnapshot) -> Vec<JobConfig> {
    let mut configs = Vec::new();
    for (path, head_config) in head {
        match base.get(path) {
            None => configs.push(head_config.clone()),
            Some(base_config) => configs.push(JobConfig {
                presubmits: squash_presubmit_map(
                    &base_config.presubmits,
                    &head_config.presubmits,
                ),
            }),
        }
    }
    configs
}

/// Squashes the per-repository presubmit mappings of two documents.
///
/// A repository absent from `base` keeps its full head job list; a
/// repository present in both is reduced job-by-job. Repositories present
/// only in `base` are dropped.
fn squash_presubmit_map(
    base: &BTreeMap<String, Vec<Presubmit>>,
    head: &BTreeMap<String, Vec<Presubmit>>,
) -> BTreeMap<String, Vec<Presubmit>> {
    let mut squashed = BTreeMap::new();
    for (repo, head_jobs) in head {
        match base.get(repo) {
            None => {
                squashed.insert(repo.clone(), head_jobs.clone());
            }
            Some(base_jobs) => {
                squashed.insert(repo.clone(), squash_presubmits(base_jobs, head_jobs));
            }
        }
    }
    squashed
}

/// Given two presubmit lists, returns only the new and modified ones.
///
/// A head job with no same-named base job is new. A head job whose
/// same-named base job has an equal spec is unchanged and excluded.
/// Inclusion is decided once per matching base entry rather than
/// short-circuiting on the first match: names are unique within a list by
/// invariant, but if that invariant is ever violated a job is included once
/// per differing duplicate.
fn squash_presubmits(base: &[Presubmit], head: &[Presubmit]) -> Vec<Presubmit> {
    let mut squashed = Vec::new();
    for head_job in head {
        let mut is_new = true;
        for base_job in base {
            if base_job.name != head_job.name {
                continue;
            }
            is_new = false;
            if base_job.spec == head_job.spec {
                continue;
            }
            squashed.push(head_job.clone());
        }
        if is_new {
            squashed.push(head_job.clone());
        }
    }
    squashed
}
