//! Data model for presubmit job configuration.
//!
//! A config file declares presubmits per repository. Repositories are keyed
//! by their `"org/name"` full name; each owns an ordered list of presubmit
//! definitions. `BTreeMap` keeps iteration deterministic wherever a snapshot
//! or presubmit mapping is walked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The full set of parsed config documents as they existed at one revision,
/// keyed by the config file's path relative to the repository root.
///
/// Built fresh per revision per event and discarded after squashing; squash
/// results are never cached across events.
pub type ConfigSnapshot = BTreeMap<String, JobConfig>;

/// One parsed job-configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Presubmits per repository, keyed by `"org/name"`.
    pub presubmits: BTreeMap<String, Vec<Presubmit>>,
}

/// A named presubmit job definition.
///
/// Names are unique within one repository's list; that uniqueness is a
/// config-author invariant, not something the squash enforces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presubmit {
    /// The job name.
    pub name: String,

    /// The job's specification payload. The squash compares this for
    /// equality and nothing else; any change here re-triggers the job.
    #[serde(flatten)]
    pub spec: JobSpec,
}

/// The specification payload of a presubmit.
///
/// Equality is field-wise: two specs are equal iff every field compares
/// equal, including the opaque task payload. Scheduling metadata is part of
/// the payload, so changing only `max_concurrency` re-triggers the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Maximum number of concurrent runs of this job.
    pub max_concurrency: u32,

    /// Labels attached to runs of this job.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// The task definition executed by the job runner. Opaque to the bot.
    #[serde(default)]
    pub task: serde_yaml::Value,
}

impl JobSpec {
    /// A minimal spec with the given concurrency and no labels or task.
    pub fn with_concurrency(max_concurrency: u32) -> Self {
        JobSpec {
            max_concurrency,
            labels: BTreeMap::new(),
            task: serde_yaml::Value::Null,
        }
    }
}
