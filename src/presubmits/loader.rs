//! Config snapshot loading.
//!
//! Loads job-config files from a working copy pinned at some revision,
//! merging each with the shared global config. Loading is partial-success by
//! design: a file that fails to parse (or does not exist at this revision -
//! normal for files added or deleted by the PR) is logged and omitted;
//! whatever parsed successfully forms the snapshot. The call itself never
//! fails.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use super::config::{ConfigSnapshot, JobConfig, JobSpec, Presubmit};

/// Errors from loading a single config file. Internal: `load_snapshot`
/// converts these into warn-and-skip.
#[derive(Debug, Error)]
enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// The shared global configuration, supplying defaults that individual job
/// configs may omit.
#[derive(Debug, Clone, Default, Deserialize)]
struct GlobalConfig {
    /// Default concurrency for presubmits that do not set one.
    #[serde(default = "default_concurrency")]
    default_max_concurrency: u32,

    /// Labels applied to every presubmit; per-job labels win on conflict.
    #[serde(default)]
    default_labels: BTreeMap<String, String>,
}

fn default_concurrency() -> u32 {
    1
}

// ============================================================================
// Raw on-disk structures
//
// Job configs may omit fields the global config defaults; the raw structs
// use Option and the merge below resolves them.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawJobConfig {
    #[serde(default)]
    presubmits: BTreeMap<String, Vec<RawPresubmit>>,
}

#[derive(Debug, Deserialize)]
struct RawPresubmit {
    name: String,
    max_concurrency: Option<u32>,
    #[serde(default)]
    labels: BTreeMap<String, String>,
    #[serde(default)]
    task: serde_yaml::Value,
}

/// Loads a config snapshot from a working copy.
///
/// For each path in `config_paths`, parses `<repo_root>/<path>` merged with
/// the global config at `<repo_root>/<global_config_path>`. Paths that fail
/// to load are skipped with a warning. If the global config itself cannot be
/// loaded, nothing can be merged and the snapshot is empty.
pub fn load_snapshot(
    repo_root: &Path,
    global_config_path: &Path,
    config_paths: &[String],
) -> ConfigSnapshot {
    let global = match load_global_config(&repo_root.join(global_config_path)) {
        Ok(global) => global,
        Err(error) => {
            warn!(
                path = %global_config_path.display(),
                %error,
                "could not load global config; snapshot will be empty"
            );
            return ConfigSnapshot::new();
        }
    };

    let mut snapshot = ConfigSnapshot::new();
    for path in config_paths {
        match load_job_config(&repo_root.join(path), &global) {
            Ok(config) => {
                snapshot.insert(path.clone(), config);
            }
            Err(error) => {
                warn!(path = %path, %error, "could not load job config; skipping");
            }
        }
    }
    snapshot
}

fn load_global_config(path: &Path) -> Result<GlobalConfig, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Loads one job config file and resolves defaults from the global config.
fn load_job_config(path: &Path, global: &GlobalConfig) -> Result<JobConfig, LoadError> {
    let contents = std::fs::read_to_string(path)?;
    let raw: RawJobConfig = serde_yaml::from_str(&contents)?;

    let presubmits = raw
        .presubmits
        .into_iter()
        .map(|(repo, jobs)| {
            let jobs = jobs
                .into_iter()
                .map(|job| resolve_presubmit(job, global))
                .collect();
            (repo, jobs)
        })
        .collect();

    Ok(JobConfig { presubmits })
}

fn resolve_presubmit(raw: RawPresubmit, global: &GlobalConfig) -> Presubmit {
    // Per-job labels win over global defaults on key conflicts.
    let mut labels = global.default_labels.clone();
    labels.extend(raw.labels);

    Presubmit {
        name: raw.name,
        spec: JobSpec {
            max_concurrency: raw
                .max_concurrency
                .unwrap_or(global.default_max_concurrency),
            labels,
            task: raw.task,
        },
    }
}
