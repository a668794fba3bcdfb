//! Emission of job-run documents for downstream pickup.
//!
//! Each run is serialized to YAML and written to
//! `<output_dir>/<record name>.yaml` using the write-to-temp-then-rename
//! pattern, so a consumer never observes a partially written document.
//! Emission is fire-and-forget: a record that fails to write is logged and
//! skipped, and the remaining records are still emitted.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, error};

use super::run::JobRun;

/// Errors from writing a single job-run document. Internal: `write_jobs`
/// converts these into log-and-continue.
#[derive(Debug, Error)]
enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Writes one YAML document per run into `output_dir`.
///
/// Returns the number of documents successfully written. Per-record failures
/// never abort the batch.
pub fn write_jobs(output_dir: &Path, runs: &[JobRun]) -> usize {
    if let Err(error) = std::fs::create_dir_all(output_dir) {
        error!(dir = %output_dir.display(), %error, "could not create output directory");
        return 0;
    }

    let mut written = 0;
    for run in runs {
        match write_job(output_dir, run) {
            Ok(()) => {
                debug!(job = %run.name, "wrote job run");
                written += 1;
            }
            Err(error) => {
                error!(job = %run.name, %error, "could not write job run; skipping");
            }
        }
    }
    written
}

/// Writes one run atomically: serialize, write to `<name>.yaml.tmp`, fsync,
/// rename to `<name>.yaml`.
fn write_job(output_dir: &Path, run: &JobRun) -> Result<(), SinkError> {
    let payload = serde_yaml::to_string(run)?;

    let path = output_dir.join(format!("{}.yaml", run.name));
    let temp_path = path.with_extension("yaml.tmp");

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(payload.as_bytes())?;
        file.sync_all()?;
    }

    std::fs::rename(&temp_path, &path)?;

    // Make the rename durable; failure here is not worth failing the record
    // over since the document itself is already in place.
    if let Ok(dir) = std::fs::File::open(output_dir) {
        let _ = dir.sync_all();
    }

    Ok(())
}
