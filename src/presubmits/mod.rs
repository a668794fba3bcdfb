//! Presubmit job configuration: data model, snapshot loading, and squashing.
//!
//! A *presubmit* is a named unit of CI work tied to a repository, run before
//! merge. Config files declare presubmits per repository; this module loads
//! those files into snapshots (one per revision of interest) and squashes a
//! base and a head snapshot down to the jobs that actually need to run.

pub mod config;
pub mod loader;
pub mod squash;

pub use config::{ConfigSnapshot, JobConfig, JobSpec, Presubmit};
pub use loader::load_snapshot;
pub use squash::squash;
