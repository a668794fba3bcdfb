//! Job runs: the records the bot emits for each triggered presubmit.
//!
//! This module covers the back half of the pipeline: expanding squashed
//! config documents into [`JobRun`] records bound to the triggering pull
//! request, and writing one document per record for downstream pickup.

pub mod materialize;
pub mod run;
pub mod sink;

pub use materialize::materialize;
pub use run::{JobRun, SourceRef};
pub use sink::write_jobs;
