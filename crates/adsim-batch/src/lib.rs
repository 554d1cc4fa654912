//! # adsim-batch: Parallel Run Orchestration
//!
//! Fans a set of `(scenario_id, seed)` jobs out across a Rayon thread pool,
//! one `simulate_run` per job, collecting results into a JSON batch
//! manifest. Generalizes the day engine's "across runs the engine is
//! embarrassingly parallel" property into an actual reentrant fan-out.

pub mod job;
pub mod manifest;
pub mod runner;

pub use job::{jobs_from_scenarios, SimBatchJob, SimRunRecord};
pub use manifest::{load_batch_manifest, write_batch_manifest, BatchManifest};
pub use runner::{run_batch, BatchRunnerConfig, BatchSummary};
