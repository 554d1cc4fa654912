//! Fans `SimBatchJob`s out across a Rayon thread pool, one `simulate_run`
//! per job, writing each run's `RunResult` to its own JSON file plus a
//! single batch manifest summarizing success/failure.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use adsim_algo::engine::simulate_run;
use adsim_core::entities::Advertiser;
use adsim_core::ScenarioConfig;
use adsim_scenarios::apply::build_initial_state;

use crate::job::{SimBatchJob, SimRunRecord};
use crate::manifest::{write_batch_manifest, BatchManifest};

/// Everything `run_batch` needs: the jobs to run, the scenario configs they
/// reference (by id), the user's advertiser portfolio shared by every job,
/// and where to write output.
pub struct BatchRunnerConfig {
    pub jobs: Vec<SimBatchJob>,
    pub scenarios: HashMap<String, ScenarioConfig>,
    pub portfolio: Advertiser,
    pub output_root: PathBuf,
    /// `0` auto-detects via `num_cpus::get()`.
    pub threads: usize,
}

/// Summary returned after the run so clients can log success/failure counts
/// and the manifest location.
pub struct BatchSummary {
    pub success: usize,
    pub failure: usize,
    pub manifest_path: PathBuf,
    pub jobs: Vec<SimRunRecord>,
}

pub fn run_batch(config: &BatchRunnerConfig) -> Result<BatchSummary> {
    fs::create_dir_all(&config.output_root)
        .with_context(|| format!("creating batch output root '{}'", config.output_root.display()))?;

    let thread_count = if config.threads == 0 { num_cpus::get() } else { config.threads };
    let pool = ThreadPoolBuilder::new()
        .num_threads(thread_count)
        .build()
        .context("building Rayon thread pool for batch runs")?;

    let job_records: Vec<SimRunRecord> = pool.install(|| config.jobs.par_iter().map(|job| run_job(job, config)).collect());

    let success = job_records.iter().filter(|record| record.status == "ok").count();
    let failure = job_records.len() - success;

    let manifest = BatchManifest {
        created_at: Utc::now(),
        num_jobs: job_records.len(),
        success,
        failure,
        jobs: job_records.clone(),
    };
    let manifest_path = config.output_root.join("batch_manifest.json");
    write_batch_manifest(&manifest_path, &manifest)?;

    Ok(BatchSummary { success, failure, manifest_path, jobs: job_records })
}

/// Execute a single batch job: resolve its scenario, build the initial
/// state from the shared portfolio plus synthesized competitors, run
/// `simulate_run`, and write the `RunResult` as JSON.
fn run_job(job: &SimBatchJob, config: &BatchRunnerConfig) -> SimRunRecord {
    let output_file = config.output_root.join(format!("{}.json", job.job_id.replace(':', "_")));

    let runner = || -> Result<()> {
        let scenario_config = config
            .scenarios
            .get(&job.scenario_id)
            .ok_or_else(|| anyhow!("unknown scenario_id '{}'", job.scenario_id))?;

        let state = build_initial_state(config.portfolio.clone(), job.scenario_id.clone(), scenario_config);
        let result = simulate_run(state, &HashMap::new(), scenario_config, job.seed, job.n_days);

        let json = serde_json::to_string_pretty(&result).context("serializing run result to JSON")?;
        if let Some(parent) = output_file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_file, json).with_context(|| format!("writing run result '{}'", output_file.display()))?;
        Ok(())
    };

    let outcome = runner();
    let (status, error) = match outcome {
        Ok(()) => ("ok".to_string(), None),
        Err(err) => {
            tracing::warn!(job_id = %job.job_id, error = %err, "batch job failed");
            ("error".to_string(), Some(err.to_string()))
        }
    };

    SimRunRecord {
        job_id: job.job_id.clone(),
        scenario_id: job.scenario_id.clone(),
        seed: job.seed,
        status,
        error,
        output_path: output_file.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsim_core::entities::AdvertiserId;
    use tempfile::TempDir;

    fn sample_portfolio() -> Advertiser {
        Advertiser::new_user(AdvertiserId::new(1), "user", 500.0)
    }

    #[test]
    fn run_batch_reports_unknown_scenario_as_failure() {
        let out_dir = TempDir::new().unwrap();
        let config = BatchRunnerConfig {
            jobs: vec![SimBatchJob { job_id: "missing:1".into(), scenario_id: "missing".into(), seed: 1, n_days: 1 }],
            scenarios: HashMap::new(),
            portfolio: sample_portfolio(),
            output_root: out_dir.path().to_path_buf(),
            threads: 1,
        };
        let summary = run_batch(&config).unwrap();
        assert_eq!(summary.failure, 1);
        assert_eq!(summary.success, 0);
    }

    #[test]
    fn run_batch_runs_known_scenario_and_writes_result() {
        let out_dir = TempDir::new().unwrap();
        let mut scenarios = HashMap::new();
        scenarios.insert("monopoly".to_string(), ScenarioConfig::default());
        let config = BatchRunnerConfig {
            jobs: vec![SimBatchJob { job_id: "monopoly:1".into(), scenario_id: "monopoly".into(), seed: 1, n_days: 2 }],
            scenarios,
            portfolio: sample_portfolio(),
            output_root: out_dir.path().to_path_buf(),
            threads: 1,
        };
        let summary = run_batch(&config).unwrap();
        assert_eq!(summary.success, 1);
        assert!(out_dir.path().join("monopoly_1.json").exists());
    }
}
