//! Batch job definitions: `(scenario_id, seed)` pairs fanned out across a
//! thread pool by `runner::run_batch`.

use serde::{Deserialize, Serialize};

/// One simulation run: a scenario looked up by id from the batch's resolved
/// scenario set, run for `n_days` with a specific RNG seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimBatchJob {
    pub job_id: String,
    pub scenario_id: String,
    pub seed: u64,
    pub n_days: u32,
}

/// Outcome of one `SimBatchJob`, as recorded in the batch manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimRunRecord {
    pub job_id: String,
    pub scenario_id: String,
    pub seed: u64,
    pub status: String,
    pub error: Option<String>,
    pub output_path: String,
}

/// Cross `scenario_ids × seeds`, one job per pair, `job_id` = `"<scenario_id>:<seed>"`.
pub fn jobs_from_scenarios(scenario_ids: &[String], seeds: &[u64], n_days: u32) -> Vec<SimBatchJob> {
    scenario_ids
        .iter()
        .flat_map(|scenario_id| {
            seeds.iter().map(move |&seed| SimBatchJob {
                job_id: format!("{}:{}", scenario_id, seed),
                scenario_id: scenario_id.clone(),
                seed,
                n_days,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_from_scenarios_builds_cross_product() {
        let ids = vec!["monopoly".to_string(), "budget_capped".to_string()];
        let seeds = vec![1, 2, 3];
        let jobs = jobs_from_scenarios(&ids, &seeds, 30);
        assert_eq!(jobs.len(), 6);
        assert_eq!(jobs[0].job_id, "monopoly:1");
        assert_eq!(jobs[0].n_days, 30);
    }

    #[test]
    fn jobs_from_scenarios_empty_seeds_yields_no_jobs() {
        let ids = vec!["monopoly".to_string()];
        let jobs = jobs_from_scenarios(&ids, &[], 30);
        assert!(jobs.is_empty());
    }
}
