//! Per-day and per-run output: metrics and the causal attribution log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::SimState;

/// A normalized attribution of day-over-day change to a closed set of
/// driver names (§9: "tagged bag, not inheritance" — driver identity is a
/// plain string from the vocabulary in SPEC_FULL §6, not a class hierarchy).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CausalLog {
    drivers: BTreeMap<String, f64>,
}

impl CausalLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_driver(&mut self, name: impl Into<String>, weight: f64) {
        *self.drivers.entry(name.into()).or_insert(0.0) += weight;
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn drivers(&self) -> impl Iterator<Item = (&str, f64)> {
        self.drivers.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn weight_of(&self, name: &str) -> f64 {
        self.drivers.get(name).copied().unwrap_or(0.0)
    }

    /// Normalize driver weights to sum to 1. A no-op on an empty log (there
    /// is nothing to attribute, so it is left empty rather than forced to
    /// sum to 1 by division by zero).
    pub fn normalize(&mut self) {
        let total: f64 = self.drivers.values().sum();
        if total <= 0.0 {
            return;
        }
        for weight in self.drivers.values_mut() {
            *weight /= total;
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.drivers.values().sum()
    }
}

/// Aggregate performance metrics for a single simulated day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMetrics {
    pub day: u32,

    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: f64,
    pub revenue: f64,

    pub avg_position: f64,
    pub avg_quality_score: f64,
    pub impression_share: f64,
    pub lost_is_budget: f64,
    pub lost_is_rank: f64,

    pub fraud_clicks: u64,
    pub tracking_lost_conversions: u64,

    pub causal_log: CausalLog,
}

impl DayMetrics {
    pub fn new(day: u32) -> Self {
        Self {
            day,
            ..Default::default()
        }
    }

    pub fn ctr(&self) -> f64 {
        if self.impressions == 0 {
            0.0
        } else {
            self.clicks as f64 / self.impressions as f64
        }
    }

    pub fn cvr(&self) -> f64 {
        if self.clicks == 0 {
            0.0
        } else {
            self.conversions as f64 / self.clicks as f64
        }
    }
}

/// Per-keyword metrics accumulated over a run (reserved for future reporting
/// granularity; populated by the day engine once per-keyword breakdowns are
/// requested by a caller).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetrics {
    pub keyword_id: crate::entities::KeywordId,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: f64,
}

/// Per-segment metrics accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    pub segment_key: String,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
}

/// Full output of `simulate_run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub seed: u64,
    pub n_days: u32,
    pub final_state: SimState,
    pub daily_metrics: Vec<DayMetrics>,
    pub keyword_metrics: Vec<KeywordMetrics>,
    pub segment_metrics: Vec<SegmentMetrics>,
    pub causal_logs: Vec<CausalLog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn causal_log_normalizes_to_one() {
        let mut log = CausalLog::new();
        log.add_driver("budget_limited", 0.4);
        log.add_driver("rank_loss", 0.3);
        log.normalize();
        let total: f64 = log.drivers().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 0.01);
    }

    #[test]
    fn causal_log_empty_normalize_is_noop() {
        let mut log = CausalLog::new();
        log.normalize();
        assert!(log.is_empty());
    }

    #[test]
    fn accumulating_same_driver_sums_weights() {
        let mut log = CausalLog::new();
        log.add_driver("fraud", 0.1);
        log.add_driver("fraud", 0.05);
        assert!((log.weight_of("fraud") - 0.15).abs() < 1e-9);
    }

    #[test]
    fn day_metrics_ctr_cvr_guard_division_by_zero() {
        let metrics = DayMetrics::new(1);
        assert_eq!(metrics.ctr(), 0.0);
        assert_eq!(metrics.cvr(), 0.0);
    }
}
