//! Resolved scenario configuration: the fully-defaulted document the day
//! engine consumes. Loading this from YAML/JSON with partial documents and
//! neutral-default resolution is the job of the `adsim-scenarios` crate
//! (mirroring how a `Network`'s fields are defined here in core while the
//! teacher's scenario-perturbation logic lives in its own crate); this
//! module only defines the shape the engine actually reads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::CompetitorArchetype;
use crate::segment::{DeviceType, Geo, IntentLevel, TimeBucket};

/// Per-segment-axis demand shares plus the overall daily query baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandConfig {
    pub daily_baseline: u64,
    pub intent_split: HashMap<IntentLevel, f64>,
    pub device_split: HashMap<DeviceType, f64>,
    pub geo_split: HashMap<Geo, f64>,
    pub time_split: HashMap<TimeBucket, f64>,
    /// Synthetic query phrases sampled (uniformly, per-query) to stand in for
    /// real search traffic (Non-goal: "real-user query text semantics").
    /// The reference engine emitted unmatchable numeric placeholders here;
    /// this crate instead draws from a small topic lexicon so keyword
    /// matching has something real to classify against.
    pub query_topics: Vec<String>,
}

fn default_query_topics() -> Vec<String> {
    vec![
        "buy villa dubai".to_string(),
        "rent apartment dubai".to_string(),
        "best ac repair dubai".to_string(),
        "cheap electrician service".to_string(),
        "plumber near me".to_string(),
    ]
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            daily_baseline: 1000,
            intent_split: uniform_map(IntentLevel::ALL),
            device_split: uniform_map(DeviceType::ALL),
            geo_split: uniform_map(Geo::ALL),
            time_split: uniform_map(TimeBucket::ALL),
            query_topics: default_query_topics(),
        }
    }
}

fn uniform_map<K: std::hash::Hash + Eq + Copy, const N: usize>(keys: [K; N]) -> HashMap<K, f64> {
    let share = 1.0 / N as f64;
    keys.into_iter().map(|k| (k, share)).collect()
}

impl DemandConfig {
    pub fn intent_share(&self, intent: IntentLevel) -> f64 {
        self.intent_split.get(&intent).copied().unwrap_or(1.0)
    }
    pub fn device_share(&self, device: DeviceType) -> f64 {
        self.device_split.get(&device).copied().unwrap_or(1.0)
    }
    pub fn geo_share(&self, geo: Geo) -> f64 {
        self.geo_split.get(&geo).copied().unwrap_or(1.0)
    }
    pub fn time_share(&self, time_bucket: TimeBucket) -> f64 {
        self.time_split.get(&time_bucket).copied().unwrap_or(1.0)
    }
}

/// Base CTR/CVR by intent tier, before position/strength/relevance/fatigue
/// modifiers are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtrCvrConfig {
    pub base_ctr_by_intent: HashMap<IntentLevel, f64>,
    pub base_cvr_by_intent: HashMap<IntentLevel, f64>,
}

impl Default for CtrCvrConfig {
    fn default() -> Self {
        let mut ctr = HashMap::new();
        ctr.insert(IntentLevel::High, 0.08);
        ctr.insert(IntentLevel::Medium, 0.04);
        ctr.insert(IntentLevel::Low, 0.02);

        let mut cvr = HashMap::new();
        cvr.insert(IntentLevel::High, 0.06);
        cvr.insert(IntentLevel::Medium, 0.03);
        cvr.insert(IntentLevel::Low, 0.01);

        Self { base_ctr_by_intent: ctr, base_cvr_by_intent: cvr }
    }
}

impl CtrCvrConfig {
    pub fn base_ctr(&self, intent: IntentLevel) -> f64 {
        self.base_ctr_by_intent.get(&intent).copied().unwrap_or(0.02)
    }
    pub fn base_cvr(&self, intent: IntentLevel) -> f64 {
        self.base_cvr_by_intent.get(&intent).copied().unwrap_or(0.01)
    }
}

/// `month = ((day-1)/30) % 12`, `dow = (day-1) % 7`; missing entries default
/// to 1.0 (neutral).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    #[serde(default = "default_twelve_ones")]
    pub monthly_factors: [f64; 12],
    #[serde(default = "default_seven_ones")]
    pub day_of_week_factors: [f64; 7],
}

fn default_twelve_ones() -> [f64; 12] {
    [1.0; 12]
}
fn default_seven_ones() -> [f64; 7] {
    [1.0; 7]
}

impl Default for Seasonality {
    fn default() -> Self {
        Self { monthly_factors: default_twelve_ones(), day_of_week_factors: default_seven_ones() }
    }
}

impl Seasonality {
    /// `seasonality_mult` for day `day` (1-indexed).
    pub fn multiplier_for_day(&self, day: u32) -> f64 {
        let month = (((day - 1) / 30) % 12) as usize;
        let dow = ((day - 1) % 7) as usize;
        self.monthly_factors[month] * self.day_of_week_factors[dow]
    }
}

/// A demand shock active over an inclusive day range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventShock {
    pub day_range: (u32, u32),
    pub demand_mult: f64,
}

/// Find the first event shock whose range contains `day`; otherwise 1.0.
pub fn event_multiplier_for_day(event_shocks: &[EventShock], day: u32) -> f64 {
    event_shocks
        .iter()
        .find(|e| e.day_range.0 <= day && day <= e.day_range.1)
        .map(|e| e.demand_mult)
        .unwrap_or(1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScoreConfig {
    pub ema_alpha: f64,
    pub learning_phase_threshold: u64,
}

impl Default for QualityScoreConfig {
    fn default() -> Self {
        Self { ema_alpha: 0.1, learning_phase_threshold: 1000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueConfig {
    pub scale: f64,
    pub decay_rate: f64,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self { scale: 1200.0, decay_rate: 0.92 }
    }
}

/// Fully-resolved simulation configuration the day engine consumes. See
/// `adsim_scenarios::spec` for the partial, defaultable document this is
/// resolved from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub demand: DemandConfig,
    pub ctr_cvr: CtrCvrConfig,
    pub cpc_anchors: HashMap<String, f64>,
    pub tracking_loss_rate: f64,
    pub fraud_rate: f64,
    pub revenue_per_conversion: f64,
    pub seasonality: Seasonality,
    pub event_shocks: Vec<EventShock>,
    pub competitor_mix: HashMap<CompetitorArchetype, f64>,
    pub quality_score: QualityScoreConfig,
    pub fatigue: FatigueConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            demand: DemandConfig::default(),
            ctr_cvr: CtrCvrConfig::default(),
            cpc_anchors: HashMap::new(),
            tracking_loss_rate: 0.0,
            fraud_rate: 0.0,
            revenue_per_conversion: 100.0,
            seasonality: Seasonality::default(),
            event_shocks: Vec::new(),
            competitor_mix: HashMap::new(),
            quality_score: QualityScoreConfig::default(),
            fatigue: FatigueConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demand_config_default_is_uniform() {
        let cfg = DemandConfig::default();
        assert!((cfg.intent_share(IntentLevel::High) - 1.0 / 3.0).abs() < 1e-9);
        assert!((cfg.device_share(DeviceType::Mobile) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn seasonality_month_and_dow_indexing() {
        let mut season = Seasonality::default();
        season.monthly_factors[0] = 1.5;
        season.day_of_week_factors[0] = 2.0;
        assert!((season.multiplier_for_day(1) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn event_multiplier_falls_back_to_neutral() {
        let shocks = vec![EventShock { day_range: (10, 12), demand_mult: 2.0 }];
        assert_eq!(event_multiplier_for_day(&shocks, 11), 2.0);
        assert_eq!(event_multiplier_for_day(&shocks, 5), 1.0);
    }

    #[test]
    fn scenario_config_default_has_neutral_loss_rates() {
        let cfg = ScenarioConfig::default();
        assert_eq!(cfg.tracking_loss_rate, 0.0);
        assert_eq!(cfg.fraud_rate, 0.0);
        assert_eq!(cfg.revenue_per_conversion, 100.0);
    }
}
