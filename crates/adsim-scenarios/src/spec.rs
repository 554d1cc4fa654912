//! Scenario configuration documents: a file-loadable, multi-scenario
//! superset of [`adsim_core::ScenarioConfig`], resolved by overlaying each
//! scenario's sparse overrides onto a shared `defaults` block.
//!
//! A minimal document (just `scenarios: [{scenario_id: foo}]`) is valid and
//! resolves to `ScenarioConfig::default()`; every override field is optional.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use adsim_core::config::{EventShock, FatigueConfig, QualityScoreConfig, ScenarioConfig, Seasonality};
use adsim_core::diagnostics::Diagnostics;
use adsim_core::entities::CompetitorArchetype;
use adsim_core::segment::{DeviceType, Geo, IntentLevel, TimeBucket};

/// Top-level document: defaults shared by every scenario, plus a list of
/// named scenarios that each overlay a sparse set of overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub defaults: ScenarioConfig,
    pub scenarios: Vec<ScenarioSpec>,
}

fn default_version() -> u32 {
    1
}

/// A single named scenario: an id plus overrides applied on top of
/// `ScenarioSet::defaults`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub scenario_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub overrides: ScenarioOverrides,
}

/// Sparse overrides onto a `ScenarioConfig`. Every field is optional and
/// left `None` unless the document sets it; unset fields fall through to
/// `ScenarioSet::defaults`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioOverrides {
    pub daily_baseline: Option<u64>,
    pub intent_split: Option<HashMap<IntentLevel, f64>>,
    pub device_split: Option<HashMap<DeviceType, f64>>,
    pub geo_split: Option<HashMap<Geo, f64>>,
    pub time_split: Option<HashMap<TimeBucket, f64>>,
    pub query_topics: Option<Vec<String>>,
    pub base_ctr_by_intent: Option<HashMap<IntentLevel, f64>>,
    pub base_cvr_by_intent: Option<HashMap<IntentLevel, f64>>,
    pub cpc_anchors: Option<HashMap<String, f64>>,
    pub tracking_loss_rate: Option<f64>,
    pub fraud_rate: Option<f64>,
    pub revenue_per_conversion: Option<f64>,
    pub seasonality: Option<Seasonality>,
    pub event_shocks: Option<Vec<EventShock>>,
    pub competitor_mix: Option<HashMap<CompetitorArchetype, f64>>,
    pub quality_score: Option<QualityScoreConfig>,
    pub fatigue: Option<FatigueConfig>,
}

/// A scenario with its overrides already flattened onto the set's defaults.
#[derive(Debug, Clone)]
pub struct ResolvedScenario {
    pub scenario_id: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub config: ScenarioConfig,
}

/// Load a `ScenarioSet` from a YAML or JSON file, sniffed by extension.
/// Falls back to trying YAML then JSON when the extension is absent or
/// unrecognized.
pub fn load_spec_from_path(path: &Path) -> Result<ScenarioSet> {
    let data = fs::read_to_string(path).with_context(|| format!("reading scenario spec '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing scenario spec yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing scenario spec json")
        }
        _ => serde_yaml::from_str(&data).or_else(|_| serde_json::from_str(&data)).context("parsing scenario spec"),
    }
}

/// Overlay `overrides` onto `defaults`, producing a fully-resolved
/// `ScenarioConfig`. Every set override field replaces the corresponding
/// default wholesale (no deep-merge of individual map keys).
fn apply_overrides(defaults: &ScenarioConfig, overrides: &ScenarioOverrides) -> ScenarioConfig {
    let mut demand = defaults.demand.clone();
    if let Some(v) = &overrides.daily_baseline {
        demand.daily_baseline = *v;
    }
    if let Some(v) = &overrides.intent_split {
        demand.intent_split = v.clone();
    }
    if let Some(v) = &overrides.device_split {
        demand.device_split = v.clone();
    }
    if let Some(v) = &overrides.geo_split {
        demand.geo_split = v.clone();
    }
    if let Some(v) = &overrides.time_split {
        demand.time_split = v.clone();
    }
    if let Some(v) = &overrides.query_topics {
        demand.query_topics = v.clone();
    }

    let mut ctr_cvr = defaults.ctr_cvr.clone();
    if let Some(v) = &overrides.base_ctr_by_intent {
        ctr_cvr.base_ctr_by_intent = v.clone();
    }
    if let Some(v) = &overrides.base_cvr_by_intent {
        ctr_cvr.base_cvr_by_intent = v.clone();
    }

    ScenarioConfig {
        demand,
        ctr_cvr,
        cpc_anchors: overrides.cpc_anchors.clone().unwrap_or_else(|| defaults.cpc_anchors.clone()),
        tracking_loss_rate: overrides.tracking_loss_rate.unwrap_or(defaults.tracking_loss_rate),
        fraud_rate: overrides.fraud_rate.unwrap_or(defaults.fraud_rate),
        revenue_per_conversion: overrides.revenue_per_conversion.unwrap_or(defaults.revenue_per_conversion),
        seasonality: overrides.seasonality.clone().unwrap_or_else(|| defaults.seasonality.clone()),
        event_shocks: overrides.event_shocks.clone().unwrap_or_else(|| defaults.event_shocks.clone()),
        competitor_mix: overrides.competitor_mix.clone().unwrap_or_else(|| defaults.competitor_mix.clone()),
        quality_score: overrides.quality_score.clone().unwrap_or_else(|| defaults.quality_score.clone()),
        fatigue: overrides.fatigue.clone().unwrap_or_else(|| defaults.fatigue.clone()),
    }
}

/// Resolve every scenario in `set` to a fully-defaulted `ScenarioConfig`.
/// Fails fast on structural problems (empty scenario list, empty/duplicate
/// scenario ids); soft issues (splits that don't sum to 1.0, out-of-range
/// probabilities) are left to [`validate`], which collects them instead of
/// aborting resolution.
pub fn resolve_scenarios(set: &ScenarioSet) -> Result<Vec<ResolvedScenario>> {
    if set.scenarios.is_empty() {
        return Err(anyhow!("scenario set contains no scenarios"));
    }
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(set.scenarios.len());
    for spec in &set.scenarios {
        if spec.scenario_id.trim().is_empty() {
            return Err(anyhow!("scenario_id cannot be empty"));
        }
        if !seen.insert(spec.scenario_id.clone()) {
            return Err(anyhow!("duplicate scenario_id '{}' in spec", spec.scenario_id));
        }
        resolved.push(ResolvedScenario {
            scenario_id: spec.scenario_id.clone(),
            description: spec.description.clone(),
            tags: spec.tags.clone(),
            config: apply_overrides(&set.defaults, &spec.overrides),
        });
    }
    Ok(resolved)
}

/// Validate `set`, collecting every issue found rather than failing on the
/// first one. Structural failures (empty scenario list, duplicate/empty
/// ids) surface as errors; probability fields outside `[0, 1]` or split
/// maps that don't sum close to 1.0 surface as warnings, since the engine
/// treats unknown/malformed scenario keys as neutral (SPEC_FULL §4.6
/// failure semantics) rather than refusing to run.
pub fn validate(set: &ScenarioSet) -> Diagnostics {
    let mut diag = Diagnostics::new();

    if set.scenarios.is_empty() {
        diag.add_error("config", "scenario set contains no scenarios");
        return diag;
    }

    let mut seen = HashSet::new();
    for spec in &set.scenarios {
        if spec.scenario_id.trim().is_empty() {
            diag.add_error("config", "scenario_id cannot be empty");
        } else if !seen.insert(spec.scenario_id.clone()) {
            diag.add_error_with_entity("config", "duplicate scenario_id", &spec.scenario_id);
        }

        let resolved = apply_overrides(&set.defaults, &spec.overrides);
        validate_resolved(&resolved, &spec.scenario_id, &mut diag);
    }

    diag
}

fn validate_resolved(config: &ScenarioConfig, scenario_id: &str, diag: &mut Diagnostics) {
    if !(0.0..=1.0).contains(&config.fraud_rate) {
        diag.add_error_with_entity("config", "fraud_rate must be within [0, 1]", scenario_id);
    }
    if !(0.0..=1.0).contains(&config.tracking_loss_rate) {
        diag.add_error_with_entity("config", "tracking_loss_rate must be within [0, 1]", scenario_id);
    }
    if config.demand.daily_baseline == 0 {
        diag.add_warning_with_entity("demand", "daily_baseline is 0, every day will have zero demand", scenario_id);
    }

    check_split_sums_to_one(&config.demand.intent_split, "intent_split", scenario_id, diag);
    check_split_sums_to_one(&config.demand.device_split, "device_split", scenario_id, diag);
    check_split_sums_to_one(&config.demand.geo_split, "geo_split", scenario_id, diag);
    check_split_sums_to_one(&config.demand.time_split, "time_split", scenario_id, diag);

    for share in config.competitor_mix.values() {
        if !(0.0..=1.0).contains(share) {
            diag.add_warning_with_entity("demand", "competitor_mix share outside [0, 1]", scenario_id);
            break;
        }
    }
}

fn check_split_sums_to_one<K>(split: &HashMap<K, f64>, field: &str, scenario_id: &str, diag: &mut Diagnostics) {
    if split.is_empty() {
        return;
    }
    let sum: f64 = split.values().sum();
    if (sum - 1.0).abs() > 0.01 {
        diag.add_warning_with_entity("demand", &format!("{} sums to {:.3}, not 1.0", field, sum), scenario_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        "scenarios:\n  - scenario_id: monopoly\n"
    }

    #[test]
    fn minimal_document_resolves_to_defaults() {
        let set: ScenarioSet = serde_yaml::from_str(minimal_yaml()).unwrap();
        let resolved = resolve_scenarios(&set).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].scenario_id, "monopoly");
        assert_eq!(resolved[0].config, ScenarioConfig::default());
    }

    #[test]
    fn override_replaces_only_named_field() {
        let yaml = "scenarios:\n  - scenario_id: high_fraud\n    overrides:\n      fraud_rate: 0.2\n";
        let set: ScenarioSet = serde_yaml::from_str(yaml).unwrap();
        let resolved = resolve_scenarios(&set).unwrap();
        assert_eq!(resolved[0].config.fraud_rate, 0.2);
        assert_eq!(resolved[0].config.tracking_loss_rate, ScenarioConfig::default().tracking_loss_rate);
    }

    #[test]
    fn empty_scenario_list_fails_resolution() {
        let set = ScenarioSet { version: 1, defaults: ScenarioConfig::default(), scenarios: vec![] };
        assert!(resolve_scenarios(&set).is_err());
    }

    #[test]
    fn duplicate_scenario_ids_fail_resolution() {
        let yaml = "scenarios:\n  - scenario_id: a\n  - scenario_id: a\n";
        let set: ScenarioSet = serde_yaml::from_str(yaml).unwrap();
        assert!(resolve_scenarios(&set).is_err());
    }

    #[test]
    fn validate_collects_multiple_errors_without_aborting() {
        let yaml = "scenarios:\n  - scenario_id: a\n    overrides:\n      fraud_rate: 5.0\n      tracking_loss_rate: -1.0\n";
        let set: ScenarioSet = serde_yaml::from_str(yaml).unwrap();
        let diag = validate(&set);
        assert_eq!(diag.error_count(), 2);
    }

    #[test]
    fn load_spec_from_json_path() {
        use std::io::Write;
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{\"scenarios\": [{{\"scenario_id\": \"s1\"}}]}}").unwrap();
        let set = load_spec_from_path(file.path()).unwrap();
        assert_eq!(set.scenarios.len(), 1);
    }
}
