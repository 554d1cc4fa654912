//! Per-keyword quality score: ECTR, ad relevance, and landing experience.

use serde::{Deserialize, Serialize};

/// Stateful quality score for a single keyword.
///
/// Components (`ectr`, `ad_relevance`, `landing_exp`) are each in `[0, 1]`.
/// The composite [`QualityScoreState::score`] is what the auction consumes;
/// `ctr_ema`/`cvr_ema` are running averages of observed performance that feed
/// `ectr`'s daily update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScoreState {
    pub ectr: f64,
    pub ad_relevance: f64,
    pub landing_exp: f64,

    pub ctr_ema: f64,
    pub cvr_ema: f64,

    pub ema_alpha: f64,
    pub impressions_seen: u64,
    pub learning_phase_threshold: u64,
}

impl Default for QualityScoreState {
    fn default() -> Self {
        Self {
            ectr: 0.5,
            ad_relevance: 0.5,
            landing_exp: 0.5,
            ctr_ema: 0.0,
            cvr_ema: 0.0,
            ema_alpha: 0.1,
            impressions_seen: 0,
            learning_phase_threshold: 1000,
        }
    }
}

/// Composite-score weights. `ectr + relevance + landing` sum to 1.
const W_ECTR: f64 = 0.40;
const W_RELEVANCE: f64 = 0.35;
const W_LANDING: f64 = 0.25;

/// Piecewise thresholds mapping the internal `[0,1]` score to a `{1..10}` display score.
const DISPLAY_THRESHOLDS: [f64; 9] = [0.20, 0.30, 0.40, 0.50, 0.55, 0.60, 0.70, 0.80, 0.90];

impl QualityScoreState {
    /// New quality score state for a keyword, seeded from its ad and landing page.
    pub fn new(ad_relevance: f64, landing_score: f64) -> Self {
        Self {
            ad_relevance: ad_relevance.clamp(0.0, 1.0),
            landing_exp: landing_score.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Composite quality score, clamped to `[0, 1]`.
    pub fn score(&self) -> f64 {
        let raw = W_ECTR * self.ectr + W_RELEVANCE * self.ad_relevance + W_LANDING * self.landing_exp;
        raw.clamp(0.0, 1.0)
    }

    /// Map the internal score to a display scale of `1..=10`.
    pub fn display_score(&self) -> u8 {
        let internal = self.score();
        for (i, threshold) in DISPLAY_THRESHOLDS.iter().enumerate() {
            if internal < *threshold {
                return (i + 1) as u8;
            }
        }
        10
    }

    pub fn in_learning_phase(&self) -> bool {
        self.impressions_seen < self.learning_phase_threshold
    }

    fn ema_alpha_effective(&self) -> f64 {
        if self.in_learning_phase() {
            self.ema_alpha * 2.0
        } else {
            self.ema_alpha
        }
    }

    pub fn update_ctr_ema(&mut self, actual_ctr: f64) {
        let alpha = self.ema_alpha_effective();
        self.ctr_ema = alpha * actual_ctr + (1.0 - alpha) * self.ctr_ema;
    }

    pub fn update_cvr_ema(&mut self, actual_cvr: f64) {
        let alpha = self.ema_alpha_effective();
        self.cvr_ema = alpha * actual_cvr + (1.0 - alpha) * self.cvr_ema;
    }

    /// Blend ECTR toward the CTR EMA. Faster (`beta=0.30`) during learning,
    /// slower (`beta=0.15`) once stable.
    pub fn update_ectr(&mut self) {
        let beta = if self.in_learning_phase() { 0.30 } else { 0.15 };
        self.ectr = ((1.0 - beta) * self.ectr + beta * self.ctr_ema).clamp(0.0, 1.0);
    }

    pub fn add_impressions(&mut self, count: u64) {
        self.impressions_seen += count;
    }

    /// Roll today's aggregate (impressions, clicks, conversions) into the EMAs.
    pub fn update_from_day(&mut self, impressions: u64, clicks: u64, conversions: u64) {
        if impressions == 0 {
            return;
        }
        self.add_impressions(impressions);
        let actual_ctr = clicks as f64 / impressions as f64;
        self.update_ctr_ema(actual_ctr);
        self.update_ectr();

        if clicks > 0 {
            let actual_cvr = conversions as f64 / clicks as f64;
            self.update_cvr_ema(actual_cvr);
        }
    }

    pub fn apply_relevance_update(&mut self, delta: f64) {
        self.ad_relevance = (self.ad_relevance + delta).clamp(0.0, 1.0);
    }

    pub fn apply_landing_update(&mut self, delta: f64) {
        self.landing_exp = (self.landing_exp + delta).clamp(0.0, 1.0);
    }
}

/// Landing page experience score feeding `landing_exp` above (not CVR directly).
///
/// `experience = 0.5*relevance + 0.3*load_score + 0.2*device_score`.
pub fn calculate_landing_experience(
    relevance_score: f64,
    load_time_ms: f64,
    mobile_score: f64,
    is_mobile: bool,
) -> f64 {
    let load_score = if load_time_ms < 1000.0 {
        1.0
    } else if load_time_ms < 2000.0 {
        0.9
    } else if load_time_ms < 3000.0 {
        0.7
    } else if load_time_ms < 5000.0 {
        0.5
    } else {
        0.3
    };

    let device_score = if is_mobile { mobile_score } else { 1.0 };

    (relevance_score * 0.5 + load_score * 0.3 + device_score * 0.2).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_score_is_neutral() {
        let qs = QualityScoreState::default();
        assert!((qs.score() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn score_clamped_and_weighted() {
        let qs = QualityScoreState {
            ectr: 1.0,
            ad_relevance: 1.0,
            landing_exp: 1.0,
            ..QualityScoreState::default()
        };
        assert!((qs.score() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn display_score_maps_thresholds() {
        let mut qs = QualityScoreState::default();
        qs.ectr = 0.0;
        qs.ad_relevance = 0.0;
        qs.landing_exp = 0.0;
        assert_eq!(qs.display_score(), 1);

        let mut qs2 = QualityScoreState::default();
        qs2.ectr = 1.0;
        qs2.ad_relevance = 1.0;
        qs2.landing_exp = 1.0;
        assert_eq!(qs2.display_score(), 10);
    }

    #[test]
    fn learning_phase_uses_faster_alpha() {
        let mut learning = QualityScoreState::default();
        let mut stable = QualityScoreState {
            impressions_seen: 2000,
            ..QualityScoreState::default()
        };
        learning.update_ctr_ema(0.5);
        stable.update_ctr_ema(0.5);
        assert!(learning.ctr_ema > stable.ctr_ema);
    }

    #[test]
    fn update_from_day_noop_on_zero_impressions() {
        let mut qs = QualityScoreState::default();
        let before = qs.clone();
        qs.update_from_day(0, 0, 0);
        assert_eq!(qs.ectr, before.ectr);
        assert_eq!(qs.impressions_seen, before.impressions_seen);
    }

    #[test]
    fn relevance_and_landing_updates_clamp() {
        let mut qs = QualityScoreState::default();
        qs.apply_relevance_update(10.0);
        assert_eq!(qs.ad_relevance, 1.0);
        qs.apply_landing_update(-10.0);
        assert_eq!(qs.landing_exp, 0.0);
    }

    #[test]
    fn landing_experience_bounds() {
        let fast_desktop = calculate_landing_experience(1.0, 500.0, 1.0, false);
        assert!((fast_desktop - 1.0).abs() < 1e-9);

        let slow_mobile = calculate_landing_experience(0.0, 6000.0, 0.0, true);
        assert!(slow_mobile >= 0.0 && slow_mobile <= 1.0);
    }
}
