//! Click and conversion sampling: CTR/CVR formulas, Bernoulli outcome
//! sampling, and fraud/tracking-loss tagging.

use adsim_core::rng::SeededRng;

/// Default position -> CTR multiplier. Position <= 0 maps to 0.0; any
/// position beyond the table (9+) falls back to 0.10.
pub fn position_multiplier(position: i32) -> f64 {
    if position <= 0 {
        return 0.0;
    }
    match position {
        1 => 1.00,
        2 => 0.85,
        3 => 0.70,
        4 => 0.55,
        5 => 0.40,
        6 => 0.30,
        7 => 0.22,
        8 => 0.15,
        _ => 0.10,
    }
}

/// `CTR = base_ctr * pos_mult(position) * (0.6 + 0.4*ad_strength) *
/// (0.7 + 0.6*relevance) * (1 - 0.5*fatigue) * noise(1, noise_variance)`,
/// clamped to `[0, 1]`.
pub fn compute_ctr(
    base_ctr: f64,
    position: i32,
    ad_strength: f64,
    relevance: f64,
    fatigue: f64,
    noise_variance: f64,
    rng: &mut SeededRng,
) -> f64 {
    let pos_mult = position_multiplier(position);
    let ctr = base_ctr
        * pos_mult
        * (0.6 + 0.4 * ad_strength)
        * (0.7 + 0.6 * relevance)
        * (1.0 - 0.5 * fatigue)
        * rng.noise(1.0, noise_variance);
    ctr.clamp(0.0, 1.0)
}

/// `CVR = base_cvr * landing_mult * offer_mult * trust_mult * (1 -
/// quality_penalty) * noise(1, noise_variance)`, clamped to `[0, 1]`.
#[allow(clippy::too_many_arguments)]
pub fn compute_cvr(
    base_cvr: f64,
    landing_mult: f64,
    offer_mult: f64,
    trust_mult: f64,
    quality_penalty: f64,
    noise_variance: f64,
    rng: &mut SeededRng,
) -> f64 {
    let cvr = base_cvr
        * landing_mult
        * offer_mult
        * trust_mult
        * (1.0 - quality_penalty)
        * rng.noise(1.0, noise_variance);
    cvr.clamp(0.0, 1.0)
}

/// Outcome of sampling a click for one impression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    pub clicked: bool,
    pub is_fraud: bool,
}

/// Sample a click from `ctr`; if clicked, sample fraud from `fraud_rate`.
/// With `rng = None`, falls back to the deterministic rule `clicked = ctr >=
/// 0.5` and never fraudulent — used only by isolated unit tests, never by
/// the day engine (SPEC_FULL §11).
pub fn simulate_click(ctr: f64, fraud_rate: f64, rng: Option<&mut SeededRng>) -> ClickOutcome {
    match rng {
        Some(rng) => {
            let clicked = rng.bernoulli(ctr);
            let is_fraud = clicked && rng.bernoulli(fraud_rate);
            ClickOutcome { clicked, is_fraud }
        }
        None => ClickOutcome { clicked: ctr >= 0.5, is_fraud: false },
    }
}

/// Attribution-delay probability mass over `[0, max_delay_days]`, truncated
/// from the reference seven-day distribution and renormalized to sum to 1.
fn delay_distribution(max_delay_days: usize) -> Vec<f64> {
    const FULL: [f64; 7] = [0.50, 0.25, 0.12, 0.07, 0.03, 0.02, 0.01];
    let take = max_delay_days.min(FULL.len() - 1) + 1;
    let truncated = &FULL[..take];
    let total: f64 = truncated.iter().sum();
    truncated.iter().map(|p| p / total).collect()
}

/// Outcome of sampling a conversion for one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub converted: bool,
    pub is_tracked: bool,
    pub delay_days: u32,
}

/// Sample a conversion from `cvr`; if converted, sample tracking loss and an
/// attribution delay. With `rng = None`, falls back to the deterministic
/// rule `converted = cvr >= 0.5`, always tracked, zero delay.
pub fn simulate_conversion(
    cvr: f64,
    tracking_loss_rate: f64,
    max_delay_days: u32,
    rng: Option<&mut SeededRng>,
) -> ConversionOutcome {
    match rng {
        Some(rng) => {
            let converted = rng.bernoulli(cvr);
            if !converted {
                return ConversionOutcome { converted: false, is_tracked: false, delay_days: 0 };
            }
            let is_tracked = !rng.bernoulli(tracking_loss_rate);
            let weights = delay_distribution(max_delay_days as usize);
            let delay_days = rng.weighted_choice(&weights).unwrap_or(0) as u32;
            ConversionOutcome { converted: true, is_tracked, delay_days }
        }
        None => {
            let converted = cvr >= 0.5;
            ConversionOutcome { converted, is_tracked: converted, delay_days: 0 }
        }
    }
}

/// Landing-page load-time -> CVR load multiplier.
pub fn load_multiplier(load_time_ms: f64) -> f64 {
    if load_time_ms < 1500.0 {
        1.1
    } else if load_time_ms < 2500.0 {
        1.0
    } else if load_time_ms < 4000.0 {
        0.85
    } else {
        0.7
    }
}

/// `landing_mult = load_mult * mobile_mult * (0.6 + 0.6*relevance)`.
pub fn calculate_landing_multiplier(relevance_score: f64, load_time_ms: f64, mobile_score: f64, is_mobile: bool) -> f64 {
    let load_mult = load_multiplier(load_time_ms);
    let mobile_mult = if is_mobile { 0.8 + 0.4 * mobile_score } else { 1.0 };
    let relevance_mult = 0.6 + 0.6 * relevance_score;
    load_mult * mobile_mult * relevance_mult
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_multiplier_table_matches_reference() {
        assert_eq!(position_multiplier(1), 1.00);
        assert_eq!(position_multiplier(8), 0.15);
        assert_eq!(position_multiplier(9), 0.10);
        assert_eq!(position_multiplier(0), 0.0);
        assert_eq!(position_multiplier(-1), 0.0);
    }

    #[test]
    fn compute_ctr_is_clamped_and_monotone_in_position() {
        let mut rng = SeededRng::new(1);
        let ctr_pos1 = compute_ctr(0.3, 1, 0.6, 0.7, 0.0, 0.0, &mut rng);
        let ctr_pos8 = compute_ctr(0.3, 8, 0.6, 0.7, 0.0, 0.0, &mut rng);
        assert!(ctr_pos1 > ctr_pos8);
        assert!(ctr_pos1 <= 1.0);
    }

    #[test]
    fn simulate_click_deterministic_fallback_thresholds_at_half() {
        let below = simulate_click(0.49, 0.0, None);
        let above = simulate_click(0.51, 0.0, None);
        assert!(!below.clicked);
        assert!(above.clicked);
        assert!(!above.is_fraud);
    }

    #[test]
    fn simulate_click_with_rng_samples_fraud_only_on_click() {
        let mut rng = SeededRng::new(5);
        let outcome = simulate_click(1.0, 1.0, Some(&mut rng));
        assert!(outcome.clicked);
        assert!(outcome.is_fraud);
        let mut rng2 = SeededRng::new(5);
        let outcome2 = simulate_click(0.0, 1.0, Some(&mut rng2));
        assert!(!outcome2.clicked);
        assert!(!outcome2.is_fraud);
    }

    #[test]
    fn delay_distribution_sums_to_one() {
        let dist = delay_distribution(7);
        let total: f64 = dist.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
        let truncated = delay_distribution(2);
        let total2: f64 = truncated.iter().sum();
        assert!((total2 - 1.0).abs() < 1e-9);
        assert_eq!(truncated.len(), 3);
    }

    #[test]
    fn landing_multiplier_rewards_fast_mobile_relevant_pages() {
        let fast_mobile = calculate_landing_multiplier(1.0, 1000.0, 1.0, true);
        let slow_desktop = calculate_landing_multiplier(0.2, 5000.0, 0.2, false);
        assert!(fast_mobile > slow_desktop);
    }
}
