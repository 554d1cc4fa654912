//! Fatigue tracking for an advertiser-segment pair.

use serde::{Deserialize, Serialize};

/// Cumulative ad fatigue for one `(advertiser, segment)` pair.
///
/// Grows with impressions served today, decays once per day at day end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueState {
    pub impressions_today: u64,
    pub cumulative_fatigue: f64,
    pub scale: f64,
    pub decay_rate: f64,
}

impl Default for FatigueState {
    fn default() -> Self {
        Self {
            impressions_today: 0,
            cumulative_fatigue: 0.0,
            scale: 1200.0,
            decay_rate: 0.92,
        }
    }
}

impl FatigueState {
    pub fn add_impressions(&mut self, count: u64) {
        self.impressions_today += count;
        self.cumulative_fatigue = (self.cumulative_fatigue + count as f64 / self.scale).min(1.0);
    }

    /// Apply end-of-day decay and reset the daily impression counter.
    pub fn end_day(&mut self) {
        self.cumulative_fatigue *= self.decay_rate;
        self.impressions_today = 0;
    }

    pub fn fatigue_level(&self) -> f64 {
        self.cumulative_fatigue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatigue_accumulates_and_caps_at_one() {
        let mut f = FatigueState::default();
        f.add_impressions(2000);
        assert_eq!(f.cumulative_fatigue, 1.0);
    }

    #[test]
    fn end_day_decays_and_resets_counter() {
        let mut f = FatigueState {
            impressions_today: 500,
            cumulative_fatigue: 0.5,
            ..FatigueState::default()
        };
        f.end_day();
        assert!((f.cumulative_fatigue - 0.46).abs() < 1e-9);
        assert_eq!(f.impressions_today, 0);
    }
}
