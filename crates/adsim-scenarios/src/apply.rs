//! Builds the initial [`SimState`] for a run: the user's advertiser tree
//! plus a synthesized competitor advertiser per `competitor_mix` archetype.
//!
//! Competitors are scenario-construction-time entities, not day-engine
//! runtime ones: the day engine (`adsim-algo::engine`) iterates
//! `state.advertisers` uniformly with no special-casing for `is_user`, so
//! every competitor needs a fully populated campaign/ad-group/keyword tree
//! before the first day runs.

use adsim_core::config::ScenarioConfig;
use adsim_core::entities::{
    Ad, AdGroup, AdGroupId, AdId, Advertiser, AdvertiserId, Campaign, CampaignId, CampaignStatus, CompetitorArchetype,
    EntityStatus, Keyword, KeywordId, MatchType,
};
use adsim_core::quality_score::QualityScoreState;
use adsim_core::SimState;

/// Per-archetype bid aggressiveness and starting quality, mirroring how the
/// source system's simplified competitor generator picked these constants.
fn archetype_bid_multiplier(archetype: CompetitorArchetype) -> f64 {
    match archetype {
        CompetitorArchetype::Aggressive => 1.2,
        CompetitorArchetype::Defensive => 0.7,
        CompetitorArchetype::Neutral => 1.0,
    }
}

fn archetype_base_quality_score(archetype: CompetitorArchetype) -> f64 {
    match archetype {
        CompetitorArchetype::Aggressive => 0.6,
        _ => 0.5,
    }
}

/// Allocates ids for synthesized competitor entities starting well above
/// any id the caller's own entity generation is expected to use, so the
/// two id spaces never collide.
pub struct CompetitorIdAllocator {
    next: usize,
}

impl CompetitorIdAllocator {
    pub fn new() -> Self {
        Self { next: 1_000_000 }
    }

    fn take(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for CompetitorIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Build one competitor `Advertiser` per `(archetype, share)` pair in
/// `config.competitor_mix`, each with a single active campaign, ad group,
/// broad-match keyword, and ad — enough to participate in auctions from
/// day one. Campaign/daily budgets scale with the archetype's demand
/// share of `user_daily_budget`.
pub fn build_competitor_advertisers(user_daily_budget: f64, config: &ScenarioConfig, ids: &mut CompetitorIdAllocator) -> Vec<Advertiser> {
    let query_text = config
        .demand
        .query_topics
        .first()
        .cloned()
        .unwrap_or_else(|| "property dubai".to_string());

    config
        .competitor_mix
        .iter()
        .map(|(&archetype, &share)| {
            let bid_mult = archetype_bid_multiplier(archetype);
            let base_quality_score = archetype_base_quality_score(archetype);
            let adv_id = AdvertiserId::new(ids.take());

            let mut adv = Advertiser::new_competitor(
                adv_id,
                format!("Competitor ({})", archetype.as_str()),
                archetype,
                bid_mult,
                base_quality_score,
            );
            adv.daily_budget = user_daily_budget * share * 3.0;

            let keyword = Keyword {
                id: KeywordId::new(ids.take()),
                text: query_text.clone(),
                match_type: MatchType::Broad,
                status: EntityStatus::Active,
                bid_override: None,
                intent_tier: None,
                is_negative: false,
                quality_score: QualityScoreState::default(),
            };
            let ad = Ad {
                id: AdId::new(ids.take()),
                headlines: vec!["Competitor Ad".to_string()],
                descriptions: vec!["Best deals".to_string()],
                status: EntityStatus::Active,
                ad_strength: base_quality_score,
                landing_page_id: None,
            };
            let ad_group = AdGroup {
                id: AdGroupId::new(ids.take()),
                name: format!("{} AG", archetype.as_str()),
                status: EntityStatus::Active,
                default_bid: 2.0 * bid_mult,
                keywords: vec![keyword],
                ads: vec![ad],
            };
            let campaign = Campaign {
                id: CampaignId::new(ids.take()),
                name: format!("{} Campaign", archetype.as_str()),
                status: CampaignStatus::Active,
                budget: user_daily_budget * share,
                daily_spend: 0.0,
                ad_groups: vec![ad_group],
            };
            adv.campaigns.push(campaign);
            adv
        })
        .collect()
}

/// Build the initial `SimState` for a run: `user` plus one synthesized
/// competitor per `competitor_mix` entry.
pub fn build_initial_state(user: Advertiser, scenario_slug: impl Into<String>, config: &ScenarioConfig) -> SimState {
    let mut ids = CompetitorIdAllocator::new();
    let competitors = build_competitor_advertisers(user.daily_budget, config, &mut ids);

    let mut advertisers = vec![user];
    advertisers.extend(competitors);
    SimState::new(scenario_slug, advertisers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sample_user() -> Advertiser {
        Advertiser::new_user(AdvertiserId::new(1), "user", 500.0)
    }

    #[test]
    fn no_competitor_mix_yields_only_the_user() {
        let config = ScenarioConfig::default();
        let state = build_initial_state(sample_user(), "s1", &config);
        assert_eq!(state.advertisers.len(), 1);
        assert!(state.advertisers[0].is_user);
    }

    #[test]
    fn competitor_mix_produces_one_advertiser_per_archetype() {
        let mut config = ScenarioConfig::default();
        config.competitor_mix.insert(CompetitorArchetype::Aggressive, 0.3);
        config.competitor_mix.insert(CompetitorArchetype::Defensive, 0.2);

        let state = build_initial_state(sample_user(), "s1", &config);
        assert_eq!(state.advertisers.len(), 3);
        assert_eq!(state.advertisers.iter().filter(|a| !a.is_user).count(), 2);
    }

    #[test]
    fn competitor_has_active_campaign_with_one_keyword_and_ad() {
        let mut config = ScenarioConfig::default();
        config.competitor_mix.insert(CompetitorArchetype::Neutral, 0.5);
        let mut ids = CompetitorIdAllocator::new();
        let competitors = build_competitor_advertisers(500.0, &config, &mut ids);

        assert_eq!(competitors.len(), 1);
        let campaign = &competitors[0].campaigns[0];
        assert!(campaign.status.is_active());
        assert_eq!(campaign.ad_groups[0].keywords.len(), 1);
        assert_eq!(campaign.ad_groups[0].ads.len(), 1);
    }

    #[test]
    fn aggressive_archetype_bids_higher_than_defensive() {
        let mut config = ScenarioConfig::default();
        config.competitor_mix.insert(CompetitorArchetype::Aggressive, 0.3);
        config.competitor_mix.insert(CompetitorArchetype::Defensive, 0.3);
        let mut ids = CompetitorIdAllocator::new();
        let competitors = build_competitor_advertisers(500.0, &config, &mut ids);

        let aggressive = competitors.iter().find(|a| a.archetype == Some(CompetitorArchetype::Aggressive)).unwrap();
        let defensive = competitors.iter().find(|a| a.archetype == Some(CompetitorArchetype::Defensive)).unwrap();
        assert!(aggressive.bid_multiplier > defensive.bid_multiplier);
    }

    #[test]
    fn competitor_ids_never_collide_with_each_other() {
        let mut config = ScenarioConfig::default();
        config.competitor_mix.insert(CompetitorArchetype::Aggressive, 0.3);
        config.competitor_mix.insert(CompetitorArchetype::Defensive, 0.2);
        config.competitor_mix.insert(CompetitorArchetype::Neutral, 0.1);
        let mut ids = CompetitorIdAllocator::new();
        let competitors = build_competitor_advertisers(500.0, &config, &mut ids);

        let mut seen = HashMap::new();
        for adv in &competitors {
            *seen.entry(adv.id).or_insert(0) += 1;
        }
        assert!(seen.values().all(|&count| count == 1));
    }
}
