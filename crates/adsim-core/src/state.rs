//! Top-level simulation state and the user actions that mutate it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::{AdGroupId, Advertiser, AdvertiserId, CampaignId, CampaignStatus, EntityStatus, KeywordId};
use crate::fatigue::FatigueState;

/// Everything the day engine reads and (via `apply_actions`) mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub advertisers: Vec<Advertiser>,
    pub scenario_slug: String,
    pub current_day: u32,
    /// Keyed by `(advertiser_id, segment_key)`; segment_key is `Segment::to_key()`.
    pub fatigue: HashMap<(AdvertiserId, String), FatigueState>,
}

impl SimState {
    pub fn new(scenario_slug: impl Into<String>, advertisers: Vec<Advertiser>) -> Self {
        Self {
            advertisers,
            scenario_slug: scenario_slug.into(),
            current_day: 0,
            fatigue: HashMap::new(),
        }
    }

    /// The single advertiser the run reports results for, if any.
    pub fn user_advertiser(&self) -> Option<&Advertiser> {
        self.advertisers.iter().find(|a| a.is_user)
    }

    pub fn user_advertiser_mut(&mut self) -> Option<&mut Advertiser> {
        self.advertisers.iter_mut().find(|a| a.is_user)
    }

    pub fn fatigue_for(&self, advertiser_id: AdvertiserId, segment_key: &str) -> f64 {
        self.fatigue
            .get(&(advertiser_id, segment_key.to_string()))
            .map(FatigueState::fatigue_level)
            .unwrap_or(0.0)
    }

    /// Add today's impressions to the advertiser/segment fatigue tracker.
    /// Decay and counter reset happen separately in `end_day`.
    pub fn update_fatigue(&mut self, advertiser_id: AdvertiserId, segment_key: &str, impressions: u64) {
        let entry = self
            .fatigue
            .entry((advertiser_id, segment_key.to_string()))
            .or_default();
        entry.add_impressions(impressions);
    }

    /// Decay every tracked fatigue entry at day end.
    pub fn end_day_fatigue(&mut self) {
        for state in self.fatigue.values_mut() {
            state.end_day();
        }
    }

    pub fn reset_daily_spend(&mut self) {
        for adv in &mut self.advertisers {
            adv.reset_daily_spend();
        }
    }
}

/// A user-initiated mutation applied at the start of a day, before any
/// demand is generated. `apply_actions` is the only place these entities
/// are created or mutated; the engine treats them as read-only for the
/// remainder of the day (SPEC_FULL §3 "Lifecycles").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SetKeywordBid {
        keyword_id: KeywordId,
        bid: f64,
    },
    SetKeywordStatus {
        keyword_id: KeywordId,
        status: EntityStatus,
    },
    SetAdGroupStatus {
        ad_group_id: AdGroupId,
        status: EntityStatus,
    },
    SetCampaignStatus {
        campaign_id: CampaignId,
        status: CampaignStatus,
    },
    SetCampaignBudget {
        campaign_id: CampaignId,
        budget: f64,
    },
    AdjustRelevance {
        keyword_id: KeywordId,
        delta: f64,
    },
    AdjustLanding {
        keyword_id: KeywordId,
        delta: f64,
    },
}

/// Apply a day's pending `Action`s to `state`, in order. This is the only
/// place advertiser/campaign/ad-group/keyword entities are mutated; the
/// engine treats them as read-only for the remainder of the day.
///
/// An action referencing an id that no longer exists is a no-op — entities
/// may have been removed by an earlier action in the same batch or by a
/// prior day, and silently skipping keeps a day's execution total (§4.6
/// "no partial day is observable").
pub fn apply_actions(mut state: SimState, actions: &[Action]) -> SimState {
    for action in actions {
        apply_one(&mut state, action);
    }
    state
}

fn apply_one(state: &mut SimState, action: &Action) {
    match action {
        Action::SetKeywordBid { keyword_id, bid } => {
            if let Some(kw) = find_keyword_mut(state, *keyword_id) {
                kw.bid_override = Some(*bid);
            }
        }
        Action::SetKeywordStatus { keyword_id, status } => {
            if let Some(kw) = find_keyword_mut(state, *keyword_id) {
                kw.status = *status;
            }
        }
        Action::SetAdGroupStatus { ad_group_id, status } => {
            if let Some(ag) = find_ad_group_mut(state, *ad_group_id) {
                ag.status = *status;
            }
        }
        Action::SetCampaignStatus { campaign_id, status } => {
            if let Some(c) = find_campaign_mut(state, *campaign_id) {
                c.status = *status;
            }
        }
        Action::SetCampaignBudget { campaign_id, budget } => {
            if let Some(c) = find_campaign_mut(state, *campaign_id) {
                c.budget = *budget;
            }
        }
        Action::AdjustRelevance { keyword_id, delta } => {
            if let Some(kw) = find_keyword_mut(state, *keyword_id) {
                kw.quality_score.apply_relevance_update(*delta);
            }
        }
        Action::AdjustLanding { keyword_id, delta } => {
            if let Some(kw) = find_keyword_mut(state, *keyword_id) {
                kw.quality_score.apply_landing_update(*delta);
            }
        }
    }
}

fn find_campaign_mut(state: &mut SimState, campaign_id: CampaignId) -> Option<&mut crate::entities::Campaign> {
    state
        .advertisers
        .iter_mut()
        .flat_map(|a| a.campaigns.iter_mut())
        .find(|c| c.id == campaign_id)
}

fn find_ad_group_mut(state: &mut SimState, ad_group_id: AdGroupId) -> Option<&mut crate::entities::AdGroup> {
    state
        .advertisers
        .iter_mut()
        .flat_map(|a| a.campaigns.iter_mut())
        .flat_map(|c| c.ad_groups.iter_mut())
        .find(|ag| ag.id == ad_group_id)
}

fn find_keyword_mut(state: &mut SimState, keyword_id: KeywordId) -> Option<&mut crate::entities::Keyword> {
    state
        .advertisers
        .iter_mut()
        .flat_map(|a| a.campaigns.iter_mut())
        .flat_map(|c| c.ad_groups.iter_mut())
        .flat_map(|ag| ag.keywords.iter_mut())
        .find(|k| k.id == keyword_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Advertiser;

    fn sample_state_with_keyword() -> SimState {
        use crate::entities::{AdGroup, Campaign, CampaignStatus, EntityStatus, Keyword, MatchType};
        use crate::quality_score::QualityScoreState;

        let keyword = Keyword {
            id: KeywordId::new(1),
            text: "buy villa dubai".into(),
            match_type: MatchType::Broad,
            status: EntityStatus::Active,
            bid_override: None,
            intent_tier: None,
            is_negative: false,
            quality_score: QualityScoreState::default(),
        };
        let ad_group = AdGroup {
            id: AdGroupId::new(1),
            name: "villas".into(),
            status: EntityStatus::Active,
            default_bid: 1.0,
            keywords: vec![keyword],
            ads: vec![],
        };
        let campaign = crate::entities::Campaign {
            id: CampaignId::new(1),
            name: "launch".into(),
            status: CampaignStatus::Active,
            budget: 100.0,
            daily_spend: 0.0,
            ad_groups: vec![ad_group],
        };
        let mut adv = Advertiser::new_user(AdvertiserId::new(1), "user", 100.0);
        adv.campaigns.push(campaign);
        SimState::new("s1", vec![adv])
    }

    #[test]
    fn apply_actions_sets_keyword_bid_override() {
        let state = sample_state_with_keyword();
        let actions = vec![Action::SetKeywordBid { keyword_id: KeywordId::new(1), bid: 3.5 }];
        let state = apply_actions(state, &actions);
        let kw = &state.advertisers[0].campaigns[0].ad_groups[0].keywords[0];
        assert_eq!(kw.bid_override, Some(3.5));
    }

    #[test]
    fn apply_actions_unknown_id_is_a_noop() {
        let state = sample_state_with_keyword();
        let actions = vec![Action::SetKeywordBid { keyword_id: KeywordId::new(999), bid: 3.5 }];
        let state = apply_actions(state, &actions);
        let kw = &state.advertisers[0].campaigns[0].ad_groups[0].keywords[0];
        assert_eq!(kw.bid_override, None);
    }

    #[test]
    fn apply_actions_pauses_campaign() {
        use crate::entities::CampaignStatus;
        let state = sample_state_with_keyword();
        let actions = vec![Action::SetCampaignStatus { campaign_id: CampaignId::new(1), status: CampaignStatus::Paused }];
        let state = apply_actions(state, &actions);
        assert_eq!(state.advertisers[0].campaigns[0].status, CampaignStatus::Paused);
    }

    #[test]
    fn user_advertiser_found_by_flag() {
        let adv = Advertiser::new_user(AdvertiserId::new(1), "user", 100.0);
        let state = SimState::new("s1", vec![adv]);
        assert!(state.user_advertiser().is_some());
        assert!(state.user_advertiser().unwrap().is_user);
    }

    #[test]
    fn fatigue_defaults_to_zero() {
        let state = SimState::new("s1", vec![]);
        assert_eq!(state.fatigue_for(AdvertiserId::new(1), "high/mobile/morning/primary"), 0.0);
    }

    #[test]
    fn update_fatigue_then_end_day_decays() {
        let mut state = SimState::new("s1", vec![]);
        let adv_id = AdvertiserId::new(1);
        state.update_fatigue(adv_id, "seg", 1200);
        assert_eq!(state.fatigue_for(adv_id, "seg"), 1.0);
        state.end_day_fatigue();
        assert!((state.fatigue_for(adv_id, "seg") - 0.92).abs() < 1e-9);
    }
}
