//! The advertiser -> campaign -> ad group -> keyword/ad entity tree.
//!
//! Entities are stored as a tree of owned `Vec`s (an `Advertiser` owns its
//! `Campaign`s, a `Campaign` owns its `AdGroup`s, and so on) rather than a
//! flat arena indexed by integer: at this depth (four levels) and fan-out
//! (a handful of campaigns/ad-groups/keywords per advertiser) a tree of
//! `Vec`s traverses just as sequentially as a flattened one while keeping
//! the iteration order the engine depends on for reproducibility (§5:
//! advertisers in registration order, a campaign's ad groups in
//! registration order) implicit in the structure instead of reconstructed
//! from parent pointers. IDs are still newtype-wrapped so a `KeywordId`
//! can never be confused with an `AdId`.

use serde::{Deserialize, Serialize};

use crate::quality_score::QualityScoreState;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            #[inline]
            pub fn new(value: usize) -> Self {
                $name(value)
            }
            #[inline]
            pub fn value(&self) -> usize {
                self.0
            }
        }
    };
}

entity_id!(AdvertiserId);
entity_id!(CampaignId);
entity_id!(AdGroupId);
entity_id!(KeywordId);
entity_id!(AdId);
entity_id!(LandingPageId);

/// Keyword match types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Phrase,
    Broad,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Phrase => "phrase",
            MatchType::Broad => "broad",
        }
    }
}

/// Status shared by ad groups, keywords, and ads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Paused,
    Removed,
}

impl EntityStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, EntityStatus::Active)
    }
}

/// Campaign-level status; campaigns additionally distinguish `Ended`/`Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Paused,
    Ended,
    Draft,
}

impl CampaignStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, CampaignStatus::Active)
    }
}

/// Behavioral archetype for a competitor advertiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitorArchetype {
    Aggressive,
    Defensive,
    Neutral,
}

impl CompetitorArchetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitorArchetype::Aggressive => "aggressive",
            CompetitorArchetype::Defensive => "defensive",
            CompetitorArchetype::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandingPage {
    pub id: LandingPageId,
    pub relevance_score: f64,
    pub load_time_ms: f64,
    pub mobile_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,
    pub status: EntityStatus,
    /// Composite ad strength in `[0, 1]`, feeding CTR's `ad_strength` term.
    pub ad_strength: f64,
    pub landing_page_id: Option<LandingPageId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: KeywordId,
    pub text: String,
    pub match_type: MatchType,
    pub status: EntityStatus,
    pub bid_override: Option<f64>,
    pub intent_tier: Option<crate::segment::IntentLevel>,
    pub is_negative: bool,
    pub quality_score: QualityScoreState,
}

impl Keyword {
    pub fn effective_bid(&self, default_bid: f64) -> f64 {
        self.bid_override.unwrap_or(default_bid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdGroup {
    pub id: AdGroupId,
    pub name: String,
    pub status: EntityStatus,
    pub default_bid: f64,
    pub keywords: Vec<Keyword>,
    pub ads: Vec<Ad>,
}

impl AdGroup {
    /// Negative keywords belonging to this ad group, pre-extracted so the
    /// day engine can build one flat negatives slice per ad group at day
    /// start instead of re-filtering per query (§9).
    pub fn negatives(&self) -> Vec<&Keyword> {
        self.keywords.iter().filter(|k| k.is_negative).collect()
    }

    pub fn positive_keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.iter().filter(|k| !k.is_negative && k.status.is_active())
    }

    pub fn first_active_ad(&self) -> Option<&Ad> {
        self.ads.iter().find(|a| a.status.is_active())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub status: CampaignStatus,
    pub budget: f64,
    pub daily_spend: f64,
    pub ad_groups: Vec<AdGroup>,
}

impl Campaign {
    pub fn budget_remaining(&self) -> f64 {
        self.budget - self.daily_spend
    }

    pub fn has_budget(&self) -> bool {
        self.budget_remaining() > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertiser {
    pub id: AdvertiserId,
    pub name: String,
    /// `true` for the single advertiser whose results the run reports on.
    pub is_user: bool,
    pub daily_budget: f64,
    pub campaigns: Vec<Campaign>,
    pub landing_pages: Vec<LandingPage>,

    /// Competitor-only fields; `None` for the user advertiser.
    pub archetype: Option<CompetitorArchetype>,
    pub bid_multiplier: f64,
    pub base_quality_score: f64,
}

impl Advertiser {
    pub fn new_user(id: AdvertiserId, name: impl Into<String>, daily_budget: f64) -> Self {
        Self {
            id,
            name: name.into(),
            is_user: true,
            daily_budget,
            campaigns: Vec::new(),
            landing_pages: Vec::new(),
            archetype: None,
            bid_multiplier: 1.0,
            base_quality_score: 0.5,
        }
    }

    pub fn new_competitor(
        id: AdvertiserId,
        name: impl Into<String>,
        archetype: CompetitorArchetype,
        bid_multiplier: f64,
        base_quality_score: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            is_user: false,
            daily_budget: 0.0,
            campaigns: Vec::new(),
            landing_pages: Vec::new(),
            archetype: Some(archetype),
            bid_multiplier,
            base_quality_score: base_quality_score.clamp(0.0, 1.0),
        }
    }

    pub fn reset_daily_spend(&mut self) {
        for campaign in &mut self.campaigns {
            campaign.daily_spend = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keyword(id: usize, is_negative: bool) -> Keyword {
        Keyword {
            id: KeywordId::new(id),
            text: "buy villa dubai".into(),
            match_type: MatchType::Broad,
            status: EntityStatus::Active,
            bid_override: None,
            intent_tier: None,
            is_negative,
            quality_score: QualityScoreState::default(),
        }
    }

    #[test]
    fn ad_group_negatives_filters_correctly() {
        let ag = AdGroup {
            id: AdGroupId::new(1),
            name: "villas".into(),
            status: EntityStatus::Active,
            default_bid: 1.0,
            keywords: vec![sample_keyword(1, false), sample_keyword(2, true)],
            ads: vec![],
        };
        assert_eq!(ag.negatives().len(), 1);
        assert_eq!(ag.positive_keywords().count(), 1);
    }

    #[test]
    fn campaign_budget_remaining() {
        let mut campaign = Campaign {
            id: CampaignId::new(1),
            name: "launch".into(),
            status: CampaignStatus::Active,
            budget: 200.0,
            daily_spend: 50.0,
            ad_groups: vec![],
        };
        assert_eq!(campaign.budget_remaining(), 150.0);
        assert!(campaign.has_budget());
        campaign.daily_spend = 200.0;
        assert!(!campaign.has_budget());
    }

    #[test]
    fn effective_bid_prefers_override() {
        let mut kw = sample_keyword(1, false);
        assert_eq!(kw.effective_bid(1.5), 1.5);
        kw.bid_override = Some(3.0);
        assert_eq!(kw.effective_bid(1.5), 3.0);
    }

    #[test]
    fn reset_daily_spend_zeroes_all_campaigns() {
        let mut adv = Advertiser::new_user(AdvertiserId::new(1), "user", 500.0);
        adv.campaigns.push(Campaign {
            id: CampaignId::new(1),
            name: "c1".into(),
            status: CampaignStatus::Active,
            budget: 100.0,
            daily_spend: 40.0,
            ad_groups: vec![],
        });
        adv.reset_daily_spend();
        assert_eq!(adv.campaigns[0].daily_spend, 0.0);
    }
}
