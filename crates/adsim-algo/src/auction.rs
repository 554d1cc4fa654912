//! Pay-per-click auction: ad-rank, probabilistic position allocation, and
//! generalized second-price pricing.

use adsim_core::entities::{AdGroupId, AdId, AdvertiserId, CampaignId, KeywordId};
use adsim_core::rng::SeededRng;
use std::collections::HashMap;

pub const DEFAULT_MAX_POSITIONS: usize = 8;
pub const DEFAULT_MIN_AD_RANK: f64 = 0.1;
pub const MIN_CPC: f64 = 0.01;
pub const CPC_EPSILON: f64 = 0.01;
const SOFTMAX_TAU: f64 = 0.65;

/// One advertiser's bid entering a single query's auction.
#[derive(Debug, Clone)]
pub struct AuctionEntry {
    pub advertiser_id: AdvertiserId,
    pub campaign_id: CampaignId,
    pub ad_group_id: AdGroupId,
    pub keyword_id: KeywordId,
    pub ad_id: AdId,
    pub bid: f64,
    pub quality_score: f64,
    pub context_factor: f64,
    pub format_factor: f64,
}

impl AuctionEntry {
    /// `AdRank = bid * quality_score * context_factor * format_factor`.
    pub fn ad_rank(&self) -> f64 {
        self.bid * self.quality_score * self.context_factor * self.format_factor
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    Rank,
    Budget,
}

/// An advertiser's outcome in one auction.
#[derive(Debug, Clone)]
pub struct AuctionPosition {
    pub advertiser_id: AdvertiserId,
    pub campaign_id: CampaignId,
    pub ad_group_id: AdGroupId,
    pub keyword_id: KeywordId,
    pub ad_id: AdId,
    /// 1-indexed; 0 means not shown.
    pub position: u32,
    pub ad_rank: f64,
    pub cpc: f64,
    pub won_auction: bool,
    pub loss_reason: Option<LossReason>,
}

/// Complete result of running one query's auction.
#[derive(Debug, Clone)]
pub struct AuctionResult {
    pub positions: Vec<AuctionPosition>,
    pub total_eligible: usize,
    pub total_shown: usize,
}

impl AuctionResult {
    pub fn position_for(&self, advertiser_id: AdvertiserId) -> Option<&AuctionPosition> {
        self.positions.iter().find(|p| p.advertiser_id == advertiser_id)
    }
}

/// Allocate 1-indexed positions over `ad_ranks` via temperature-softmax
/// sampling. With `rng = None`, falls back to a deterministic descending
/// ad-rank sort (used only by isolated unit tests, never by the day engine
/// — see SPEC_FULL §11).
pub fn softmax_positions(ad_ranks: &[f64], tau: f64, rng: Option<&mut SeededRng>) -> Vec<u32> {
    let n = ad_ranks.len();
    if n == 0 {
        return vec![];
    }
    if n == 1 {
        return vec![1];
    }

    let rng = match rng {
        Some(rng) => rng,
        None => {
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&a, &b| ad_ranks[b].partial_cmp(&ad_ranks[a]).unwrap());
            let mut positions = vec![0u32; n];
            for (pos, idx) in order.into_iter().enumerate() {
                positions[idx] = (pos + 1) as u32;
            }
            return positions;
        }
    };

    let max_rank = ad_ranks.iter().cloned().fold(f64::MIN, f64::max);
    let exp_ranks: Vec<f64> = ad_ranks.iter().map(|r| ((r - max_rank) / tau).exp()).collect();

    let mut positions = vec![0u32; n];
    let mut remaining: Vec<usize> = (0..n).collect();

    for position in 1..=n {
        if remaining.is_empty() {
            break;
        }
        let remaining_weights: Vec<f64> = remaining.iter().map(|&i| exp_ranks[i]).collect();
        let winner_local = rng.weighted_choice(&remaining_weights).unwrap_or(0);
        let winner_idx = remaining.remove(winner_local);
        positions[winner_idx] = position as u32;
    }

    positions
}

/// Generalized second-price CPC: `max(min_cpc, next_ad_rank / (qs * context) + epsilon)`.
/// Returns `min_cpc` if the denominator is non-positive.
pub fn calculate_cpc(
    _winner_ad_rank: f64,
    winner_qs: f64,
    winner_context: f64,
    next_ad_rank: f64,
    min_cpc: f64,
    epsilon: f64,
) -> f64 {
    let denominator = winner_qs * winner_context;
    if denominator <= 0.0 {
        return min_cpc;
    }
    let cpc = next_ad_rank / denominator + epsilon;
    min_cpc.max(cpc)
}

/// Run a single query's auction over `entries`.
///
/// Eligibility: `ad_rank < min_ad_rank` is rank-excluded; otherwise a
/// non-positive `budget_remaining[(advertiser, campaign)]` is
/// budget-excluded — keyed per campaign, since one advertiser's campaigns
/// track budget independently. Eligible entries beyond `max_positions` are
/// shown=false, `loss_reason = rank`.
pub fn run_auction(
    entries: &[AuctionEntry],
    max_positions: usize,
    min_ad_rank: f64,
    budget_remaining: &HashMap<(AdvertiserId, CampaignId), f64>,
    rng: Option<&mut SeededRng>,
) -> AuctionResult {
    if entries.is_empty() {
        return AuctionResult { positions: vec![], total_eligible: 0, total_shown: 0 };
    }

    let mut positions_list = Vec::with_capacity(entries.len());
    let mut eligible: Vec<&AuctionEntry> = Vec::with_capacity(entries.len());

    for entry in entries {
        let ad_rank = entry.ad_rank();
        if ad_rank < min_ad_rank {
            positions_list.push(AuctionPosition {
                advertiser_id: entry.advertiser_id,
                campaign_id: entry.campaign_id,
                ad_group_id: entry.ad_group_id,
                keyword_id: entry.keyword_id,
                ad_id: entry.ad_id,
                position: 0,
                ad_rank,
                cpc: 0.0,
                won_auction: false,
                loss_reason: Some(LossReason::Rank),
            });
            continue;
        }
        let remaining = budget_remaining.get(&(entry.advertiser_id, entry.campaign_id)).copied().unwrap_or(f64::INFINITY);
        if remaining <= 0.0 {
            positions_list.push(AuctionPosition {
                advertiser_id: entry.advertiser_id,
                campaign_id: entry.campaign_id,
                ad_group_id: entry.ad_group_id,
                keyword_id: entry.keyword_id,
                ad_id: entry.ad_id,
                position: 0,
                ad_rank,
                cpc: 0.0,
                won_auction: false,
                loss_reason: Some(LossReason::Budget),
            });
            continue;
        }
        eligible.push(entry);
    }

    let total_eligible = eligible.len();
    if eligible.is_empty() {
        return AuctionResult { positions: positions_list, total_eligible: 0, total_shown: 0 };
    }

    eligible.sort_by(|a, b| {
        b.ad_rank()
            .partial_cmp(&a.ad_rank())
            .unwrap()
            .then(a.advertiser_id.value().cmp(&b.advertiser_id.value()))
    });

    let shown: Vec<&AuctionEntry> = eligible.iter().take(max_positions).copied().collect();
    let not_shown: Vec<&AuctionEntry> = eligible.iter().skip(max_positions).copied().collect();

    let ad_ranks: Vec<f64> = shown.iter().map(|e| e.ad_rank()).collect();
    let allocated = softmax_positions(&ad_ranks, SOFTMAX_TAU, rng);

    for (i, entry) in shown.iter().enumerate() {
        let position = allocated[i];

        let mut next_ad_rank = min_ad_rank;
        for (j, &other_position) in allocated.iter().enumerate() {
            if other_position == position + 1 {
                next_ad_rank = shown[j].ad_rank();
                break;
            }
        }

        let cpc = calculate_cpc(
            entry.ad_rank(),
            entry.quality_score,
            entry.context_factor,
            next_ad_rank,
            MIN_CPC,
            CPC_EPSILON,
        );

        positions_list.push(AuctionPosition {
            advertiser_id: entry.advertiser_id,
            campaign_id: entry.campaign_id,
            ad_group_id: entry.ad_group_id,
            keyword_id: entry.keyword_id,
            ad_id: entry.ad_id,
            position,
            ad_rank: entry.ad_rank(),
            cpc,
            won_auction: true,
            loss_reason: None,
        });
    }

    for entry in &not_shown {
        positions_list.push(AuctionPosition {
            advertiser_id: entry.advertiser_id,
            campaign_id: entry.campaign_id,
            ad_group_id: entry.ad_group_id,
            keyword_id: entry.keyword_id,
            ad_id: entry.ad_id,
            position: 0,
            ad_rank: entry.ad_rank(),
            cpc: 0.0,
            won_auction: false,
            loss_reason: Some(LossReason::Rank),
        });
    }

    AuctionResult { positions: positions_list, total_eligible, total_shown: shown.len() }
}

/// Impression share and loss breakdown over the auctions the user was
/// eligible for. All three ratios are `0.0` when `total_eligible == 0`.
pub fn calculate_impression_share(
    user_impressions: u64,
    total_eligible_auctions: u64,
    lost_to_budget: u64,
    lost_to_rank: u64,
) -> (f64, f64, f64) {
    if total_eligible_auctions == 0 {
        return (0.0, 0.0, 0.0);
    }
    let total = total_eligible_auctions as f64;
    (
        user_impressions as f64 / total,
        lost_to_budget as f64 / total,
        lost_to_rank as f64 / total,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(advertiser: usize, bid: f64, qs: f64) -> AuctionEntry {
        AuctionEntry {
            advertiser_id: AdvertiserId::new(advertiser),
            campaign_id: CampaignId::new(1),
            ad_group_id: AdGroupId::new(1),
            keyword_id: KeywordId::new(1),
            ad_id: AdId::new(1),
            bid,
            quality_score: qs,
            context_factor: 1.0,
            format_factor: 1.0,
        }
    }

    #[test]
    fn cpc_identity_matches_reference() {
        let cpc = calculate_cpc(10.0, 0.8, 1.0, 6.0, MIN_CPC, CPC_EPSILON);
        assert!((cpc - 7.51).abs() < 0.01);
    }

    #[test]
    fn cpc_floors_at_min_when_denominator_nonpositive() {
        let cpc = calculate_cpc(10.0, 0.0, 1.0, 6.0, MIN_CPC, CPC_EPSILON);
        assert_eq!(cpc, MIN_CPC);
    }

    #[test]
    fn rank_exclusion_is_flagged() {
        let entries = vec![entry(1, 5.0, 0.8), entry(2, 0.1, 0.1)];
        let budgets = HashMap::new();
        let result = run_auction(&entries, DEFAULT_MAX_POSITIONS, DEFAULT_MIN_AD_RANK, &budgets, None);
        let low = result.position_for(AdvertiserId::new(2)).unwrap();
        assert!(!low.won_auction);
        assert_eq!(low.loss_reason, Some(LossReason::Rank));
    }

    #[test]
    fn budget_exclusion_is_flagged() {
        let entries = vec![entry(1, 5.0, 0.8), entry(2, 5.0, 0.8)];
        let mut budgets = HashMap::new();
        budgets.insert((AdvertiserId::new(1), CampaignId::new(1)), 0.0);
        budgets.insert((AdvertiserId::new(2), CampaignId::new(1)), 100.0);
        let result = run_auction(&entries, DEFAULT_MAX_POSITIONS, DEFAULT_MIN_AD_RANK, &budgets, None);
        let excluded = result.position_for(AdvertiserId::new(1)).unwrap();
        assert!(!excluded.won_auction);
        assert_eq!(excluded.loss_reason, Some(LossReason::Budget));
        let winner = result.position_for(AdvertiserId::new(2)).unwrap();
        assert!(winner.won_auction);
    }

    #[test]
    fn monopoly_single_entry_wins_position_one() {
        let entries = vec![entry(1, 2.0, 0.9)];
        let budgets = HashMap::new();
        let mut rng = SeededRng::new(42);
        let result = run_auction(&entries, DEFAULT_MAX_POSITIONS, DEFAULT_MIN_AD_RANK, &budgets, Some(&mut rng));
        let pos = result.position_for(AdvertiserId::new(1)).unwrap();
        assert!(pos.won_auction);
        assert_eq!(pos.position, 1);
        assert_eq!(result.total_eligible, 1);
    }

    #[test]
    fn impression_share_defined_zero_when_no_eligible_auctions() {
        let (is, lost_budget, lost_rank) = calculate_impression_share(0, 0, 0, 0);
        assert_eq!(is, 0.0);
        assert_eq!(lost_budget, 0.0);
        assert_eq!(lost_rank, 0.0);
    }

    #[test]
    fn impression_share_computes_ratios() {
        let (is, lost_budget, lost_rank) = calculate_impression_share(60, 100, 20, 20);
        assert!((is - 0.6).abs() < 1e-9);
        assert!((lost_budget - 0.2).abs() < 1e-9);
        assert!((lost_rank - 0.2).abs() < 1e-9);
    }
}
