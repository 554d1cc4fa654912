//! The day-stepped simulation engine: ties matching, auction, and
//! click/conversion sampling together into `simulate_day`/`simulate_run`.

use std::collections::HashMap;

use adsim_core::config::{event_multiplier_for_day, ScenarioConfig};
use adsim_core::entities::AdvertiserId;
use adsim_core::segment::{all_segments, DeviceType, Segment};
use adsim_core::{Action, CausalLog, DayMetrics, RunResult, SeededRng, SimState};

use crate::auction::{self, AuctionEntry, LossReason};
use crate::clicks;
use crate::matching::{self, NegativeKeyword};

/// How many of the day's queries in a segment still need generating,
/// before seasonality/event multipliers and per-axis shares are applied.
fn segment_query_count(segment: &Segment, config: &ScenarioConfig, seasonality_mult: f64, event_mult: f64) -> u64 {
    let demand = &config.demand;
    let raw = demand.daily_baseline as f64
        * demand.intent_share(segment.intent)
        * demand.device_share(segment.device)
        * demand.geo_share(segment.geo)
        * demand.time_share(segment.time_bucket)
        * seasonality_mult
        * event_mult;
    raw.max(0.0) as u64
}

/// Sample one query's text from the scenario's topic lexicon. Real-user
/// query semantics are out of scope (queries are synthesized from
/// per-segment demand, not parsed from real traffic); this picks uniformly
/// among the configured topics so keyword matching has real text to
/// classify instead of an unmatchable numeric placeholder.
fn sample_query_text(topics: &[String], rng: &mut SeededRng) -> String {
    if topics.is_empty() {
        return "generic query".to_string();
    }
    let idx = rng.randint(0, topics.len() as i64 - 1) as usize;
    topics[idx].clone()
}

/// Simulate a single day: apply pending actions, generate demand for all 48
/// segments, run matching and auctions per query, sample clicks and
/// conversions for the user advertiser, and roll the results into
/// `DayMetrics` plus a causal attribution log.
pub fn simulate_day(
    state: SimState,
    actions: &[Action],
    day: u32,
    config: &ScenarioConfig,
    rng: &mut SeededRng,
) -> (SimState, DayMetrics, Vec<CausalLog>) {
    let mut state = adsim_core::apply_actions(state, actions);
    state.current_day = day;
    state.reset_daily_spend();

    let mut metrics = DayMetrics::new(day);
    let mut causal_log = CausalLog::new();

    let user_adv_id = match state.user_advertiser() {
        Some(adv) => adv.id,
        None => return (state, metrics, vec![causal_log]),
    };

    let seasonality_mult = config.seasonality.multiplier_for_day(day);
    let event_mult = event_multiplier_for_day(&config.event_shocks, day);

    let mut total_position_sum = 0.0;
    let mut total_qs_sum = 0.0;
    let mut eligible_auctions: u64 = 0;
    let mut won_auctions: u64 = 0;
    let mut lost_budget: u64 = 0;
    let mut lost_rank: u64 = 0;

    for segment in all_segments() {
        let segment_demand = segment_query_count(&segment, config, seasonality_mult, event_mult);
        let segment_key = segment.to_key();
        let fatigue = state.fatigue_for(user_adv_id, &segment_key);
        let is_mobile = segment.device == DeviceType::Mobile;

        let mut segment_impressions: u64 = 0;

        for _ in 0..segment_demand {
            let query_text = sample_query_text(&config.demand.query_topics, rng);

            let mut entries: Vec<AuctionEntry> = Vec::new();
            for adv in &state.advertisers {
                for campaign in &adv.campaigns {
                    if !campaign.status.is_active() || !campaign.has_budget() {
                        continue;
                    }
                    for ad_group in &campaign.ad_groups {
                        if !ad_group.status.is_active() {
                            continue;
                        }
                        let negatives: Vec<NegativeKeyword> = ad_group
                            .negatives()
                            .iter()
                            .map(|kw| NegativeKeyword { text: kw.text.clone(), match_type: kw.match_type })
                            .collect();

                        for keyword in ad_group.positive_keywords() {
                            let result = matching::match_keyword(
                                &keyword.text,
                                &query_text,
                                keyword.match_type,
                                &negatives,
                                true,
                                1.0,
                            );
                            if !result.matched {
                                continue;
                            }
                            let ad = match ad_group.first_active_ad() {
                                Some(ad) => ad,
                                None => break,
                            };
                            let bid = keyword.effective_bid(ad_group.default_bid) * if adv.is_user { 1.0 } else { adv.bid_multiplier };
                            let quality_score = if adv.is_user { keyword.quality_score.score() } else { adv.base_quality_score };

                            entries.push(AuctionEntry {
                                advertiser_id: adv.id,
                                campaign_id: campaign.id,
                                ad_group_id: ad_group.id,
                                keyword_id: keyword.id,
                                ad_id: ad.id,
                                bid,
                                quality_score,
                                context_factor: 1.0,
                                format_factor: 1.0,
                            });
                            break;
                        }
                    }
                }
            }

            if entries.is_empty() {
                continue;
            }

            let user_bid = entries.iter().any(|e| e.advertiser_id == user_adv_id);
            if user_bid {
                eligible_auctions += 1;
            }

            let mut budget_remaining: HashMap<(AdvertiserId, adsim_core::entities::CampaignId), f64> = HashMap::new();
            for adv in &state.advertisers {
                for campaign in &adv.campaigns {
                    budget_remaining.insert((adv.id, campaign.id), campaign.budget_remaining());
                }
            }

            let auction_result = auction::run_auction(
                &entries,
                auction::DEFAULT_MAX_POSITIONS,
                auction::DEFAULT_MIN_AD_RANK,
                &budget_remaining,
                Some(rng),
            );

            let user_pos = match auction_result.position_for(user_adv_id) {
                Some(pos) => pos.clone(),
                None => continue,
            };

            if !user_pos.won_auction {
                match user_pos.loss_reason {
                    Some(LossReason::Budget) => lost_budget += 1,
                    _ => lost_rank += 1,
                }
                continue;
            }
            won_auctions += 1;

            // Extract the scalars the click/conversion formulas need as owned
            // values up front, so no borrow of `state` survives into the
            // mutable borrow taken below to debit campaign spend.
            let (ad_strength, ad_relevance, landing_info) = {
                let user_keyword = find_user_keyword(&state, user_adv_id, user_pos.keyword_id);
                let user_ad = find_user_ad(&state, user_adv_id, user_pos.ad_id);
                let landing_info = user_ad.and_then(|ad| ad.landing_page_id).and_then(|lp_id| {
                    state
                        .user_advertiser()
                        .and_then(|adv| adv.landing_pages.iter().find(|lp| lp.id == lp_id))
                        .map(|lp| (lp.relevance_score, lp.load_time_ms, lp.mobile_score))
                });
                (
                    user_ad.map(|ad| ad.ad_strength).unwrap_or(0.5),
                    user_keyword.map(|kw| kw.quality_score.ad_relevance).unwrap_or(0.5),
                    landing_info,
                )
            };

            let intent = segment.intent;
            let base_ctr = config.ctr_cvr.base_ctr(intent);
            let ctr = clicks::compute_ctr(base_ctr, user_pos.position as i32, ad_strength, ad_relevance, fatigue, 0.1, rng);
            let click_outcome = clicks::simulate_click(ctr, config.fraud_rate, Some(rng));

            let user_entry_qs = entries
                .iter()
                .find(|e| e.advertiser_id == user_adv_id)
                .map(|e| e.quality_score)
                .unwrap_or(0.5);

            metrics.impressions += 1;
            segment_impressions += 1;
            total_position_sum += user_pos.position as f64;
            total_qs_sum += user_entry_qs;

            if click_outcome.clicked {
                metrics.clicks += 1;
                metrics.cost += user_pos.cpc;
                if let Some(campaign) = find_user_campaign_mut(&mut state, user_adv_id, user_pos.campaign_id) {
                    campaign.daily_spend += user_pos.cpc;
                }

                if click_outcome.is_fraud {
                    metrics.fraud_clicks += 1;
                } else {
                    let landing_mult = landing_info
                        .map(|(relevance, load_ms, mobile_score)| clicks::calculate_landing_multiplier(relevance, load_ms, mobile_score, is_mobile))
                        .unwrap_or(1.0);

                    let base_cvr = config.ctr_cvr.base_cvr(intent);
                    let cvr = clicks::compute_cvr(base_cvr, landing_mult, 1.0, 1.0, 0.0, 0.1, rng);
                    let conv = clicks::simulate_conversion(cvr, config.tracking_loss_rate, 7, Some(rng));

                    if conv.converted {
                        if conv.is_tracked {
                            metrics.conversions += 1;
                            metrics.revenue += config.revenue_per_conversion;
                        } else {
                            metrics.tracking_lost_conversions += 1;
                        }
                    }
                }
            }
        }

        state.update_fatigue(user_adv_id, &segment_key, segment_impressions);
    }

    metrics.avg_position = if metrics.impressions > 0 { total_position_sum / metrics.impressions as f64 } else { 0.0 };
    metrics.avg_quality_score = if metrics.impressions > 0 { total_qs_sum / metrics.impressions as f64 } else { 0.0 };

    let (impression_share, lost_is_budget, lost_is_rank) =
        auction::calculate_impression_share(won_auctions, eligible_auctions, lost_budget, lost_rank);
    metrics.impression_share = impression_share;
    metrics.lost_is_budget = lost_is_budget;
    metrics.lost_is_rank = lost_is_rank;

    if lost_budget > lost_rank {
        causal_log.add_driver("budget_limited", 0.4);
    }
    if lost_rank > lost_budget {
        causal_log.add_driver("rank_loss", 0.3);
    }
    if metrics.fraud_clicks > 0 {
        causal_log.add_driver("fraud", 0.1);
    }
    if metrics.tracking_lost_conversions > 0 {
        causal_log.add_driver("tracking_loss", 0.1);
    }
    causal_log.normalize();
    metrics.causal_log = causal_log.clone();

    if let Some(user_adv) = state.user_advertiser_mut() {
        for campaign in &mut user_adv.campaigns {
            for ad_group in &mut campaign.ad_groups {
                for keyword in &mut ad_group.keywords {
                    keyword.quality_score.update_from_day(metrics.impressions, metrics.clicks, metrics.conversions);
                }
            }
        }
    }
    state.end_day_fatigue();

    (state, metrics, vec![causal_log])
}

fn find_user_keyword(
    state: &SimState,
    user_adv_id: AdvertiserId,
    keyword_id: adsim_core::entities::KeywordId,
) -> Option<&adsim_core::entities::Keyword> {
    state
        .advertisers
        .iter()
        .find(|a| a.id == user_adv_id)
        .into_iter()
        .flat_map(|a| a.campaigns.iter())
        .flat_map(|c| c.ad_groups.iter())
        .flat_map(|ag| ag.keywords.iter())
        .find(|k| k.id == keyword_id)
}

fn find_user_ad(state: &SimState, user_adv_id: AdvertiserId, ad_id: adsim_core::entities::AdId) -> Option<&adsim_core::entities::Ad> {
    state
        .advertisers
        .iter()
        .find(|a| a.id == user_adv_id)
        .into_iter()
        .flat_map(|a| a.campaigns.iter())
        .flat_map(|c| c.ad_groups.iter())
        .flat_map(|ag| ag.ads.iter())
        .find(|a| a.id == ad_id)
}

fn find_user_campaign_mut(
    state: &mut SimState,
    user_adv_id: AdvertiserId,
    campaign_id: adsim_core::entities::CampaignId,
) -> Option<&mut adsim_core::entities::Campaign> {
    state
        .advertisers
        .iter_mut()
        .find(|a| a.id == user_adv_id)
        .into_iter()
        .flat_map(|a| a.campaigns.iter_mut())
        .find(|c| c.id == campaign_id)
}

/// Run a complete simulation: `n_days` sequential calls to `simulate_day`,
/// each with a fresh per-day RNG derived from `(seed, day)` (§5: day
/// execution is strictly sequential and the day's RNG stream depends only
/// on its own day number, not on prior days' call history).
pub fn simulate_run(initial_state: SimState, actions_by_day: &HashMap<u32, Vec<Action>>, config: &ScenarioConfig, seed: u64, n_days: u32) -> RunResult {
    let mut state = initial_state;
    let mut daily_metrics = Vec::with_capacity(n_days as usize);
    let mut causal_logs = Vec::with_capacity(n_days as usize);

    for day in 1..=n_days {
        let mut rng = adsim_core::day_rng(seed, day);
        let empty = Vec::new();
        let actions = actions_by_day.get(&day).unwrap_or(&empty);

        let (new_state, metrics, day_causal_logs) = simulate_day(state, actions, day, config, &mut rng);
        state = new_state;
        daily_metrics.push(metrics);
        causal_logs.extend(day_causal_logs);
    }

    RunResult {
        seed,
        n_days,
        final_state: state,
        daily_metrics,
        keyword_metrics: Vec::new(),
        segment_metrics: Vec::new(),
        causal_logs,
    }
}
