//! # adsim-core: Ad Auction Simulation Core
//!
//! Provides the fundamental data structures for a deterministic, day-stepped
//! advertising auction simulator: the advertiser entity tree, market
//! segments, quality score and fatigue state, and the per-day/per-run
//! output types.
//!
//! ## Design Philosophy
//!
//! Entities are modeled as a tree of owned `Vec`s:
//! - **Advertiser** owns **Campaign**s, owns **AdGroup**s, owns **Keyword**s/**Ad**s
//! - **LandingPage**s are owned by the advertiser and referenced by id from an `Ad`
//!
//! This keeps the registration-order iteration the engine's reproducibility
//! guarantee depends on (§5) implicit in the structure, while type-safe
//! newtype IDs ([`AdvertiserId`], [`CampaignId`], [`AdGroupId`], [`KeywordId`],
//! [`AdId`], [`LandingPageId`]) still prevent cross-entity id confusion.
//!
//! ## Quick Start
//!
//! ```rust
//! use adsim_core::entities::*;
//! use adsim_core::quality_score::QualityScoreState;
//!
//! let mut advertiser = Advertiser::new_user(AdvertiserId::new(1), "Acme Villas", 200.0);
//! advertiser.campaigns.push(Campaign {
//!     id: CampaignId::new(1),
//!     name: "Launch".to_string(),
//!     status: CampaignStatus::Active,
//!     budget: 200.0,
//!     daily_spend: 0.0,
//!     ad_groups: vec![AdGroup {
//!         id: AdGroupId::new(1),
//!         name: "Villas".to_string(),
//!         status: EntityStatus::Active,
//!         default_bid: 2.0,
//!         keywords: vec![Keyword {
//!             id: KeywordId::new(1),
//!             text: "buy villa dubai".to_string(),
//!             match_type: MatchType::Broad,
//!             status: EntityStatus::Active,
//!             bid_override: None,
//!             intent_tier: None,
//!             is_negative: false,
//!             quality_score: QualityScoreState::default(),
//!         }],
//!         ads: vec![],
//!     }],
//! });
//! ```
//!
//! ## Modules
//!
//! - [`config`] - The fully-resolved `ScenarioConfig` the day engine reads
//! - [`entities`] - Advertiser/Campaign/AdGroup/Keyword/Ad/LandingPage tree
//! - [`segment`] - The 48-cell (intent x device x time-bucket x geo) demand partition
//! - [`quality_score`] - Per-keyword `QualityScoreState` and landing-experience scoring
//! - [`fatigue`] - Per-(advertiser, segment) `FatigueState`
//! - [`state`] - `SimState` and the `Action` enum `apply_actions` consumes
//! - [`metrics`] - `DayMetrics`, `CausalLog`, `RunResult`
//! - [`rng`] - Seeded, forkable randomness (`SeededRng`, `day_rng`)
//! - [`diagnostics`] - Scenario-validation diagnostic reporting
//! - [`error`] - Unified `AdsimError`/`AdsimResult`
//!
//! ## Integration with adsim-algo
//!
//! The adsim-algo crate implements the matching, auction, click/conversion,
//! and day-engine algorithms that operate on the types defined here.

pub mod config;
pub mod diagnostics;
pub mod entities;
pub mod error;
pub mod fatigue;
pub mod metrics;
pub mod quality_score;
pub mod rng;
pub mod segment;
pub mod state;

pub use config::{CtrCvrConfig, DemandConfig, EventShock, FatigueConfig, QualityScoreConfig, ScenarioConfig, Seasonality};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use entities::{
    Ad, AdGroup, AdGroupId, AdId, Advertiser, AdvertiserId, Campaign, CampaignId, CampaignStatus,
    CompetitorArchetype, EntityStatus, Keyword, KeywordId, LandingPage, LandingPageId, MatchType,
};
pub use error::{AdsimError, AdsimResult};
pub use fatigue::FatigueState;
pub use metrics::{CausalLog, DayMetrics, KeywordMetrics, RunResult, SegmentMetrics};
pub use quality_score::QualityScoreState;
pub use rng::{day_rng, SeededRng};
pub use segment::{all_segments, DeviceType, Geo, IntentLevel, Segment, TimeBucket};
pub use state::{apply_actions, Action, SimState};
