//! # adsim-algo: Matching, Auction, and Day-Engine Algorithms
//!
//! Implements the algorithms that operate on the entity tree and state types
//! defined in `adsim-core`: keyword/query matching, the pay-per-click
//! auction, click/conversion sampling, and the day-stepped simulation engine
//! that ties them together.
//!
//! ## Modules
//!
//! - [`matching`] - Exact/phrase/broad keyword matching and negative blocking
//! - [`auction`] - Ad rank, softmax position allocation, generalized second-price CPC
//! - [`clicks`] - CTR/CVR formulas and click/conversion sampling
//! - [`engine`] - `simulate_day`/`simulate_run`, orchestrating the above per day
//! - [`arena`] - Bump-allocated scratch space for a day's transient collections
//!
//! ## Example
//!
//! ```ignore
//! use adsim_algo::engine::simulate_run;
//! use adsim_core::ScenarioConfig;
//! use std::collections::HashMap;
//!
//! let result = simulate_run(initial_state, &HashMap::new(), &ScenarioConfig::default(), 42, 30);
//! println!("day 30 impression share: {:.2}", result.daily_metrics[29].impression_share);
//! ```

pub mod arena;
pub mod auction;
pub mod clicks;
pub mod engine;
pub mod matching;

pub use arena::ArenaContext;
pub use auction::{run_auction, AuctionEntry, AuctionPosition, AuctionResult, LossReason};
pub use clicks::{compute_ctr, compute_cvr, simulate_click, simulate_conversion, ClickOutcome, ConversionOutcome};
pub use engine::{simulate_day, simulate_run};
pub use matching::{match_keyword, MatchResult, NegativeKeyword};
