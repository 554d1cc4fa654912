//! # adsim-scenarios: Scenario Config Loading and Initial-State Construction
//!
//! Loads scenario configuration documents from YAML/JSON and builds the
//! initial `SimState` a run starts from.
//!
//! ## Modules
//!
//! - [`spec`] - `ScenarioSet`/`ScenarioSpec` document parsing, override
//!   resolution into `adsim_core::ScenarioConfig`, and validation
//! - [`apply`] - synthesizes competitor advertisers from `competitor_mix`
//!   and assembles the run's initial `SimState`

pub mod apply;
pub mod spec;

pub use apply::{build_competitor_advertisers, build_initial_state, CompetitorIdAllocator};
pub use spec::{load_spec_from_path, resolve_scenarios, validate, ResolvedScenario, ScenarioOverrides, ScenarioSet, ScenarioSpec};
