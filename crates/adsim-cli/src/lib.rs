//! # adsim-cli: Command-Line Interface
//!
//! The `adsim` binary: run a scenario, validate a scenario spec, fan a
//! batch of scenario/seed jobs out across a thread pool, and inspect past
//! run manifests.
//!
//! ## Command Structure
//!
//! ```text
//! adsim
//! ├── run        # simulate N days of one scenario+seed
//! ├── validate   # load a scenario spec and report diagnostics
//! ├── batch      # fan scenario x seed jobs out across a thread pool
//! └── runs       # run management (list, show)
//! ```
//!
//! ## Reproducibility
//!
//! Every successful invocation writes a UUID-stamped run manifest
//! (`run-<uuid>.json`) capturing the command and its parameters, so past
//! invocations can be enumerated with `runs list`/`runs show`.
//!
//! ## Modules
//!
//! - [`cli`] - Command structures and arg parsing (via clap)
//! - [`common`] - Small shared helpers
//! - [`manifest`] - Run manifest management (for reproducibility)
//! - [`runs`] - Discovery and resolution of past run manifests

pub mod cli;
pub mod common;
pub mod manifest;
pub mod runs;

pub use cli::{build_cli_command, Cli, Commands, RunFormat, RunsCommands};
