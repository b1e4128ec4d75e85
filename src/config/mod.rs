//! Configuration loading and management for the Voucher Benefit Engine.
//!
//! This module loads pipeline settings and per-union benefit policies from
//! YAML files, including default split shares, vacation policies, keyword
//! lists and the union-normalization rule table.
//!
//! # Example
//!
//! ```no_run
//! use voucher_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/vr_va").unwrap();
//! println!("Threshold day: {}", config.settings().termination_day_threshold);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    Keywords, PROPORTIONAL_ADMISSION, PROPORTIONAL_TERMINATION, PipelineSettings, RequiredField,
    SourceFiles, SplitShares, UnionAlias, UnionPolicy, UnionsConfig, VacationPolicy,
    VoucherConfig,
};
