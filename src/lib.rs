//! Meal/food voucher (VR/VA) benefit engine.
//!
//! This crate turns a month's payroll exports into per-employee voucher
//! benefits. A run passes through five stages, driven by
//! [`pipeline::run_pipeline`]:
//!
//! 1. [`ingest`]: reads the source tables and consolidates them
//! 2. [`cleaning`]: applies the exclusion rules and merges vacations and terminations
//! 3. [`calculation`]: computes each benefit and its employer/employee split
//! 4. [`validation`]: re-checks every invariant and reports diagnostics
//! 5. [`report`]: renders the text summary
//!
//! Union policies and pipeline settings are loaded from YAML by
//! [`config::ConfigLoader`]. The same pipeline is served over HTTP by [`api`].

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod telemetry;
pub mod validation;
