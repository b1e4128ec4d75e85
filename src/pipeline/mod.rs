//! Pipeline coordination.
//!
//! Runs the stages in their fixed order, times each one, and collects the
//! statistics, the validation report and the rendered report of a run.

mod coordinator;

pub use coordinator::{
    RunOutcome, Stage, StageStats, render_run_summary, render_stage_table, resolve_competence,
    run_pipeline,
};
