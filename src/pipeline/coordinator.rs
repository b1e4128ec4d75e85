//! Sequential driver of the five pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::calculation::{recompute_totals, run_calculator};
use crate::cleaning::run_cleaner;
use crate::config::{ConfigLoader, PipelineSettings};
use crate::error::EngineResult;
use crate::ingest::{TableReader, run_consolidator};
use crate::models::{Competence, Dataset};
use crate::report::{RunSummary, generate_report};
use crate::validation::{ValidationReport, run_validator};

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reads and merges the source tables.
    Consolidator,
    /// Applies the exclusion rules and merges side-tables.
    Cleaner,
    /// Computes benefits and totals.
    Calculator,
    /// Runs the validation rules.
    Validator,
    /// Renders the report.
    Generator,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::Consolidator,
        Stage::Cleaner,
        Stage::Calculator,
        Stage::Validator,
        Stage::Generator,
    ];

    /// Returns the snake_case stage name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Consolidator => "consolidator",
            Stage::Cleaner => "cleaner",
            Stage::Calculator => "calculator",
            Stage::Validator => "validator",
            Stage::Generator => "generator",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Timing and counts recorded for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStats {
    /// The stage.
    pub stage: Stage,
    /// Whether the stage succeeded.
    pub success: bool,
    /// Wall-clock duration.
    pub duration_ms: u64,
    /// Records in the active collection when the stage finished.
    pub records: usize,
    /// Errors reported by the stage.
    pub errors: usize,
    /// Warnings reported by the stage.
    pub warnings: usize,
}

impl StageStats {
    fn completed(stage: Stage, started: Instant, records: usize) -> Self {
        Self {
            stage,
            success: true,
            duration_ms: elapsed_ms(started),
            records,
            errors: 0,
            warnings: 0,
        }
    }

    fn failed(stage: Stage, started: Instant) -> Self {
        Self {
            stage,
            success: false,
            duration_ms: elapsed_ms(started),
            records: 0,
            errors: 1,
            warnings: 0,
        }
    }
}

/// The result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Unique id of the run.
    pub run_id: Uuid,
    /// The month processed.
    pub competence: Competence,
    /// True when every stage succeeded.
    pub success: bool,
    /// The stage that stopped the run.
    pub failed_stage: Option<Stage>,
    /// Human-readable result, or the failure that stopped the run.
    pub message: String,
    /// Total wall-clock duration.
    pub duration_ms: u64,
    /// Statistics of every stage that ran.
    pub stages: Vec<StageStats>,
    /// Run-wide counts from the final dataset.
    pub summary: RunSummary,
    /// The validation report, once the validator ran.
    pub validation: Option<ValidationReport>,
    /// The rendered report, once the generator ran.
    pub report: Option<String>,
    /// The final dataset; absent when the calculator discarded it.
    pub dataset: Option<Dataset>,
}

impl RunOutcome {
    fn started(run_id: Uuid, competence: Competence) -> Self {
        Self {
            run_id,
            competence,
            success: false,
            failed_stage: None,
            message: String::new(),
            duration_ms: 0,
            stages: Vec::new(),
            summary: RunSummary::default(),
            validation: None,
            report: None,
            dataset: None,
        }
    }

    fn fail(mut self, stage: Stage, message: String, started: Instant) -> Self {
        error!(run_id = %self.run_id, stage = %stage, message = %message, "pipeline aborted");
        self.failed_stage = Some(stage);
        self.message = message;
        self.duration_ms = elapsed_ms(started);
        self
    }

    /// Total errors across every stage.
    pub fn total_errors(&self) -> usize {
        self.stages.iter().map(|s| s.errors).sum()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

/// Picks the competence of a run: the requested one, else the configured
/// one, else the current month.
///
/// # Errors
///
/// Returns [`EngineError::InvalidCompetence`](crate::error::EngineError::InvalidCompetence)
/// when the chosen text does not parse.
pub fn resolve_competence(
    requested: Option<&str>,
    settings: &PipelineSettings,
) -> EngineResult<Competence> {
    match requested
        .or(settings.competence.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        Some(text) => Competence::parse(text),
        None => Ok(Competence::current()),
    }
}

/// Runs consolidator, cleaner, calculator, validator and generator in order.
///
/// The run stops at the first stage that fails. A validation pass with any
/// error is a failure, so no report is generated for it; the validated
/// dataset and the validation report are still returned.
pub fn run_pipeline(
    reader: &dyn TableReader,
    config: &ConfigLoader,
    competence: Competence,
) -> RunOutcome {
    let run_started = Instant::now();
    let mut outcome = RunOutcome::started(Uuid::new_v4(), competence);
    info!(run_id = %outcome.run_id, competence = %competence, "pipeline started");

    let started = Instant::now();
    let dataset = run_consolidator(reader, config, competence);
    outcome.stages.push(StageStats::completed(
        Stage::Consolidator,
        started,
        dataset.active_count(),
    ));

    let started = Instant::now();
    let dataset = run_cleaner(dataset, config);
    outcome
        .stages
        .push(StageStats::completed(Stage::Cleaner, started, dataset.active_count()));

    let started = Instant::now();
    let dataset = match run_calculator(dataset, config) {
        Ok(dataset) => dataset,
        Err(err) => {
            outcome.stages.push(StageStats::failed(Stage::Calculator, started));
            return outcome.fail(Stage::Calculator, err.to_string(), run_started);
        }
    };
    outcome.stages.push(StageStats::completed(
        Stage::Calculator,
        started,
        dataset.active_count(),
    ));

    let started = Instant::now();
    let (mut dataset, validation) = run_validator(dataset, config);
    let totals = recompute_totals(&mut dataset).map(|_| ());
    outcome.stages.push(StageStats {
        stage: Stage::Validator,
        success: validation.success && totals.is_ok(),
        duration_ms: elapsed_ms(started),
        records: validation.records_processed,
        errors: validation.error_count,
        warnings: validation.warning_count,
    });
    outcome.summary = RunSummary::from_dataset(&dataset);

    let failure = match (&totals, &validation) {
        (Err(err), _) => Some(err.to_string()),
        (Ok(()), report) if !report.success => Some(
            report
                .failure
                .clone()
                .unwrap_or_else(|| format!("Validation found {} errors", report.error_count)),
        ),
        _ => None,
    };
    outcome.validation = Some(validation);
    if let Some(message) = failure {
        outcome.dataset = Some(dataset);
        return outcome.fail(Stage::Validator, message, run_started);
    }

    let started = Instant::now();
    match generate_report(&dataset, &outcome.summary) {
        Ok(report) => {
            outcome.stages.push(StageStats::completed(
                Stage::Generator,
                started,
                dataset.active_count(),
            ));
            outcome.report = Some(report);
        }
        Err(err) => {
            outcome.stages.push(StageStats::failed(Stage::Generator, started));
            outcome.dataset = Some(dataset);
            return outcome.fail(Stage::Generator, err.to_string(), run_started);
        }
    }

    outcome.success = true;
    outcome.message = format!(
        "Processed {} employees, {} valid",
        outcome.summary.processed, outcome.summary.valid
    );
    outcome.duration_ms = elapsed_ms(run_started);
    if outcome.validation.as_ref().is_some_and(|v| v.warning_count > 0) {
        warn!(
            run_id = %outcome.run_id,
            warnings = outcome.validation.as_ref().map_or(0, |v| v.warning_count),
            "pipeline finished with warnings"
        );
    }
    info!(
        run_id = %outcome.run_id,
        processed = outcome.summary.processed,
        valid = outcome.summary.valid,
        duration_ms = outcome.duration_ms,
        "pipeline finished"
    );
    outcome.dataset = Some(dataset);
    outcome
}

/// Renders per-stage statistics as a text table.
///
/// # Example
///
/// ```
/// use voucher_engine::pipeline::{Stage, StageStats, render_stage_table};
///
/// let table = render_stage_table(&[StageStats {
///     stage: Stage::Cleaner,
///     success: true,
///     duration_ms: 1250,
///     records: 42,
///     errors: 0,
///     warnings: 3,
/// }])
/// .unwrap();
/// assert!(table.lines().nth(2).unwrap().starts_with("cleaner"));
/// ```
pub fn render_stage_table(stages: &[StageStats]) -> EngineResult<String> {
    let mut out = String::new();
    let header = format!(
        "{:<14}{:<8}{:>10}{:>10}{:>8}{:>10}",
        "Stage", "Status", "Duration", "Records", "Errors", "Warnings"
    );
    writeln!(out, "{}", header)?;
    writeln!(out, "{}", "-".repeat(header.len()))?;
    for stats in stages {
        writeln!(
            out,
            "{:<14}{:<8}{:>10}{:>10}{:>8}{:>10}",
            stats.stage.name(),
            if stats.success { "OK" } else { "FAILED" },
            format!("{:.2}s", stats.duration_ms as f64 / 1000.0),
            stats.records,
            stats.errors,
            stats.warnings
        )?;
    }
    Ok(out)
}

/// Renders the final run summary followed by the stage table.
pub fn render_run_summary(outcome: &RunOutcome) -> EngineResult<String> {
    let status = if outcome.success {
        "SUCCESS".to_string()
    } else {
        match outcome.failed_stage {
            Some(stage) => format!("FAILED at {}", stage),
            None => "FAILED".to_string(),
        }
    };
    let rows = [
        ("Run", outcome.run_id.to_string()),
        ("Competence", outcome.competence.to_string()),
        ("Status", status),
        ("Duration", format!("{:.2}s", outcome.duration_ms as f64 / 1000.0)),
        ("Total employees", outcome.summary.processed.to_string()),
        ("Valid employees", outcome.summary.valid.to_string()),
        ("Excluded employees", outcome.summary.excluded.to_string()),
        ("Errors found", outcome.total_errors().to_string()),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        writeln!(out, "{:<20}{}", label, value)?;
    }
    if !outcome.success && !outcome.message.is_empty() {
        writeln!(out, "{:<20}{}", "Message", outcome.message)?;
    }
    writeln!(out)?;
    out.push_str(&render_stage_table(&outcome.stages)?);
    Ok(out)
}
