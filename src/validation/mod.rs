//! Validation stage.
//!
//! The validator re-checks every invariant the earlier stages are expected to
//! uphold and reports itemized [`Diagnostic`]s. All rules always run, in the
//! order of [`ValidationRule::ALL`]. A few rules also correct records (the
//! vacation policy, director, and broken-date rules) or append notes.
//!
//! A rule that fails internally contributes a single warning and the pass
//! continues. The run is successful only when no rule reported an error.

mod admission;
mod annotations;
mod arithmetic;
mod broken_dates;
mod directors;
mod records;
mod residue;
mod termination;
mod timesheet;
mod unions;
mod vacation;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::models::{Competence, Dataset, Diagnostic};

/// Tolerance for monetary and percentage comparisons.
pub(crate) fn tolerance() -> rust_decimal::Decimal {
    rust_decimal::Decimal::new(1, 2)
}

/// Facts every rule needs, computed once per pass.
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    /// The loaded configuration.
    pub config: &'a ConfigLoader,
    /// The month being validated.
    pub competence: Competence,
    /// The month before it.
    pub previous: Competence,
    /// Business days in the competence month, holidays removed.
    pub business_days: i64,
    /// Termination day threshold.
    pub threshold: u32,
}

impl<'a> RuleContext<'a> {
    /// Builds the context for a competence.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCompetence`] when the month before the
    /// competence is not representable.
    pub fn new(config: &'a ConfigLoader, competence: Competence) -> EngineResult<Self> {
        let previous = competence
            .previous()
            .ok_or_else(|| EngineError::InvalidCompetence {
                value: competence.to_string(),
            })?;
        let settings = config.settings();
        Ok(Self {
            config,
            competence,
            previous,
            business_days: i64::from(competence.business_days(&settings.holidays)),
            threshold: settings.termination_day_threshold,
        })
    }
}

/// The validation rules, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    /// Eligible records still listed in an exclusion set.
    ExclusionResidue,
    /// Referenced unions without a daily value (warnings).
    AgreementCoverage,
    /// Missing and duplicate matriculas.
    Matriculas,
    /// Union value and working-day configuration.
    UnionConsistency,
    /// `daily value × days` and the split sum.
    BenefitArithmetic,
    /// Count consistency and mandatory fields.
    Totals,
    /// Union vacation policy dispatch.
    VacationPolicy,
    /// Terminations on or before the threshold day.
    EarlyTermination,
    /// Terminations after the threshold day.
    LateTermination,
    /// Admissions in the competence month.
    AdmissionThisMonth,
    /// Admissions in the previous month.
    AdmissionPreviousMonth,
    /// Days worked against expected working days.
    Timesheet,
    /// Executive titles.
    Directors,
    /// Employer and employee percentages.
    SplitPercentages,
    /// Mid-month admissions and terminations.
    BrokenDates,
    /// Tag notes on special cases.
    Annotations,
}

impl ValidationRule {
    /// Every rule, in execution order.
    pub const ALL: [ValidationRule; 16] = [
        ValidationRule::ExclusionResidue,
        ValidationRule::AgreementCoverage,
        ValidationRule::Matriculas,
        ValidationRule::UnionConsistency,
        ValidationRule::BenefitArithmetic,
        ValidationRule::Totals,
        ValidationRule::VacationPolicy,
        ValidationRule::EarlyTermination,
        ValidationRule::LateTermination,
        ValidationRule::AdmissionThisMonth,
        ValidationRule::AdmissionPreviousMonth,
        ValidationRule::Timesheet,
        ValidationRule::Directors,
        ValidationRule::SplitPercentages,
        ValidationRule::BrokenDates,
        ValidationRule::Annotations,
    ];

    /// Identifier used in diagnostics.
    pub fn id(self) -> &'static str {
        match self {
            ValidationRule::ExclusionResidue => "exclusion_residue",
            ValidationRule::AgreementCoverage => "agreement_coverage",
            ValidationRule::Matriculas => "matriculas",
            ValidationRule::UnionConsistency => "union_consistency",
            ValidationRule::BenefitArithmetic => "benefit_arithmetic",
            ValidationRule::Totals => "totals",
            ValidationRule::VacationPolicy => "vacation_policy",
            ValidationRule::EarlyTermination => "early_termination",
            ValidationRule::LateTermination => "late_termination",
            ValidationRule::AdmissionThisMonth => "admission_this_month",
            ValidationRule::AdmissionPreviousMonth => "admission_previous_month",
            ValidationRule::Timesheet => "timesheet",
            ValidationRule::Directors => "directors",
            ValidationRule::SplitPercentages => "split_percentages",
            ValidationRule::BrokenDates => "broken_dates",
            ValidationRule::Annotations => "annotations",
        }
    }

    /// Runs the rule.
    pub fn check(
        self,
        dataset: &mut Dataset,
        ctx: &RuleContext<'_>,
    ) -> EngineResult<Vec<Diagnostic>> {
        match self {
            ValidationRule::ExclusionResidue => residue::check_exclusion_residue(dataset),
            ValidationRule::AgreementCoverage => residue::check_agreement_coverage(dataset),
            ValidationRule::Matriculas => records::check_matriculas(dataset),
            ValidationRule::UnionConsistency => unions::check_union_consistency(dataset),
            ValidationRule::BenefitArithmetic => arithmetic::check_benefit_arithmetic(dataset),
            ValidationRule::Totals => records::check_totals(dataset, ctx),
            ValidationRule::VacationPolicy => vacation::check_vacation_policy(dataset, ctx),
            ValidationRule::EarlyTermination => termination::check_early_termination(dataset, ctx),
            ValidationRule::LateTermination => termination::check_late_termination(dataset, ctx),
            ValidationRule::AdmissionThisMonth => admission::check_this_month(dataset, ctx),
            ValidationRule::AdmissionPreviousMonth => {
                admission::check_previous_month(dataset, ctx)
            }
            ValidationRule::Timesheet => timesheet::check_timesheet(dataset, ctx),
            ValidationRule::Directors => directors::check_directors(dataset, ctx),
            ValidationRule::SplitPercentages => arithmetic::check_split_percentages(dataset),
            ValidationRule::BrokenDates => broken_dates::check_broken_dates(dataset, ctx),
            ValidationRule::Annotations => annotations::check_annotations(dataset),
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when no error was reported.
    pub success: bool,
    /// Number of error diagnostics.
    pub error_count: usize,
    /// Number of warning diagnostics.
    pub warning_count: usize,
    /// Every finding, in rule order.
    pub diagnostics: Vec<Diagnostic>,
    /// Wall-clock duration of the pass.
    pub duration_ms: u64,
    /// Records in the active collection (0 when the pass could not run).
    pub records_processed: usize,
    /// Why the pass could not run at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl ValidationReport {
    /// Builds a report from the collected diagnostics.
    pub fn from_diagnostics(
        diagnostics: Vec<Diagnostic>,
        records_processed: usize,
        duration_ms: u64,
    ) -> Self {
        let error_count = diagnostics.iter().filter(|d| d.is_error()).count();
        Self {
            success: error_count == 0,
            error_count,
            warning_count: diagnostics.len() - error_count,
            diagnostics,
            duration_ms,
            records_processed,
            failure: None,
        }
    }

    /// A report for a pass that could not run.
    pub fn failed(message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            error_count: 1,
            warning_count: 0,
            diagnostics: Vec::new(),
            duration_ms,
            records_processed: 0,
            failure: Some(message.into()),
        }
    }

    /// Iterates over error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Iterates over warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }
}

/// Runs every rule over the dataset.
///
/// # Example
///
/// ```
/// use voucher_engine::config::{ConfigLoader, PipelineSettings};
/// use voucher_engine::models::{Competence, Dataset};
/// use voucher_engine::validation::run_validator;
/// use std::collections::HashMap;
///
/// let config = ConfigLoader::from_parts(PipelineSettings::default(), HashMap::new()).unwrap();
/// let dataset = Dataset::new(Competence::new(2025, 5).unwrap());
///
/// let (_dataset, report) = run_validator(dataset, &config);
/// assert!(report.success);
/// assert_eq!(report.records_processed, 0);
/// ```
pub fn run_validator(mut dataset: Dataset, config: &ConfigLoader) -> (Dataset, ValidationReport) {
    let started = Instant::now();
    let elapsed = |started: Instant| started.elapsed().as_millis() as u64;

    let ctx = match RuleContext::new(config, dataset.competence) {
        Ok(ctx) => ctx,
        Err(err) => {
            warn!(error = %err, "validation could not run");
            return (dataset, ValidationReport::failed(err.to_string(), elapsed(started)));
        }
    };

    let mut diagnostics = Vec::new();
    for rule in ValidationRule::ALL {
        match rule.check(&mut dataset, &ctx) {
            Ok(found) => diagnostics.extend(found),
            Err(err) => {
                warn!(rule = %rule, error = %err, "validation rule failed");
                diagnostics.push(Diagnostic::warning(
                    rule.id(),
                    format!("Rule could not complete: {}", err),
                ));
            }
        }
    }

    for diagnostic in &diagnostics {
        debug!(
            rule = %diagnostic.rule,
            severity = ?diagnostic.severity,
            matricula = diagnostic.matricula.as_deref().unwrap_or("-"),
            "{}",
            diagnostic.message
        );
    }

    let report =
        ValidationReport::from_diagnostics(diagnostics, dataset.active_count(), elapsed(started));
    info!(
        errors = report.error_count,
        warnings = report.warning_count,
        records = report.records_processed,
        success = report.success,
        "validation complete"
    );
    (dataset, report)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::models::EmployeeRecord;

    #[test]
    fn test_clean_dataset_passes() {
        let config = config();
        let data = dataset(vec![paid("1", 22), paid("2", 20)]);

        let (data, report) = run_validator(data, &config);

        assert!(report.success, "unexpected errors: {:?}", report.errors().collect::<Vec<_>>());
        assert_eq!(report.error_count, 0);
        assert_eq!(report.records_processed, 2);
        assert!(report.failure.is_none());
        assert!(data.observations.iter().any(|o| o.starts_with("Vacations processed")));
    }

    #[test]
    fn test_any_error_fails_the_pass() {
        let config = config();
        let mut broken = paid("1", 22);
        broken.total_benefit_value = dec("1.00");
        let data = dataset(vec![broken]);

        let (_, report) = run_validator(data, &config);

        assert!(!report.success);
        assert!(report.errors().any(|d| d.rule == "benefit_arithmetic"));
    }

    #[test]
    fn test_warnings_alone_do_not_fail() {
        let config = config();
        let mut unnamed = paid("1", 22);
        unnamed.name = String::new();
        let data = dataset(vec![unnamed]);

        let (_, report) = run_validator(data, &config);

        assert!(report.success);
        assert!(report.warnings().any(|d| d.rule == "totals"));
    }

    #[test]
    fn test_failing_rule_becomes_one_warning() {
        let config = config();
        let mut record = paid("1", 22);
        // Forces a division overflow in the split-percentage rule.
        record.total_benefit_value = dec("0.0000000000000000000000000001");
        record.employer_cost = rust_decimal::Decimal::MAX;
        record.days_worked = Some(0);
        let data = dataset(vec![record]);

        let (_, report) = run_validator(data, &config);

        let from_rule: Vec<_> = report
            .diagnostics
            .iter()
            .filter(|d| d.rule == "split_percentages")
            .collect();
        assert_eq!(from_rule.len(), 1);
        assert!(!from_rule[0].is_error());
        assert!(from_rule[0].message.starts_with("Rule could not complete"));
    }

    #[test]
    fn test_rules_run_in_declared_order() {
        assert_eq!(ValidationRule::ALL[0], ValidationRule::ExclusionResidue);
        assert_eq!(ValidationRule::ALL[15], ValidationRule::Annotations);
        assert_eq!(ValidationRule::Directors.to_string(), "directors");
    }

    #[test]
    fn test_failed_report_counts_one_error() {
        let report = ValidationReport::failed("boom", 3);
        assert!(!report.success);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.records_processed, 0);
    }

    #[test]
    fn test_empty_dataset_records_nothing_processed() {
        let config = config();
        let (_, report) = run_validator(dataset(Vec::<EmployeeRecord>::new()), &config);
        assert!(report.success);
        assert_eq!(report.records_processed, 0);
    }
}
