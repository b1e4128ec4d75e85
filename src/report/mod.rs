//! Report generation.
//!
//! Renders the final dataset as a plain-text summary: general statistics,
//! financial totals, the per-union configuration, and the observations the
//! earlier stages accumulated.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::error::EngineResult;
use crate::models::Dataset;

const RULE_WIDTH: usize = 60;

/// Run-wide counts derived from the final dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Records left in the active collection.
    pub processed: usize,
    /// Eligible records.
    pub valid: usize,
    /// Distinct matriculas across the exclusion sets.
    pub excluded: usize,
    /// `valid / processed × 100`, rounded to two places.
    pub coverage: Decimal,
}

impl RunSummary {
    /// Computes the summary from the dataset as it stands.
    ///
    /// # Example
    ///
    /// ```
    /// use voucher_engine::models::{Competence, Dataset, EmployeeRecord};
    /// use voucher_engine::report::RunSummary;
    /// use rust_decimal::Decimal;
    ///
    /// let mut dataset = Dataset::new(Competence::new(2025, 5).unwrap());
    /// let mut excluded = EmployeeRecord::new("2");
    /// excluded.eligible = false;
    /// dataset.employees = vec![EmployeeRecord::new("1"), excluded];
    ///
    /// let summary = RunSummary::from_dataset(&dataset);
    /// assert_eq!(summary.valid, 1);
    /// assert_eq!(summary.coverage, Decimal::new(5000, 2));
    /// ```
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let processed = dataset.active_count();
        let valid = dataset.eligible_count();
        let coverage = if processed == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(valid) * Decimal::ONE_HUNDRED / Decimal::from(processed)).round_dp(2)
        };
        Self {
            processed,
            valid,
            excluded: dataset.exclusions.all().len(),
            coverage,
        }
    }
}

/// Formats an amount as `R$ 1,234.56`.
///
/// # Example
///
/// ```
/// use voucher_engine::report::format_currency;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_currency(Decimal::new(123456, 2)), "R$ 1,234.56");
/// assert_eq!(format_currency(Decimal::new(-5, 1)), "R$ -0.50");
/// ```
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("R$ {}{}.{}", sign, grouped, cents)
}

/// Renders the final report.
///
/// # Errors
///
/// Returns [`EngineError::ReportError`](crate::error::EngineError::ReportError)
/// if the text cannot be written.
pub fn generate_report(dataset: &Dataset, summary: &RunSummary) -> EngineResult<String> {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "{}", rule)?;
    writeln!(out, "VR/VA BENEFIT REPORT - {}", dataset.competence)?;
    writeln!(out, "{}", rule)?;

    writeln!(out, "\nGENERAL STATISTICS")?;
    writeln!(out, "   • Employees processed: {}", summary.processed)?;
    writeln!(out, "   • Valid employees: {}", summary.valid)?;
    writeln!(out, "   • Excluded employees: {}", summary.excluded)?;
    writeln!(out, "   • Coverage: {:.2}%", summary.coverage)?;

    let totals = &dataset.totals;
    writeln!(out, "\nFINANCIAL TOTALS")?;
    writeln!(out, "   • Total benefit: {}", format_currency(totals.total_benefit))?;
    writeln!(out, "   • Employer cost: {}", format_currency(totals.employer_cost))?;
    writeln!(
        out,
        "   • Employee deduction: {}",
        format_currency(totals.employee_deduction)
    )?;

    writeln!(out, "\nUNION SUMMARY")?;
    for (union, value) in &dataset.union_values {
        match dataset.union_working_days.get(union) {
            Some(days) => writeln!(
                out,
                "   • {}: {} per day, {} working days",
                union,
                format_currency(*value),
                days
            )?,
            None => writeln!(
                out,
                "   • {}: {} per day, working days not configured",
                union,
                format_currency(*value)
            )?,
        }
    }

    if !dataset.observations.is_empty() {
        writeln!(out, "\nOBSERVATIONS")?;
        for observation in &dataset.observations {
            writeln!(out, "   • {}", observation)?;
        }
    }

    writeln!(out, "\n{}", rule)?;
    Ok(out)
}
