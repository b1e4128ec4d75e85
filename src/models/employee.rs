//! Employee record model and related types.
//!
//! This module defines the [`EmployeeRecord`] that flows through every
//! pipeline stage and the [`SourceDate`] wrapper for dates read from
//! source tables.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Day-of-month assumed when a date could not be parsed.
pub const FALLBACK_DAY: u32 = 15;

/// A date read from a source table.
///
/// Unparseable text is kept verbatim so it can be reported; its day of
/// month falls back to [`FALLBACK_DAY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceDate {
    /// A calendar date.
    Parsed(NaiveDate),
    /// Text that is not a recognizable date.
    Unparsed(String),
}

impl SourceDate {
    /// Returns the calendar date, if parsed.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            SourceDate::Parsed(date) => Some(*date),
            SourceDate::Unparsed(_) => None,
        }
    }

    /// Day of month, or [`FALLBACK_DAY`] for unparsed text.
    ///
    /// # Example
    ///
    /// ```
    /// use voucher_engine::models::SourceDate;
    /// use chrono::NaiveDate;
    ///
    /// let parsed = SourceDate::Parsed(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap());
    /// assert_eq!(parsed.day(), 20);
    /// assert_eq!(SourceDate::Unparsed("soon".to_string()).day(), 15);
    /// ```
    pub fn day(&self) -> u32 {
        self.date().map(|d| d.day()).unwrap_or(FALLBACK_DAY)
    }
}

/// One employee as it moves through the pipeline.
///
/// Created by the consolidator from the active-employee table, mutated by
/// the cleaner, calculator and validator, and removed only by the cleaner's
/// exclusion passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Unique employee registration number.
    pub matricula: String,
    /// Employee name.
    #[serde(default)]
    pub name: String,
    /// Document (CPF) number.
    #[serde(default)]
    pub document_id: String,
    /// Company the employee belongs to.
    #[serde(default)]
    pub company: String,
    /// Role title.
    #[serde(default)]
    pub role: String,
    /// Situation/status text.
    #[serde(default)]
    pub situation: String,
    /// Union text as found in the source table.
    #[serde(default)]
    pub union_raw: String,
    /// Canonical union name.
    #[serde(default)]
    pub union: String,
    /// Admission date.
    #[serde(default)]
    pub admission_date: Option<SourceDate>,
    /// Termination date, for terminated employees.
    #[serde(default)]
    pub termination_date: Option<SourceDate>,
    /// False once the employee is found in the termination table.
    pub active: bool,
    /// Whether a benefit is computed for this employee.
    pub eligible: bool,
    /// Found in the vacation table.
    #[serde(default)]
    pub on_vacation: bool,
    /// Vacation days from the vacation table.
    #[serde(default)]
    pub vacation_days: Option<Decimal>,
    /// Listed in the leave-of-absence table.
    #[serde(default)]
    pub on_leave: bool,
    /// Listed in the expatriate table.
    #[serde(default)]
    pub expatriate: bool,
    /// Listed in the intern table.
    #[serde(default)]
    pub intern: bool,
    /// Listed in the apprentice table.
    #[serde(default)]
    pub apprentice: bool,
    /// Working days in the month for this employee.
    #[serde(default)]
    pub working_days: Option<i64>,
    /// Days counted toward the benefit; absent means "use working days".
    #[serde(default)]
    pub days_worked: Option<i64>,
    /// Daily voucher value applied.
    #[serde(default)]
    pub daily_voucher_value: Decimal,
    /// Benefit for the month (daily value × days worked).
    #[serde(default)]
    pub total_benefit_value: Decimal,
    /// Employer share of the benefit.
    #[serde(default)]
    pub employer_cost: Decimal,
    /// Employee share of the benefit.
    #[serde(default)]
    pub employee_deduction: Decimal,
    /// Free-text tags accumulated along the pipeline.
    #[serde(default)]
    pub notes: Vec<String>,
    /// Why the employee was made ineligible.
    #[serde(default)]
    pub exclusion_reason: Option<String>,
    /// Admitted during the month before the competence.
    #[serde(default)]
    pub admitted_previous_month: bool,
}

impl EmployeeRecord {
    /// Creates an active, eligible record with no other facts.
    ///
    /// # Example
    ///
    /// ```
    /// use voucher_engine::models::EmployeeRecord;
    ///
    /// let record = EmployeeRecord::new("1001");
    /// assert!(record.active);
    /// assert!(record.eligible);
    /// assert_eq!(record.days_worked, None);
    /// ```
    pub fn new(matricula: impl Into<String>) -> Self {
        Self {
            matricula: matricula.into(),
            name: String::new(),
            document_id: String::new(),
            company: String::new(),
            role: String::new(),
            situation: String::new(),
            union_raw: String::new(),
            union: String::new(),
            admission_date: None,
            termination_date: None,
            active: true,
            eligible: true,
            on_vacation: false,
            vacation_days: None,
            on_leave: false,
            expatriate: false,
            intern: false,
            apprentice: false,
            working_days: None,
            days_worked: None,
            daily_voucher_value: Decimal::ZERO,
            total_benefit_value: Decimal::ZERO,
            employer_cost: Decimal::ZERO,
            employee_deduction: Decimal::ZERO,
            notes: Vec::new(),
            exclusion_reason: None,
            admitted_previous_month: false,
        }
    }

    /// Days worked, treating an absent value as zero.
    pub fn days_worked_or_zero(&self) -> i64 {
        self.days_worked.unwrap_or(0)
    }

    /// Marks the employee ineligible with zero days worked.
    pub fn make_ineligible(&mut self) {
        self.eligible = false;
        self.days_worked = Some(0);
    }

    /// Zeroes the monetary fields.
    pub fn clear_benefit(&mut self) {
        self.total_benefit_value = Decimal::ZERO;
        self.employer_cost = Decimal::ZERO;
        self.employee_deduction = Decimal::ZERO;
    }

    /// Returns true if any note contains `tag`, ignoring case.
    pub fn has_note(&self, tag: &str) -> bool {
        let tag = tag.to_uppercase();
        self.notes.iter().any(|n| n.to_uppercase().contains(&tag))
    }

    /// Appends a note unless the same note, ignoring case, is already present.
    pub fn add_note(&mut self, note: impl Into<String>) {
        let note = note.into();
        let note = note.trim();
        let upper = note.to_uppercase();
        let duplicate = self.notes.iter().any(|n| n.to_uppercase() == upper);
        if !note.is_empty() && !duplicate {
            self.notes.push(note.to_string());
        }
    }

    /// Notes joined the way they are shown in reports.
    pub fn notes_text(&self) -> String {
        self.notes.join(" | ")
    }

    /// Returns true if the lower-cased role contains any of the keywords.
    pub fn role_matches(&self, keywords: &[String]) -> bool {
        let role = self.role.to_lowercase();
        keywords.iter().any(|k| role.contains(&k.to_lowercase()))
    }
}
