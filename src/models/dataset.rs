//! The dataset aggregate shared by every pipeline stage.
//!
//! One [`Dataset`] is created by the consolidator and handed by value from
//! stage to stage; no stage keeps a copy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::{AuditStep, Competence, EmployeeRecord, SourceDate};

/// A row of the vacation side-table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationRecord {
    /// Employee registration number.
    pub matricula: String,
    /// Situation text from the vacation table.
    pub situation: String,
    /// Vacation days, when given.
    pub days: Option<Decimal>,
}

/// A row of the termination side-table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminationRecord {
    /// Employee registration number.
    pub matricula: String,
    /// Termination date, when given.
    pub termination_date: Option<SourceDate>,
    /// Termination notice text.
    pub notice: String,
}

/// A row of the admission side-table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissionRecord {
    /// Employee registration number.
    pub matricula: String,
    /// Admission date, when given.
    pub admission_date: Option<SourceDate>,
    /// Role title on admission.
    pub role: String,
}

/// The four matricula exclusion lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionKind {
    /// Working abroad.
    Expatriate,
    /// Intern.
    Intern,
    /// Apprentice.
    Apprentice,
    /// Leave of absence.
    Leave,
}

impl ExclusionKind {
    /// Every exclusion kind.
    pub const ALL: [ExclusionKind; 4] = [
        ExclusionKind::Expatriate,
        ExclusionKind::Intern,
        ExclusionKind::Apprentice,
        ExclusionKind::Leave,
    ];
}

impl fmt::Display for ExclusionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExclusionKind::Expatriate => "expatriate",
            ExclusionKind::Intern => "intern",
            ExclusionKind::Apprentice => "apprentice",
            ExclusionKind::Leave => "leave of absence",
        };
        f.write_str(label)
    }
}

/// Matricula sets of employees excluded from the benefit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSets {
    /// Employees working abroad.
    pub expatriates: BTreeSet<String>,
    /// Interns.
    pub interns: BTreeSet<String>,
    /// Apprentices.
    pub apprentices: BTreeSet<String>,
    /// Employees on leave of absence.
    pub leave: BTreeSet<String>,
}

impl ExclusionSets {
    /// Returns the set for one kind.
    pub fn set(&self, kind: ExclusionKind) -> &BTreeSet<String> {
        match kind {
            ExclusionKind::Expatriate => &self.expatriates,
            ExclusionKind::Intern => &self.interns,
            ExclusionKind::Apprentice => &self.apprentices,
            ExclusionKind::Leave => &self.leave,
        }
    }

    /// Adds a matricula to one set; blank matriculas are ignored.
    pub fn insert(&mut self, kind: ExclusionKind, matricula: &str) {
        let matricula = matricula.trim();
        if matricula.is_empty() {
            return;
        }
        let set = match kind {
            ExclusionKind::Expatriate => &mut self.expatriates,
            ExclusionKind::Intern => &mut self.interns,
            ExclusionKind::Apprentice => &mut self.apprentices,
            ExclusionKind::Leave => &mut self.leave,
        };
        set.insert(matricula.to_string());
    }

    /// Returns true if any set holds the matricula.
    pub fn contains(&self, matricula: &str) -> bool {
        ExclusionKind::ALL
            .iter()
            .any(|kind| self.set(*kind).contains(matricula))
    }

    /// Union of all four sets.
    pub fn all(&self) -> BTreeSet<String> {
        ExclusionKind::ALL
            .iter()
            .flat_map(|kind| self.set(*kind).iter().cloned())
            .collect()
    }
}

/// Dataset-level benefit totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenefitTotals {
    /// Sum of benefits over eligible employees.
    pub total_benefit: Decimal,
    /// Sum of employer shares.
    pub employer_cost: Decimal,
    /// Sum of employee shares.
    pub employee_deduction: Decimal,
    /// Number of eligible employees.
    pub valid_count: usize,
}

/// The pipeline's shared aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// The month being processed.
    pub competence: Competence,
    /// Active employee records.
    pub employees: Vec<EmployeeRecord>,
    /// Vacation side-table keyed by matricula.
    pub vacations: BTreeMap<String, VacationRecord>,
    /// Termination side-table keyed by matricula.
    pub terminations: BTreeMap<String, TerminationRecord>,
    /// Admission side-table keyed by matricula.
    pub admissions: BTreeMap<String, AdmissionRecord>,
    /// Daily voucher value per union.
    pub union_values: BTreeMap<String, Decimal>,
    /// Working-day count per union.
    pub union_working_days: BTreeMap<String, i64>,
    /// Matricula exclusion sets.
    pub exclusions: ExclusionSets,
    /// Running totals.
    pub totals: BenefitTotals,
    /// Free-text observations for the report.
    pub observations: Vec<String>,
    /// Calculator decisions.
    pub audit: Vec<AuditStep>,
}

impl Dataset {
    /// Creates an empty dataset for a competence.
    pub fn new(competence: Competence) -> Self {
        Self {
            competence,
            employees: Vec::new(),
            vacations: BTreeMap::new(),
            terminations: BTreeMap::new(),
            admissions: BTreeMap::new(),
            union_values: BTreeMap::new(),
            union_working_days: BTreeMap::new(),
            exclusions: ExclusionSets::default(),
            totals: BenefitTotals::default(),
            observations: Vec::new(),
            audit: Vec::new(),
        }
    }

    /// Appends a general observation.
    pub fn add_observation(&mut self, observation: impl Into<String>) {
        self.observations.push(observation.into());
    }

    /// Records a vacation row; the first row for a matricula wins.
    pub fn add_vacation(&mut self, record: VacationRecord) {
        self.vacations
            .entry(record.matricula.clone())
            .or_insert(record);
    }

    /// Records a termination row; the first row for a matricula wins.
    pub fn add_termination(&mut self, record: TerminationRecord) {
        self.terminations
            .entry(record.matricula.clone())
            .or_insert(record);
    }

    /// Records an admission row; the first row for a matricula wins.
    pub fn add_admission(&mut self, record: AdmissionRecord) {
        self.admissions
            .entry(record.matricula.clone())
            .or_insert(record);
    }

    /// Number of records in the active collection.
    pub fn active_count(&self) -> usize {
        self.employees.len()
    }

    /// Number of eligible records in the active collection.
    pub fn eligible_count(&self) -> usize {
        self.employees.iter().filter(|e| e.eligible).count()
    }

    /// Distinct non-blank canonical unions referenced by active records.
    pub fn referenced_unions(&self) -> BTreeSet<String> {
        self.employees
            .iter()
            .filter(|e| !e.union.trim().is_empty())
            .map(|e| e.union.clone())
            .collect()
    }
}
