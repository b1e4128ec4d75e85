//! Configuration types for benefit processing.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML files of a configuration directory.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::SourceTable;

/// Special-rule tag: the union prorates the benefit for mid-month admissions.
pub const PROPORTIONAL_ADMISSION: &str = "proportional_admission";

/// Special-rule tag: the union prorates the benefit for mid-month terminations.
pub const PROPORTIONAL_TERMINATION: &str = "proportional_termination";

/// How a union lets employees take their vacation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VacationPolicy {
    /// Vacation is one uninterrupted block; no days may be worked during it.
    Full {
        /// Free-text rule appended to the employee notes.
        #[serde(default)]
        note: Option<String>,
    },
    /// Vacation may be split; days worked must stay within the bounds.
    Partial {
        /// Days worked below this raise a warning.
        min_days: i64,
        /// Days worked above this raise an error.
        max_days: i64,
        /// Free-text rule appended to the employee notes.
        #[serde(default)]
        note: Option<String>,
    },
}

impl VacationPolicy {
    /// Returns the special-rule note attached to this policy, if any.
    pub fn note(&self) -> Option<&str> {
        match self {
            VacationPolicy::Full { note } | VacationPolicy::Partial { note, .. } => {
                note.as_deref().filter(|n| !n.trim().is_empty())
            }
        }
    }

    /// Returns true for the `full` variant.
    pub fn is_full(&self) -> bool {
        matches!(self, VacationPolicy::Full { .. })
    }
}

/// Benefit policy for one canonical union.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UnionPolicy {
    /// Daily voucher value used when the source tables carry none.
    #[serde(default)]
    pub daily_value: Option<Decimal>,
    /// Working days in the month used when the source tables carry none.
    #[serde(default)]
    pub working_days: Option<i64>,
    /// Label of the collective agreement in force.
    #[serde(default)]
    pub collective_agreement: Option<String>,
    /// Employer share override (e.g. 0.85).
    #[serde(default)]
    pub employer_share: Option<Decimal>,
    /// Employee share override (e.g. 0.15).
    #[serde(default)]
    pub employee_share: Option<Decimal>,
    /// Vacation policy variant.
    #[serde(default)]
    pub vacation: Option<VacationPolicy>,
    /// Special-rule tags such as [`PROPORTIONAL_ADMISSION`].
    #[serde(default)]
    pub special_rules: Vec<String>,
}

impl UnionPolicy {
    /// Returns true if the policy carries the given special-rule tag.
    pub fn has_rule(&self, tag: &str) -> bool {
        self.special_rules.iter().any(|r| r == tag)
    }
}

/// `unions.yaml` file structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UnionsConfig {
    /// Map of canonical union name to policy.
    #[serde(default)]
    pub unions: HashMap<String, UnionPolicy>,
}

/// Employer/employee split of a benefit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitShares {
    /// Fraction paid by the employer.
    pub employer: Decimal,
    /// Fraction deducted from the employee.
    pub employee: Decimal,
}

/// Employee fields that can be declared mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    /// Employee registration number.
    Matricula,
    /// Employee name. Missing names only ever produce warnings.
    Name,
    /// Document (CPF) number.
    DocumentId,
    /// Company name.
    Company,
    /// Role title.
    Role,
    /// Canonical union name.
    Union,
    /// Admission date.
    AdmissionDate,
}

impl RequiredField {
    /// Column label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            RequiredField::Matricula => "matricula",
            RequiredField::Name => "name",
            RequiredField::DocumentId => "document_id",
            RequiredField::Company => "company",
            RequiredField::Role => "role",
            RequiredField::Union => "union",
            RequiredField::AdmissionDate => "admission_date",
        }
    }
}

/// One row of the union-normalization rule table.
///
/// `contains` patterns are matched against the upper-cased union text padded
/// with one space on each side, so `" SP "` matches the word SP anywhere.
/// `starts_with` patterns are matched against the unpadded text. The first
/// rule with any matching pattern wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionAlias {
    /// The canonical union name produced by this rule.
    pub canonical: String,
    /// Substrings that select this rule.
    #[serde(default)]
    pub contains: Vec<String>,
    /// Prefixes that select this rule.
    #[serde(default)]
    pub starts_with: Vec<String>,
}

/// Keyword lists driving role- and situation-based decisions.
///
/// All keywords are compared lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keywords {
    /// Titles that stay in the collection but are never eligible.
    pub management: Vec<String>,
    /// Titles identifying interns (removed).
    pub intern: Vec<String>,
    /// Titles identifying apprentices (removed).
    pub apprentice: Vec<String>,
    /// Situations identifying leave of absence (removed).
    pub leave_situations: Vec<String>,
    /// Broad executive-title list checked by the validator.
    pub executive_titles: Vec<String>,
}

impl Default for Keywords {
    fn default() -> Self {
        let words = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        Self {
            management: words(&["diretor", "director", "coordenador", "coordinator"]),
            intern: words(&["estagiario", "estagiário", "intern"]),
            apprentice: words(&["aprendiz", "apprentice"]),
            leave_situations: words(&[
                "licença maternidade",
                "licenca maternidade",
                "auxílio doença",
                "auxilio doenca",
                "maternity leave",
                "sick pay",
            ]),
            executive_titles: words(&[
                "diretor",
                "director",
                "presidente",
                "president",
                "vice-presidente",
                "ceo",
                "cfo",
                "cto",
                "coo",
                "coordenador",
                "coordinator",
            ]),
        }
    }
}

/// File names of the source tables inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceFiles {
    /// Active employees.
    pub active: String,
    /// Vacation side-table.
    pub vacations: String,
    /// Termination side-table.
    pub terminations: String,
    /// Admission side-table.
    pub admissions: String,
    /// Union to daily value mapping.
    pub union_values: String,
    /// Union to working-day count mapping.
    pub union_working_days: String,
    /// Expatriate matriculas.
    pub expatriates: String,
    /// Intern matriculas.
    pub interns: String,
    /// Apprentice matriculas.
    pub apprentices: String,
    /// Leave-of-absence matriculas.
    pub leave_of_absence: String,
}

impl Default for SourceFiles {
    fn default() -> Self {
        Self {
            active: "ATIVOS.csv".to_string(),
            vacations: "FERIAS.csv".to_string(),
            terminations: "DESLIGADOS.csv".to_string(),
            admissions: "ADMISSAO.csv".to_string(),
            union_values: "SINDICATO_VALOR.csv".to_string(),
            union_working_days: "DIAS_UTEIS.csv".to_string(),
            expatriates: "EXTERIOR.csv".to_string(),
            interns: "ESTAGIO.csv".to_string(),
            apprentices: "APRENDIZ.csv".to_string(),
            leave_of_absence: "AFASTAMENTOS.csv".to_string(),
        }
    }
}

impl SourceFiles {
    /// Returns the file name configured for a table.
    pub fn file_for(&self, table: SourceTable) -> &str {
        match table {
            SourceTable::Active => &self.active,
            SourceTable::Vacations => &self.vacations,
            SourceTable::Terminations => &self.terminations,
            SourceTable::Admissions => &self.admissions,
            SourceTable::UnionValues => &self.union_values,
            SourceTable::UnionWorkingDays => &self.union_working_days,
            SourceTable::Expatriates => &self.expatriates,
            SourceTable::Interns => &self.interns,
            SourceTable::Apprentices => &self.apprentices,
            SourceTable::LeaveOfAbsence => &self.leave_of_absence,
        }
    }
}

/// `settings.yaml` file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Fixed processing month (`YYYY-MM` or `MM.YYYY`); the current month when absent.
    pub competence: Option<String>,
    /// Terminations on or before this day of month are not eligible.
    pub termination_day_threshold: u32,
    /// Default employer share.
    pub employer_share: Decimal,
    /// Default employee share.
    pub employee_share: Decimal,
    /// Fields whose absence is reported by the validator.
    pub mandatory_fields: Vec<RequiredField>,
    /// Holidays removed from the business-day calendar.
    pub holidays: Vec<NaiveDate>,
    /// Role and situation keywords.
    pub keywords: Keywords,
    /// Ordered union-normalization rules.
    pub union_normalization: Vec<UnionAlias>,
    /// Source file names.
    pub source_files: SourceFiles,
    /// Default log filter for the binary.
    pub log_level: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            competence: None,
            termination_day_threshold: 15,
            employer_share: Decimal::new(80, 2),
            employee_share: Decimal::new(20, 2),
            mandatory_fields: vec![
                RequiredField::Matricula,
                RequiredField::Name,
                RequiredField::Union,
            ],
            holidays: Vec::new(),
            keywords: Keywords::default(),
            union_normalization: default_union_normalization(),
            source_files: SourceFiles::default(),
            log_level: "info".to_string(),
        }
    }
}

impl PipelineSettings {
    /// Returns the default split shares.
    pub fn default_shares(&self) -> SplitShares {
        SplitShares {
            employer: self.employer_share,
            employee: self.employee_share,
        }
    }
}

fn default_union_normalization() -> Vec<UnionAlias> {
    let alias = |canonical: &str, contains: &[&str], starts_with: &[&str]| UnionAlias {
        canonical: canonical.to_string(),
        contains: contains.iter().map(|s| s.to_string()).collect(),
        starts_with: starts_with.iter().map(|s| s.to_string()).collect(),
    };

    vec![
        alias("Rio Grande do Sul", &["RIO GRANDE DO SUL", " RS "], &[]),
        alias("Rio de Janeiro", &["RIO DE JANEIRO", " RJ "], &[]),
        alias("Paraná", &["CURITIBA", " PARANA", "PARANÁ", " PR "], &[]),
        alias(
            "São Paulo",
            &["SAO PAULO", "SÃO PAULO", " ESTADO DE SP", " SP "],
            &[],
        ),
    ]
}

/// The complete benefit configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct VoucherConfig {
    settings: PipelineSettings,
    unions: HashMap<String, UnionPolicy>,
}

impl VoucherConfig {
    /// Creates a new VoucherConfig from its component parts.
    pub fn new(settings: PipelineSettings, unions: HashMap<String, UnionPolicy>) -> Self {
        Self { settings, unions }
    }

    /// Returns the pipeline settings.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Returns all union policies.
    pub fn unions(&self) -> &HashMap<String, UnionPolicy> {
        &self.unions
    }
}
