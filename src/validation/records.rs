//! Record identity and mandatory-field checks.

use std::collections::BTreeSet;

use crate::config::RequiredField;
use crate::error::EngineResult;
use crate::models::{Dataset, Diagnostic, EmployeeRecord};

use super::RuleContext;

const MATRICULAS: &str = "matriculas";
const TOTALS: &str = "totals";

/// Note given to inactive records that carry no other note.
pub const INACTIVE_NOTE: &str = "INACTIVE";

/// Missing matriculas are errors; duplicates are one error for the dataset.
/// Inactive records without notes are tagged [`INACTIVE_NOTE`].
pub fn check_matriculas(dataset: &mut Dataset) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();

    for record in dataset.employees.iter_mut() {
        let matricula = record.matricula.trim();
        if matricula.is_empty() {
            found.push(Diagnostic::error(MATRICULAS, "Required matricula is missing"));
        } else if !seen.insert(matricula.to_string()) {
            duplicates.insert(matricula.to_string());
        }

        if !record.active && record.notes.is_empty() {
            record.add_note(INACTIVE_NOTE);
        }
    }

    if !duplicates.is_empty() {
        let list: Vec<String> = duplicates.into_iter().collect();
        found.push(Diagnostic::error(
            MATRICULAS,
            format!("Duplicate matriculas found: {}", list.join(", ")),
        ));
    }
    Ok(found)
}

/// Count consistency plus the configured mandatory fields.
///
/// A missing name is only a warning; any other missing field is an error.
pub fn check_totals(dataset: &mut Dataset, ctx: &RuleContext<'_>) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();

    let active = dataset.active_count();
    let valid = dataset.eligible_count();
    let excluded = dataset.employees.iter().filter(|e| !e.eligible).count();
    if active != valid + excluded {
        found.push(Diagnostic::error(
            TOTALS,
            format!(
                "Employee count mismatch: {} active, {} valid, {} excluded",
                active, valid, excluded
            ),
        ));
    }

    for record in &dataset.employees {
        for field in &ctx.config.settings().mandatory_fields {
            if has_field(record, *field) {
                continue;
            }
            let diagnostic = if *field == RequiredField::Name {
                Diagnostic::warning(TOTALS, format!("Optional field '{}' is missing", field.label()))
            } else {
                Diagnostic::error(TOTALS, format!("Required field '{}' is missing", field.label()))
            };
            found.push(diagnostic.for_matricula(display_matricula(record)));
        }
    }
    Ok(found)
}

fn has_field(record: &EmployeeRecord, field: RequiredField) -> bool {
    let present = |value: &str| !value.trim().is_empty();
    match field {
        RequiredField::Matricula => present(&record.matricula),
        RequiredField::Name => present(&record.name),
        RequiredField::DocumentId => present(&record.document_id),
        RequiredField::Company => present(&record.company),
        RequiredField::Role => present(&record.role),
        RequiredField::Union => present(&record.union),
        RequiredField::AdmissionDate => record.admission_date.is_some(),
    }
}

fn display_matricula(record: &EmployeeRecord) -> &str {
    if record.matricula.trim().is_empty() {
        "N/A"
    } else {
        &record.matricula
    }
}
