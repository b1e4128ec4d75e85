//! Logical names of the source tables consumed by the pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the ten tabular inputs of a run.
///
/// # Example
///
/// ```
/// use voucher_engine::models::SourceTable;
///
/// assert_eq!(SourceTable::UnionValues.to_string(), "union_values");
/// assert_eq!(SourceTable::ALL.len(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    /// Active employees.
    Active,
    /// Employees on vacation during the competence month.
    Vacations,
    /// Terminated employees and their termination dates.
    Terminations,
    /// Admissions with their admission dates.
    Admissions,
    /// Daily voucher value per union.
    UnionValues,
    /// Working-day count per union.
    UnionWorkingDays,
    /// Matriculas of employees working abroad.
    Expatriates,
    /// Matriculas of interns.
    Interns,
    /// Matriculas of apprentices.
    Apprentices,
    /// Matriculas of employees on leave of absence.
    LeaveOfAbsence,
}

impl SourceTable {
    /// Every table, in the order the consolidator reads them.
    pub const ALL: [SourceTable; 10] = [
        SourceTable::Active,
        SourceTable::Vacations,
        SourceTable::Terminations,
        SourceTable::Admissions,
        SourceTable::UnionValues,
        SourceTable::UnionWorkingDays,
        SourceTable::Expatriates,
        SourceTable::Interns,
        SourceTable::Apprentices,
        SourceTable::LeaveOfAbsence,
    ];

    /// Returns the snake_case name used in logs and API payloads.
    pub fn name(self) -> &'static str {
        match self {
            SourceTable::Active => "active",
            SourceTable::Vacations => "vacations",
            SourceTable::Terminations => "terminations",
            SourceTable::Admissions => "admissions",
            SourceTable::UnionValues => "union_values",
            SourceTable::UnionWorkingDays => "union_working_days",
            SourceTable::Expatriates => "expatriates",
            SourceTable::Interns => "interns",
            SourceTable::Apprentices => "apprentices",
            SourceTable::LeaveOfAbsence => "leave_of_absence",
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_serde() {
        for table in SourceTable::ALL {
            let json = serde_json::to_string(&table).unwrap();
            assert_eq!(json, format!("\"{}\"", table.name()));
        }
    }

    #[test]
    fn test_deserialize_from_name() {
        let table: SourceTable = serde_json::from_str("\"leave_of_absence\"").unwrap();
        assert_eq!(table, SourceTable::LeaveOfAbsence);
    }
}
