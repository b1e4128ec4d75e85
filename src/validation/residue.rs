//! Exclusion-residue and collective-agreement coverage checks.

use crate::error::EngineResult;
use crate::models::{Dataset, Diagnostic, ExclusionKind};

const RESIDUE: &str = "exclusion_residue";
const COVERAGE: &str = "agreement_coverage";

/// An eligible record listed in any exclusion set is an error, once per set.
pub fn check_exclusion_residue(dataset: &mut Dataset) -> EngineResult<Vec<Diagnostic>> {
    let mut found = Vec::new();
    for kind in ExclusionKind::ALL {
        let set = dataset.exclusions.set(kind);
        for record in dataset.employees.iter().filter(|e| e.eligible) {
            if set.contains(record.matricula.trim()) {
                found.push(
                    Diagnostic::error(
                        RESIDUE,
                        format!("Employee {} is listed as {}", record.matricula, kind),
                    )
                    .for_matricula(&record.matricula),
                );
            }
        }
    }
    Ok(found)
}

/// Every distinct referenced union without a daily value is a warning.
pub fn check_agreement_coverage(dataset: &mut Dataset) -> EngineResult<Vec<Diagnostic>> {
    Ok(dataset
        .referenced_unions()
        .into_iter()
        .filter(|union| !dataset.union_values.contains_key(union))
        .map(|union| {
            Diagnostic::warning(
                COVERAGE,
                format!("Union {} has no collective agreement value configured", union),
            )
        })
        .collect())
}
