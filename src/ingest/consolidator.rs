//! Consolidation of the source tables into one [`Dataset`].
//!
//! Reads every source table, normalizes union names, fills the lookup maps
//! and tags exclusion flags. A missing or unreadable table never aborts the
//! run; it is logged and, when unreadable, recorded as an observation.

use std::collections::BTreeSet;

use tracing::{error, info, warn};

use crate::config::ConfigLoader;
use crate::models::{
    AdmissionRecord, Competence, Dataset, EmployeeRecord, ExclusionKind, SourceTable,
    TerminationRecord, VacationRecord,
};

use super::union_names::{canonical_union, normalize_union};
use super::values::{parse_count, parse_date, parse_days, parse_decimal};
use super::{Table, TableReader};

const MATRICULA: &[&str] = &["MATRICULA", "CADASTRO"];
const NAME: &[&str] = &[
    "NOME",
    "NOME COLABORADOR",
    "NOME DO COLABORADOR",
    "NOME COMPLETO",
    "COLABORADOR",
    "FUNCIONARIO",
    "FUNCIONÁRIO",
];
const DOCUMENT: &[&str] = &["CPF", "CPF COLABORADOR"];
const COMPANY: &[&str] = &["EMPRESA"];
const ROLE: &[&str] = &["TITULO DO CARGO", "TÍTULO DO CARGO", "CARGO"];
const SITUATION: &[&str] = &["DESC. SITUACAO", "SITUAÇÃO", "DESC SITUACAO", "SITUACAO"];
const UNION: &[&str] = &["SINDICATO"];
const ADMISSION: &[&str] = &["DATA ADMISSÃO", "DATA ADM", "ADMISSÃO", "DATA DE ADMISSÃO", "ADMISSAO"];
const WORKING_DAYS: &[&str] = &[
    "DIAS UTEIS",
    "DIAS ÚTEIS",
    "DIAS UTEIS MÊS",
    "DIAS UTEIS MES",
    "DIAS_UTEIS",
];
const DAYS_WORKED: &[&str] = &[
    "DIAS TRABALHADOS",
    "DIAS TRAB.",
    "DIAS TRAB",
    "DIAS_TRABALHADOS",
];
const VACATION_DAYS: &[&str] = &["DIAS DE FÉRIAS", "DIAS DE FERIAS", "DIAS FÉRIAS", "DIAS"];
const TERMINATION_DATE: &[&str] = &["DATA DEMISSÃO", "DATA DEMISSAO", "DATA DESLIGAMENTO"];
const TERMINATION_NOTICE: &[&str] = &["COMUNICADO DE DESLIGAMENTO", "COMUNICADO"];

/// Builds the dataset for `competence` from every table `reader` supplies.
///
/// # Example
///
/// ```
/// use voucher_engine::config::{ConfigLoader, PipelineSettings};
/// use voucher_engine::ingest::{run_consolidator, InMemoryTables, Table};
/// use voucher_engine::models::{Competence, SourceTable};
/// use std::collections::HashMap;
///
/// let config = ConfigLoader::from_parts(PipelineSettings::default(), HashMap::new()).unwrap();
/// let mut tables = InMemoryTables::new();
/// tables.insert(
///     SourceTable::Active,
///     Table::new(
///         vec!["MATRICULA".into(), "SINDICATO".into()],
///         vec![vec!["1001".into(), "SINDPD SP".into()]],
///     ),
/// );
///
/// let dataset = run_consolidator(&tables, &config, Competence::new(2025, 5).unwrap());
/// assert_eq!(dataset.employees[0].union, "São Paulo");
/// ```
pub fn run_consolidator(
    reader: &dyn TableReader,
    config: &ConfigLoader,
    competence: Competence,
) -> Dataset {
    let mut dataset = Dataset::new(competence);
    dataset.add_observation(format!("Competence processed: {}", competence));
    info!(competence = %competence, "consolidating source tables");

    for table in SourceTable::ALL {
        match reader.read(table) {
            Ok(Some(data)) => {
                load_table(&mut dataset, table, &data, config);
                info!(table = %table, rows = data.len(), "source table loaded");
            }
            Ok(None) => warn!(table = %table, "source table not found"),
            Err(err) => {
                error!(table = %table, error = %err, "source table could not be read");
                dataset.add_observation(format!("Failed to read {}: {}", table, err));
            }
        }
    }

    fill_admission_dates(&mut dataset);
    fill_from_policies(&mut dataset, config);
    fill_working_days(&mut dataset);
    tag_exclusions(&mut dataset);
    note_unmapped_unions(&mut dataset, config);

    info!(
        employees = dataset.active_count(),
        unions = dataset.union_values.len(),
        "consolidation complete"
    );
    dataset
}

fn load_table(dataset: &mut Dataset, table: SourceTable, data: &Table, config: &ConfigLoader) {
    match table {
        SourceTable::Active => load_active(dataset, data, config),
        SourceTable::Vacations => load_vacations(dataset, data),
        SourceTable::Terminations => load_terminations(dataset, data),
        SourceTable::Admissions => load_admissions(dataset, data),
        SourceTable::UnionValues => load_union_values(dataset, data),
        SourceTable::UnionWorkingDays => load_working_days(dataset, data, config),
        SourceTable::Expatriates => load_exclusions(dataset, data, ExclusionKind::Expatriate),
        SourceTable::Interns => load_exclusions(dataset, data, ExclusionKind::Intern),
        SourceTable::Apprentices => load_exclusions(dataset, data, ExclusionKind::Apprentice),
        SourceTable::LeaveOfAbsence => load_exclusions(dataset, data, ExclusionKind::Leave),
    }
}

fn load_active(dataset: &mut Dataset, data: &Table, config: &ConfigLoader) {
    let rules = &config.settings().union_normalization;
    let matricula = data.column(MATRICULA);
    let name = data.column(NAME);
    let document = data.column(DOCUMENT);
    let company = data.column(COMPANY);
    let role = data.column(ROLE);
    let situation = data.column(SITUATION);
    let union = data.column(UNION);
    let admission = data.column(ADMISSION);
    let working_days = data.column(WORKING_DAYS);
    let days_worked = data.column(DAYS_WORKED);

    for row in data.rows() {
        let mut record = EmployeeRecord::new(Table::cell(row, matricula));
        record.name = Table::cell(row, name).to_string();
        record.document_id = Table::cell(row, document).to_string();
        record.company = Table::cell(row, company).to_string();
        record.role = Table::cell(row, role).to_string();
        record.situation = Table::cell(row, situation).to_string();
        record.union_raw = Table::cell(row, union).to_string();
        record.union = normalize_union(&record.union_raw, rules);
        record.admission_date = parse_date(Table::cell(row, admission));
        record.working_days = parse_days(Table::cell(row, working_days));
        record.days_worked = parse_days(Table::cell(row, days_worked));
        dataset.employees.push(record);
    }
}

fn load_vacations(dataset: &mut Dataset, data: &Table) {
    let matricula = data.column(MATRICULA);
    let situation = data.column(SITUATION);
    let days = data.column(VACATION_DAYS);

    for row in data.rows() {
        let key = Table::cell(row, matricula);
        if key.is_empty() {
            continue;
        }
        dataset.add_vacation(VacationRecord {
            matricula: key.to_string(),
            situation: Table::cell(row, situation).to_string(),
            days: parse_decimal(Table::cell(row, days)),
        });
    }
}

fn load_terminations(dataset: &mut Dataset, data: &Table) {
    let matricula = data.column(MATRICULA);
    let date = data.column(TERMINATION_DATE);
    let notice = data.column(TERMINATION_NOTICE);

    for row in data.rows() {
        let key = Table::cell(row, matricula);
        if key.is_empty() {
            continue;
        }
        dataset.add_termination(TerminationRecord {
            matricula: key.to_string(),
            termination_date: parse_date(Table::cell(row, date)),
            notice: Table::cell(row, notice).to_string(),
        });
    }
}

fn load_admissions(dataset: &mut Dataset, data: &Table) {
    let matricula = data.column(MATRICULA);
    let date = data.column(ADMISSION);
    let role = data.column(ROLE);

    for row in data.rows() {
        let key = Table::cell(row, matricula);
        if key.is_empty() {
            continue;
        }
        dataset.add_admission(AdmissionRecord {
            matricula: key.to_string(),
            admission_date: parse_date(Table::cell(row, date)),
            role: Table::cell(row, role).to_string(),
        });
    }
}

/// Column 0 is the union key, column 1 the daily value.
fn load_union_values(dataset: &mut Dataset, data: &Table) {
    for row in data.rows() {
        let key = Table::cell(row, Some(0));
        if key.is_empty() {
            continue;
        }
        if let Some(value) = parse_decimal(Table::cell(row, Some(1))) {
            dataset.union_values.insert(key.to_string(), value);
        }
    }
}

/// Column 0 is a union legend, column 1 the count. Rows whose count is not
/// numeric (label rows) are skipped.
fn load_working_days(dataset: &mut Dataset, data: &Table, config: &ConfigLoader) {
    let rules = &config.settings().union_normalization;
    for row in data.rows() {
        let legend = Table::cell(row, Some(0));
        if legend.is_empty() {
            continue;
        }
        if let Some(days) = parse_count(Table::cell(row, Some(1))) {
            dataset
                .union_working_days
                .insert(normalize_union(legend, rules), days);
        }
    }
}

fn load_exclusions(dataset: &mut Dataset, data: &Table, kind: ExclusionKind) {
    let column = data.column(MATRICULA).or(Some(0));
    for row in data.rows() {
        dataset.exclusions.insert(kind, Table::cell(row, column));
    }
}

fn fill_admission_dates(dataset: &mut Dataset) {
    let Dataset {
        employees,
        admissions,
        ..
    } = dataset;

    for record in employees.iter_mut() {
        if record.admission_date.is_none() {
            if let Some(admission) = admissions.get(&record.matricula) {
                record.admission_date = admission.admission_date.clone();
            }
        }
    }
}

/// Unions the source tables leave unconfigured take their policy defaults.
fn fill_from_policies(dataset: &mut Dataset, config: &ConfigLoader) {
    let mut policies: Vec<_> = config.policies().iter().collect();
    policies.sort_by(|a, b| a.0.cmp(b.0));

    for (name, policy) in policies {
        if let Some(value) = policy.daily_value {
            if !dataset.union_values.contains_key(name.as_str()) {
                dataset.union_values.insert(name.clone(), value);
                dataset.add_observation(format!("Daily value for {} taken from configuration", name));
            }
        }
        if let Some(days) = policy.working_days {
            if !dataset.union_working_days.contains_key(name.as_str()) {
                dataset.union_working_days.insert(name.clone(), days);
                dataset.add_observation(format!(
                    "Working days for {} taken from configuration",
                    name
                ));
            }
        }
    }
}

fn fill_working_days(dataset: &mut Dataset) {
    let Dataset {
        employees,
        union_working_days,
        ..
    } = dataset;

    let mut filled = 0usize;
    for record in employees.iter_mut() {
        if record.working_days.is_none_or(|d| d <= 0) {
            if let Some(days) = union_working_days.get(&record.union) {
                record.working_days = Some(*days);
                filled += 1;
            }
        }
    }
    if filled > 0 {
        info!(filled, "working days filled from union table");
    }
}

fn tag_exclusions(dataset: &mut Dataset) {
    let Dataset {
        employees,
        exclusions,
        ..
    } = dataset;

    for record in employees.iter_mut() {
        let key = record.matricula.as_str();
        record.expatriate = exclusions.expatriates.contains(key);
        record.intern = exclusions.interns.contains(key);
        record.apprentice = exclusions.apprentices.contains(key);
        record.on_leave = exclusions.leave.contains(key);
    }
}

fn note_unmapped_unions(dataset: &mut Dataset, config: &ConfigLoader) {
    let rules = &config.settings().union_normalization;
    let unmapped: BTreeSet<String> = dataset
        .employees
        .iter()
        .filter(|e| !e.union_raw.is_empty())
        .filter(|e| canonical_union(&e.union_raw, rules).is_none())
        .filter(|e| {
            !dataset.union_values.contains_key(&e.union) && config.policy(&e.union).is_none()
        })
        .map(|e| e.union.clone())
        .collect();

    if !unmapped.is_empty() {
        let names: Vec<String> = unmapped.into_iter().collect();
        warn!(unions = ?names, "union names kept as given");
        let observation = format!("Unmapped union names kept as given: {}", names.join(", "));
        dataset.add_observation(observation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PipelineSettings, UnionPolicy};
    use crate::error::{EngineError, EngineResult};
    use crate::ingest::InMemoryTables;
    use crate::models::SourceDate;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::collections::HashMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn config() -> ConfigLoader {
        ConfigLoader::from_parts(PipelineSettings::default(), HashMap::new()).unwrap()
    }

    fn may() -> Competence {
        Competence::new(2025, 5).unwrap()
    }

    fn active_table() -> Table {
        table(
            &[
                "MATRICULA",
                "EMPRESA",
                "TITULO DO CARGO",
                "DESC. SITUACAO",
                "Sindicato",
            ],
            &[
                &["1001", "1410", "ANALISTA", "Trabalhando", "SINDPD SP - SIND. TRAB. EM PROC DADOS"],
                &["1002", "1410", "ESTAGIARIO", "Trabalhando", "SINDPPD RS - RIO GRANDE DO SUL"],
                &["1003", "1410", "ANALISTA", "Trabalhando", "SINDICATO_QUIMICOS"],
            ],
        )
    }

    #[test]
    fn test_active_records_are_built_from_aliases() {
        let mut tables = InMemoryTables::new();
        tables.insert(SourceTable::Active, active_table());

        let dataset = run_consolidator(&tables, &config(), may());

        assert_eq!(dataset.active_count(), 3);
        let first = &dataset.employees[0];
        assert_eq!(first.matricula, "1001");
        assert_eq!(first.role, "ANALISTA");
        assert_eq!(first.union, "São Paulo");
        assert_eq!(first.company, "1410");
        assert!(first.active && first.eligible);
        assert_eq!(dataset.employees[1].union, "Rio Grande do Sul");
        assert_eq!(dataset.observations[0], "Competence processed: 05.2025");
    }

    #[test]
    fn test_union_tables_and_working_day_fill() {
        let mut tables = InMemoryTables::new();
        tables.insert(SourceTable::Active, active_table());
        tables.insert(
            SourceTable::UnionValues,
            table(
                &["ESTADO", "VALOR"],
                &[&["São Paulo", "37,5"], &["Rio Grande do Sul", "35"], &["", ""]],
            ),
        );
        tables.insert(
            SourceTable::UnionWorkingDays,
            table(
                &["BASE DIAS UTEIS DE MAIO", ""],
                &[
                    &["SINDICADO", "DIAS UTEIS"],
                    &["SINDPD SP - SIND. TRAB. EM PROC DADOS", "22"],
                    &["SINDPPD RS - RIO GRANDE DO SUL", "21"],
                ],
            ),
        );

        let dataset = run_consolidator(&tables, &config(), may());

        assert_eq!(dataset.union_values["São Paulo"], dec("37.5"));
        assert_eq!(dataset.union_working_days["São Paulo"], 22);
        assert_eq!(dataset.union_working_days["Rio Grande do Sul"], 21);
        assert_eq!(dataset.union_working_days.len(), 2);
        assert_eq!(dataset.employees[0].working_days, Some(22));
        assert_eq!(dataset.employees[2].working_days, None);
    }

    #[test]
    fn test_side_tables_and_admission_fill() {
        let mut tables = InMemoryTables::new();
        tables.insert(SourceTable::Active, active_table());
        tables.insert(
            SourceTable::Vacations,
            table(&["MATRICULA", "DESC. SITUACAO", "DIAS DE FÉRIAS"], &[&["1001", "Férias", "10"]]),
        );
        tables.insert(
            SourceTable::Terminations,
            table(
                &["MATRICULA ", "DATA DEMISSÃO", "COMUNICADO DE DESLIGAMENTO"],
                &[&["1003", "2025-05-20", "OK"]],
            ),
        );
        tables.insert(
            SourceTable::Admissions,
            table(&["MATRICULA", "Admissão", "Cargo"], &[&["1001", "12/05/2025", "ANALISTA"]]),
        );

        let dataset = run_consolidator(&tables, &config(), may());

        assert_eq!(dataset.vacations["1001"].days, Some(dec("10")));
        assert_eq!(
            dataset.terminations["1003"].termination_date,
            Some(SourceDate::Parsed(NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()))
        );
        assert_eq!(
            dataset.employees[0].admission_date,
            Some(SourceDate::Parsed(NaiveDate::from_ymd_opt(2025, 5, 12).unwrap()))
        );
    }

    #[test]
    fn test_exclusion_lists_tag_records() {
        let mut tables = InMemoryTables::new();
        tables.insert(SourceTable::Active, active_table());
        tables.insert(SourceTable::Expatriates, table(&["Cadastro", "Valor"], &[&["1001", ""]]));
        tables.insert(SourceTable::LeaveOfAbsence, table(&["MATRICULA"], &[&["1003"], &[""]]));

        let dataset = run_consolidator(&tables, &config(), may());

        assert!(dataset.exclusions.expatriates.contains("1001"));
        assert_eq!(dataset.exclusions.leave.len(), 1);
        assert!(dataset.employees[0].expatriate);
        assert!(dataset.employees[2].on_leave);
        assert!(!dataset.employees[1].on_leave);
    }

    #[test]
    fn test_policy_values_fill_unconfigured_unions() {
        let mut unions = HashMap::new();
        unions.insert(
            "SINDICATO_QUIMICOS".to_string(),
            UnionPolicy {
                daily_value: Some(dec("28.00")),
                working_days: Some(23),
                ..UnionPolicy::default()
            },
        );
        let config = ConfigLoader::from_parts(PipelineSettings::default(), unions).unwrap();
        let mut tables = InMemoryTables::new();
        tables.insert(SourceTable::Active, active_table());

        let dataset = run_consolidator(&tables, &config, may());

        assert_eq!(dataset.union_values["SINDICATO_QUIMICOS"], dec("28.00"));
        assert_eq!(dataset.employees[2].working_days, Some(23));
        assert!(
            dataset
                .observations
                .iter()
                .any(|o| o == "Daily value for SINDICATO_QUIMICOS taken from configuration")
        );
        assert!(!dataset.observations.iter().any(|o| o.starts_with("Unmapped")));
    }

    #[test]
    fn test_unmapped_unions_are_listed() {
        let mut tables = InMemoryTables::new();
        tables.insert(SourceTable::Active, active_table());

        let dataset = run_consolidator(&tables, &config(), may());

        assert!(
            dataset
                .observations
                .contains(&"Unmapped union names kept as given: SINDICATO_QUIMICOS".to_string())
        );
    }

    struct FailingReader;

    impl TableReader for FailingReader {
        fn read(&self, table: SourceTable) -> EngineResult<Option<Table>> {
            match table {
                SourceTable::Vacations => Err(EngineError::SourceReadError {
                    table: table.to_string(),
                    message: "corrupt".to_string(),
                }),
                SourceTable::Active => Ok(Some(active_table())),
                _ => Ok(None),
            }
        }
    }

    #[test]
    fn test_unreadable_table_is_not_fatal() {
        let dataset = run_consolidator(&FailingReader, &config(), may());

        assert_eq!(dataset.active_count(), 3);
        assert!(
            dataset
                .observations
                .iter()
                .any(|o| o.starts_with("Failed to read vacations"))
        );
    }
}
