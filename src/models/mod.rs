//! Core data models for the Voucher Benefit Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod audit;
mod competence;
mod dataset;
mod diagnostic;
mod employee;
mod tables;

pub use audit::AuditStep;
pub use competence::Competence;
pub use dataset::{
    AdmissionRecord, BenefitTotals, Dataset, ExclusionKind, ExclusionSets, TerminationRecord,
    VacationRecord,
};
pub use diagnostic::{Diagnostic, Severity};
pub use employee::{EmployeeRecord, FALLBACK_DAY, SourceDate};
pub use tables::SourceTable;
