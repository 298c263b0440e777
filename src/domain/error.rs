use super::cpf::{Cpf, CpfError};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Which child collection of a declaration an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    Income,
    DeductibleExpense,
    Dependent,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntryKind::Income => "income",
            EntryKind::DeductibleExpense => "deductible expense",
            EntryKind::Dependent => "dependent",
        };
        f.write_str(s)
    }
}

/// Malformed input, raised before any state is touched.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid CPF: {0}")]
    InvalidCpf(#[from] CpfError),
    #[error("invalid year format: {0}")]
    InvalidYear(i32),
    #[error("income value cannot be negative: {0}")]
    NegativeIncome(Decimal),
    #[error("expense value must be positive: {0}")]
    NonPositiveExpense(Decimal),
    #[error("paying source cannot be empty")]
    BlankPayingSource,
    #[error("{0} id must be provided")]
    MissingId(EntryKind),
    #[error("dependent with CPF {0} is already declared")]
    DuplicateDependent(Cpf),
    #[error("{0} total would exceed the representable amount")]
    TotalOverflow(EntryKind),
    #[error("inconsistent snapshot: {0}")]
    InconsistentSnapshot(&'static str),
}

/// Lifecycle violations. The declaration is left unchanged.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("cannot {action} a declaration that is not in editing status")]
    NotEditing { action: &'static str },
    #[error("cannot submit a declaration with no incomes")]
    NoIncomes,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("{kind} not found with id: {id}")]
pub struct NotFoundError {
    pub kind: EntryKind,
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    State,
    NotFound,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl DeclarationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeclarationError::Validation(_) => ErrorKind::Validation,
            DeclarationError::State(_) => ErrorKind::State,
            DeclarationError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
