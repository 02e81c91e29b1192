//! Error types for journal record processing.

use thiserror::Error;

use crate::model::ExpenseRef;
use crate::validate::ValidationError;

/// Top-level error returned by [`GroupLedger::apply`](super::GroupLedger::apply).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("expense '{0}' is already open")]
    DuplicateExpense(ExpenseRef),

    #[error("expense '{0}' was never opened")]
    UnknownExpense(ExpenseRef),

    #[error("{0}")]
    Invalid(#[from] ValidationError),
}
