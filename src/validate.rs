//! Checks a caller runs before accepting an expense or settlement.
//!
//! The computation functions never fail on malformed input; they produce
//! degenerate output instead. These checks catch that input first.

use thiserror::Error;

use crate::Amount;
use crate::model::{Expense, MemberId, PaidBy, Settlement};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("expense amount must be positive, got {0}")]
    NonPositiveAmount(Amount),

    #[error("expense has no participants")]
    NoParticipants,

    #[error("total shares are zero")]
    ZeroTotalShares,

    #[error("split amounts do not equal total: {actual} vs {expected}")]
    SplitSumMismatch { expected: Amount, actual: Amount },

    #[error("contributions do not equal total: {actual} vs {expected}")]
    ContributionSumMismatch { expected: Amount, actual: Amount },

    #[error("contribution of {0} is negative")]
    NegativeContribution(MemberId),

    #[error("expense has no payer")]
    MissingPayer,

    #[error("expense has both contributors and a single payer")]
    ConflictingPayers,

    #[error("{0} cannot settle with themselves")]
    SelfSettlement(MemberId),

    #[error("settlement amount must be positive, got {0}")]
    NonPositiveSettlement(Amount),
}

/// Check that an expense is positive, has participants, and that both its
/// splits and its contributions add up to the total within [`Amount::EPSILON`].
pub fn validate_expense(expense: &Expense) -> Result<(), ValidationError> {
    if expense.amount <= Amount::ZERO {
        return Err(ValidationError::NonPositiveAmount(expense.amount));
    }

    if expense.splits.is_empty() {
        return Err(ValidationError::NoParticipants);
    }

    let split_total: Amount = expense.splits.iter().map(|split| split.amount).sum();
    if !split_total.approx_eq(expense.amount) {
        return Err(ValidationError::SplitSumMismatch {
            expected: expense.amount,
            actual: split_total,
        });
    }

    match &expense.paid_by {
        PaidBy::MultiPayer { contributions } => {
            let negative = contributions.iter().find(|(_, paid)| **paid < Amount::ZERO);
            if let Some((member, _)) = negative {
                return Err(ValidationError::NegativeContribution(member.clone()));
            }
            let paid_total: Amount = contributions.values().sum();
            if !paid_total.approx_eq(expense.amount) {
                return Err(ValidationError::ContributionSumMismatch {
                    expected: expense.amount,
                    actual: paid_total,
                });
            }
        }
        PaidBy::SinglePayer { .. } => {}
    }

    Ok(())
}

pub fn validate_settlement(settlement: &Settlement) -> Result<(), ValidationError> {
    if settlement.from == settlement.to {
        return Err(ValidationError::SelfSettlement(settlement.from.clone()));
    }
    if settlement.amount <= Amount::ZERO {
        return Err(ValidationError::NonPositiveSettlement(settlement.amount));
    }
    Ok(())
}
