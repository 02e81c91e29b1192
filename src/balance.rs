//! Balance aggregation: folds a group's history into one net balance per member.

use tracing::debug;

use crate::Amount;
use crate::model::{Balances, Expense, MemberId, PaidBy, Settlement};

/// Compute each member's net balance from the full expense and settlement history.
///
/// Every member in `members` appears in the result, even without activity.
/// Members referenced only by expenses or settlements are added as they are met.
/// Amounts are summed exactly; no rounding happens here.
pub fn compute_group_balances(
    expenses: &[Expense],
    settlements: &[Settlement],
    members: &[MemberId],
) -> Balances {
    let mut balances: Balances = members
        .iter()
        .map(|member| (member.clone(), Amount::ZERO))
        .collect();

    for expense in expenses {
        match &expense.paid_by {
            PaidBy::MultiPayer { contributions } => {
                for (member, paid) in contributions {
                    *balances.entry(member.clone()).or_default() += *paid;
                }
                for split in &expense.splits {
                    *balances.entry(split.member.clone()).or_default() -= split.amount;
                }
            }
            // The payer's own split is skipped instead of netted against the payment
            PaidBy::SinglePayer { payer } => {
                for split in expense.splits.iter().filter(|s| &s.member != payer) {
                    *balances.entry(payer.clone()).or_default() += split.amount;
                    *balances.entry(split.member.clone()).or_default() -= split.amount;
                }
            }
        }
    }

    for settlement in settlements {
        *balances.entry(settlement.from.clone()).or_default() += settlement.amount;
        *balances.entry(settlement.to.clone()).or_default() -= settlement.amount;
    }

    debug!(
        members = balances.len(),
        expenses = expenses.len(),
        settlements = settlements.len(),
        "group balances computed"
    );

    balances
}

/// One member's position summed over several groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobalSummary {
    /// Sum of the member's positive group balances.
    pub total_owed: Amount,
    /// Sum of the magnitudes of the member's negative group balances.
    pub total_owes: Amount,
}

/// Roll up `member`'s balance in each group, without netting across groups.
pub fn global_summary<'a>(
    member: &str,
    group_balances: impl IntoIterator<Item = &'a Balances>,
) -> GlobalSummary {
    group_balances
        .into_iter()
        .filter_map(|balances| balances.get(member).copied())
        .fold(GlobalSummary::default(), |mut summary, balance| {
            if balance > Amount::ZERO {
                summary.total_owed += balance;
            } else {
                summary.total_owes += balance.abs();
            }
            summary
        })
}
