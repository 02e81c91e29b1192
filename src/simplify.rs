//! Debt simplification: reduces net balances to a short list of transfers.

use tracing::debug;

use crate::Amount;
use crate::model::{Balances, MemberId, Transaction};

struct Position {
    member: MemberId,
    remaining: Amount,
}

/// Greedily match debtors against creditors until one side runs out.
///
/// Members within [`Amount::EPSILON`] of zero are considered settled.
/// Debtors are taken most negative first, creditors most positive first;
/// ties keep member order. Each emitted amount is rounded to cents, while
/// running balances move by the unrounded amount.
pub fn simplify_debts(balances: &Balances) -> Vec<Transaction> {
    let mut debtors: Vec<Position> = Vec::new();
    let mut creditors: Vec<Position> = Vec::new();

    for (member, &balance) in balances {
        if balance < -Amount::EPSILON {
            debtors.push(Position {
                member: member.clone(),
                remaining: balance,
            });
        } else if balance > Amount::EPSILON {
            creditors.push(Position {
                member: member.clone(),
                remaining: balance,
            });
        }
    }

    debtors.sort_by_key(|debtor| debtor.remaining);
    creditors.sort_by_key(|creditor| std::cmp::Reverse(creditor.remaining));

    let mut transactions = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];

        let amount = debtor.remaining.abs().min(creditor.remaining);
        let rounded = amount.round_cents();

        if rounded > Amount::ZERO {
            transactions.push(Transaction {
                from: debtor.member.clone(),
                to: creditor.member.clone(),
                amount: rounded,
            });
        }

        debtor.remaining += amount;
        creditor.remaining -= amount;

        if debtor.remaining.is_negligible() {
            i += 1;
        }
        if creditor.remaining.is_negligible() {
            j += 1;
        }
    }

    debug!(
        debtors = debtors.len(),
        creditors = creditors.len(),
        transactions = transactions.len(),
        "debts simplified"
    );

    transactions
}
