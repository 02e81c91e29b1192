//! Pairwise ledger: who owes whom directly, keeping counterparty identity
//! that net balances lose.

use std::collections::BTreeMap;

use tracing::debug;

use crate::Amount;
use crate::model::{Expense, MemberId, PaidBy, Settlement, Transaction};

/// Directional debts: `debtor -> creditor -> amount owed`.
///
/// Cells are raw sums and may be negative after an overpaying settlement.
/// The two directions between a pair are kept apart; use [`PairwiseDebts::net_with`]
/// for one signed figure per counterparty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairwiseDebts {
    debts: BTreeMap<MemberId, BTreeMap<MemberId, Amount>>,
}

impl PairwiseDebts {
    /// Raw amount `debtor` owes `creditor`.
    pub fn get(&self, debtor: &str, creditor: &str) -> Amount {
        self.debts
            .get(debtor)
            .and_then(|row| row.get(creditor))
            .copied()
            .unwrap_or_default()
    }

    /// Iterate over every recorded `(debtor, creditor, amount)` cell.
    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, &MemberId, Amount)> + '_ {
        self.debts.iter().flat_map(|(debtor, row)| {
            row.iter()
                .map(move |(creditor, amount)| (debtor, creditor, *amount))
        })
    }

    /// What `member` owes others: cells of the member's row above the tolerance.
    pub fn owed_by(&self, member: &str) -> Vec<(MemberId, Amount)> {
        self.debts
            .get(member)
            .into_iter()
            .flatten()
            .filter(|(_, amount)| **amount > Amount::EPSILON)
            .map(|(creditor, amount)| (creditor.clone(), *amount))
            .collect()
    }

    /// What others owe `member`: cells of other rows pointing at the member
    /// above the tolerance.
    pub fn owed_to(&self, member: &str) -> Vec<(MemberId, Amount)> {
        self.debts
            .iter()
            .filter(|(debtor, _)| debtor.as_str() != member)
            .filter_map(|(debtor, row)| row.get(member).map(|amount| (debtor, *amount)))
            .filter(|(_, amount)| *amount > Amount::EPSILON)
            .map(|(debtor, amount)| (debtor.clone(), amount))
            .collect()
    }

    /// Both directions netted per counterparty: positive means the counterparty
    /// owes `member`, negative means `member` owes them. Pairs within the
    /// tolerance are dropped.
    pub fn net_with(&self, member: &str) -> BTreeMap<MemberId, Amount> {
        let mut net: BTreeMap<MemberId, Amount> = BTreeMap::new();

        if let Some(row) = self.debts.get(member) {
            for (creditor, amount) in row.iter().filter(|(c, _)| c.as_str() != member) {
                *net.entry(creditor.clone()).or_default() -= *amount;
            }
        }
        for (debtor, row) in self.debts.iter().filter(|(d, _)| d.as_str() != member) {
            if let Some(amount) = row.get(member) {
                *net.entry(debtor.clone()).or_default() += *amount;
            }
        }

        net.retain(|_, amount| amount.abs() > Amount::EPSILON);
        net
    }

    /// Payments that would clear what `member` owes on the netted view,
    /// largest first, rounded to cents.
    pub fn suggested_payments(&self, member: &str) -> Vec<Transaction> {
        let mut payments: Vec<Transaction> = self
            .net_with(member)
            .into_iter()
            .filter(|(_, amount)| *amount < Amount::ZERO)
            .map(|(creditor, amount)| Transaction {
                from: member.to_string(),
                to: creditor,
                amount: amount.abs().round_cents(),
            })
            .collect();
        payments.sort_by_key(|payment| std::cmp::Reverse(payment.amount));
        payments
    }

    fn add(&mut self, debtor: &str, creditor: &str, amount: Amount) {
        *self
            .debts
            .entry(debtor.to_string())
            .or_default()
            .entry(creditor.to_string())
            .or_default() += amount;
    }
}

/// Build the pairwise ledger from the full expense and settlement history.
///
/// With several contributors, each split member's share is attributed to the
/// contributors in proportion to what they paid. A settlement only reduces the
/// `from -> to` cell.
pub fn compute_pairwise_debts(expenses: &[Expense], settlements: &[Settlement]) -> PairwiseDebts {
    let mut ledger = PairwiseDebts::default();

    for expense in expenses {
        match &expense.paid_by {
            PaidBy::MultiPayer { contributions } => {
                for split in &expense.splits {
                    for (contributor, contributed) in contributions {
                        if *contributed <= Amount::ZERO || *contributor == split.member {
                            continue;
                        }
                        let share = split.amount.scale(*contributed, expense.amount);
                        ledger.add(&split.member, contributor, share);
                    }
                }
            }
            PaidBy::SinglePayer { payer } => {
                for split in expense.splits.iter().filter(|s| &s.member != payer) {
                    ledger.add(&split.member, payer, split.amount);
                }
            }
        }
    }

    for settlement in settlements {
        ledger.add(&settlement.from, &settlement.to, -settlement.amount);
    }

    debug!(debtors = ledger.debts.len(), "pairwise debts computed");

    ledger
}
