//! Group ledger.
//!
//! The ledger collects a group's journal records (members, expense parts and
//! settlements) and assembles them into the snapshot the pure computations
//! run on. Records can be applied one by one or from an async stream.

use std::collections::HashMap;

use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::balance::compute_group_balances;
use crate::model::{Balances, Expense, ExpenseRef, MemberId, Record, Settlement, Transaction};
use crate::pairwise::{PairwiseDebts, compute_pairwise_debts};
use crate::simplify::simplify_debts;
use crate::validate::validate_settlement;

mod state;
pub use state::ExpenseDraft;

mod error;
pub use error::LedgerError;

/// Accumulates one group's journal.
pub struct GroupLedger {
    /// Declared members, in declaration order.
    members: Vec<MemberId>,
    /// Expense drafts in opening order
    drafts: Vec<(ExpenseRef, ExpenseDraft)>,
    /// Position of each open expense in `drafts`
    index: HashMap<ExpenseRef, usize>,
    settlements: Vec<Settlement>,
}

/// A consistent view of a group's history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub members: Vec<MemberId>,
    pub expenses: Vec<Expense>,
    pub settlements: Vec<Settlement>,
}

impl GroupSnapshot {
    pub fn balances(&self) -> Balances {
        compute_group_balances(&self.expenses, &self.settlements, &self.members)
    }

    pub fn simplified(&self) -> Vec<Transaction> {
        simplify_debts(&self.balances())
    }

    pub fn pairwise(&self) -> PairwiseDebts {
        compute_pairwise_debts(&self.expenses, &self.settlements)
    }
}

/// Public API
impl GroupLedger {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
            drafts: Vec::new(),
            index: HashMap::new(),
            settlements: Vec::new(),
        }
    }

    /// Run the ledger over the given record stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = Record> + Unpin) {
        while let Some(record) = stream.next().await {
            // a rejected record should not stop the ledger; it is already logged
            let _ = self.apply(record);
        }
    }

    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    pub fn settlements(&self) -> &[Settlement] {
        &self.settlements
    }

    /// Return the draft of an open expense
    pub fn draft(&self, expense: &str) -> Option<&ExpenseDraft> {
        self.index.get(expense).map(|&idx| &self.drafts[idx].1)
    }

    /// Apply a single record on top of the current ledger state
    pub fn apply(&mut self, record: Record) -> Result<(), LedgerError> {
        let kind = Self::kind(&record);
        let subject = Self::subject(&record);
        let result = self.apply_record(record);
        Self::log_result(kind, &subject, &result);
        result
    }

    /// Finalise every draft into an expense.
    ///
    /// Drafts that fail validation are left out and logged.
    pub fn snapshot(&self) -> GroupSnapshot {
        let expenses = self
            .drafts
            .iter()
            .filter_map(|(reference, draft)| match draft.build() {
                Ok(expense) => Some(expense),
                Err(e) => {
                    warn!(expense = %reference, reason = %e, "expense skipped");
                    None
                }
            })
            .collect();

        GroupSnapshot {
            members: self.members.clone(),
            expenses,
            settlements: self.settlements.clone(),
        }
    }

    pub fn balances(&self) -> Balances {
        self.snapshot().balances()
    }

    pub fn simplified(&self) -> Vec<Transaction> {
        self.snapshot().simplified()
    }

    pub fn pairwise(&self) -> PairwiseDebts {
        self.snapshot().pairwise()
    }
}

/// Private API
impl GroupLedger {
    fn kind(record: &Record) -> &'static str {
        match record {
            Record::Member { .. } => "member",
            Record::Expense { .. } => "expense",
            Record::Contribution { .. } => "contribution",
            Record::Payer { .. } => "payer",
            Record::Participant { .. } => "participant",
            Record::Settlement(_) => "settlement",
        }
    }

    fn subject(record: &Record) -> String {
        match record {
            Record::Member { member } => member.clone(),
            Record::Expense { expense, .. } => expense.clone(),
            Record::Contribution { expense, member, .. }
            | Record::Payer { expense, member }
            | Record::Participant { expense, member, .. } => format!("{expense}/{member}"),
            Record::Settlement(s) => format!("{}->{}", s.from, s.to),
        }
    }

    /// Small helper to log `apply` results
    fn log_result(kind: &str, subject: &str, result: &Result<(), LedgerError>) {
        match result {
            Ok(()) => info!(subject = %subject, "{kind} applied"),
            Err(e) => warn!(subject = %subject, reason = %e, "{kind} skipped"),
        }
    }

    fn apply_record(&mut self, record: Record) -> Result<(), LedgerError> {
        if let Some(expense) = record.part_of() {
            let idx = *self
                .index
                .get(expense)
                .ok_or_else(|| LedgerError::UnknownExpense(expense.to_string()))?;
            self.drafts[idx].1.absorb(record);
            return Ok(());
        }

        match record {
            Record::Member { member } => {
                if !self.members.contains(&member) {
                    self.members.push(member);
                }
            }
            Record::Expense {
                expense,
                amount,
                split_type,
                description,
                date,
            } => {
                if self.index.contains_key(&expense) {
                    return Err(LedgerError::DuplicateExpense(expense));
                }
                let mut draft = ExpenseDraft::new(amount, split_type);
                draft.description = description;
                draft.date = date;
                self.index.insert(expense.clone(), self.drafts.len());
                self.drafts.push((expense, draft));
            }
            Record::Settlement(settlement) => {
                validate_settlement(&settlement)?;
                self.settlements.push(settlement);
            }
            // expense parts are routed to their draft above
            Record::Contribution { .. } | Record::Payer { .. } | Record::Participant { .. } => {}
        }
        Ok(())
    }
}

impl Default for GroupLedger {
    fn default() -> Self {
        Self::new()
    }
}
