//! Core domain types for the expense ledger.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::Amount;

/// Member identifier, opaque to the ledger.
pub type MemberId = String;

/// Journal reference of an expense.
pub type ExpenseRef = String;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Net balance per member: positive means the group owes the member,
/// negative means the member owes the group.
pub type Balances = BTreeMap<MemberId, Amount>;

/// Rule controlling how an expense total is divided among its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitType {
    Equal,
    Unequal,
    Shares,
    Percentage,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            SplitType::Equal => "equal",
            SplitType::Unequal => "unequal",
            SplitType::Shares => "shares",
            SplitType::Percentage => "percentage",
        }
    }
}

impl fmt::Display for SplitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown split type '{0}'")]
pub struct UnknownSplitType(pub String);

impl FromStr for SplitType {
    type Err = UnknownSplitType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equal" => Ok(SplitType::Equal),
            "unequal" => Ok(SplitType::Unequal),
            "shares" => Ok(SplitType::Shares),
            "percentage" => Ok(SplitType::Percentage),
            _ => Err(UnknownSplitType(s.to_string())),
        }
    }
}

/// One participant's computed share of an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub member: MemberId,
    /// What the member owes toward the expense.
    pub amount: Amount,
    pub shares: Option<Amount>,
    pub percentage: Option<Amount>,
}

impl Split {
    pub fn new(member: impl Into<MemberId>, amount: Amount) -> Self {
        Self {
            member: member.into(),
            amount,
            shares: None,
            percentage: None,
        }
    }
}

/// Per-participant parameters for [`compute_splits`](crate::compute_splits).
///
/// Only the field matching the split type is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitParams {
    pub amount: Option<Amount>,
    pub shares: Option<Amount>,
    pub percentage: Option<Amount>,
}

impl SplitParams {
    /// Parameters carrying `value` in the field `split_type` reads.
    pub fn for_split(split_type: SplitType, value: Option<Amount>) -> Self {
        match split_type {
            SplitType::Equal => Self::default(),
            SplitType::Unequal => Self {
                amount: value,
                ..Default::default()
            },
            SplitType::Shares => Self {
                shares: value,
                ..Default::default()
            },
            SplitType::Percentage => Self {
                percentage: value,
                ..Default::default()
            },
        }
    }
}

/// Who paid for an expense.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaidBy {
    /// One or more contributors, each with the amount they put in.
    MultiPayer {
        contributions: BTreeMap<MemberId, Amount>,
    },
    /// Legacy form: a single payer covered the whole expense.
    SinglePayer { payer: MemberId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expense {
    pub amount: Amount,
    pub paid_by: PaidBy,
    pub split_type: SplitType,
    pub splits: Vec<Split>,
    pub description: Option<String>,
    pub date: Option<Timestamp>,
}

impl Expense {
    pub fn new(amount: Amount, paid_by: PaidBy, split_type: SplitType, splits: Vec<Split>) -> Self {
        Self {
            amount,
            paid_by,
            split_type,
            splits,
            description: None,
            date: None,
        }
    }
}

/// A recorded repayment: `from` transferred `amount` to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Amount,
    pub date: Option<Timestamp>,
}

impl Settlement {
    pub fn new(from: impl Into<MemberId>, to: impl Into<MemberId>, amount: Amount) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
            date: None,
        }
    }

    pub fn with_date(mut self, date: Option<Timestamp>) -> Self {
        self.date = date;
        self
    }
}

/// A suggested payment from a debtor to a creditor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Amount,
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pays {} {}", self.from, self.to, self.amount)
    }
}

/// A journal record representing the possible inputs of the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Declare a group member.
    Member { member: MemberId },
    /// Open an expense with its total, split rule and metadata.
    Expense {
        expense: ExpenseRef,
        amount: Amount,
        split_type: SplitType,
        description: Option<String>,
        date: Option<Timestamp>,
    },
    /// A contributor paid part of an expense.
    Contribution {
        expense: ExpenseRef,
        member: MemberId,
        amount: Amount,
    },
    /// Legacy single payer of an expense.
    Payer { expense: ExpenseRef, member: MemberId },
    /// A participant of an expense; `value` is read according to the split type.
    Participant {
        expense: ExpenseRef,
        member: MemberId,
        value: Option<Amount>,
    },
    /// A repayment between two members.
    Settlement(Settlement),
}

impl Record {
    /// The expense this record is a part of, if it is an expense part.
    pub fn part_of(&self) -> Option<&str> {
        match self {
            Record::Contribution { expense, .. }
            | Record::Payer { expense, .. }
            | Record::Participant { expense, .. } => Some(expense),
            Record::Member { .. } | Record::Expense { .. } | Record::Settlement(_) => None,
        }
    }
}
