pub mod amount;
pub mod balance;
pub mod journal;
pub mod ledger;
pub mod model;
pub mod pairwise;
pub mod simplify;
pub mod split;
pub mod validate;

pub use amount::Amount;
pub use balance::{GlobalSummary, compute_group_balances, global_summary};
pub use ledger::{GroupLedger, GroupSnapshot, LedgerError};
pub use model::{
    Balances, Expense, MemberId, PaidBy, Record, Settlement, Split, SplitParams, SplitType,
    Timestamp, Transaction,
};
pub use pairwise::{PairwiseDebts, compute_pairwise_debts};
pub use simplify::simplify_debts;
pub use split::compute_splits;
pub use validate::{ValidationError, validate_expense, validate_settlement};
