use std::collections::BTreeMap;

use crate::model::{Expense, MemberId, PaidBy, SplitParams, SplitType, Timestamp};
use crate::split::compute_splits;
use crate::validate::{ValidationError, validate_expense};
use crate::{Amount, Record};

/// An expense still being assembled from journal records.
#[derive(Debug, Clone)]
pub struct ExpenseDraft {
    pub amount: Amount,
    pub split_type: SplitType,
    /// Contributors in the order they were recorded.
    pub contributions: Vec<(MemberId, Amount)>,
    pub payer: Option<MemberId>,
    /// Participants in journal order; the first absorbs equal-split remainders.
    pub participants: Vec<MemberId>,
    pub params: BTreeMap<MemberId, SplitParams>,
    pub description: Option<String>,
    pub date: Option<Timestamp>,
}

impl ExpenseDraft {
    pub fn new(amount: Amount, split_type: SplitType) -> Self {
        Self {
            amount,
            split_type,
            contributions: Vec::new(),
            payer: None,
            participants: Vec::new(),
            params: BTreeMap::new(),
            description: None,
            date: None,
        }
    }

    /// Fold a record belonging to this draft into it.
    ///
    /// Records that do not describe an expense part are ignored.
    pub fn absorb(&mut self, record: Record) {
        match record {
            Record::Contribution { member, amount, .. } => {
                self.contributions.push((member, amount));
            }
            Record::Payer { member, .. } => {
                self.payer = Some(member);
            }
            Record::Participant { member, value, .. } => {
                let param = SplitParams::for_split(self.split_type, value);
                if !self.participants.contains(&member) {
                    self.participants.push(member.clone());
                }
                self.params.insert(member, param);
            }
            Record::Member { .. } | Record::Expense { .. } | Record::Settlement(_) => {}
        }
    }

    /// Compute splits, pick the payer form and validate the result.
    pub fn build(&self) -> Result<Expense, ValidationError> {
        if self.participants.is_empty() {
            return Err(ValidationError::NoParticipants);
        }

        let paid_by = match (self.contributions.is_empty(), &self.payer) {
            (false, Some(_)) => return Err(ValidationError::ConflictingPayers),
            (true, None) => return Err(ValidationError::MissingPayer),
            (true, Some(payer)) => PaidBy::SinglePayer {
                payer: payer.clone(),
            },
            (false, None) => {
                let mut contributions: BTreeMap<MemberId, Amount> = BTreeMap::new();
                for (member, amount) in &self.contributions {
                    *contributions.entry(member.clone()).or_default() += *amount;
                }
                PaidBy::MultiPayer { contributions }
            }
        };

        let splits = compute_splits(
            self.amount,
            self.split_type,
            &self.participants,
            &self.params,
        );
        if splits.is_empty() && self.split_type == SplitType::Shares {
            return Err(ValidationError::ZeroTotalShares);
        }

        let expense = Expense {
            description: self.description.clone(),
            date: self.date,
            ..Expense::new(self.amount, paid_by, self.split_type, splits)
        };
        validate_expense(&expense)?;

        Ok(expense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(member: &str, value: Option<f64>) -> Record {
        Record::Participant {
            expense: "e".to_string(),
            member: member.to_string(),
            value: value.map(Amount::from_float),
        }
    }

    fn contribution(member: &str, amount: f64) -> Record {
        Record::Contribution {
            expense: "e".to_string(),
            member: member.to_string(),
            amount: Amount::from_float(amount),
        }
    }

    fn payer(member: &str) -> Record {
        Record::Payer {
            expense: "e".to_string(),
            member: member.to_string(),
        }
    }

    #[test]
    fn equal_draft_builds_with_single_payer() {
        let mut draft = ExpenseDraft::new(Amount::from_units(60), SplitType::Equal);
        draft.absorb(payer("A"));
        for member in ["A", "B", "C"] {
            draft.absorb(participant(member, None));
        }

        let expense = draft.build().unwrap();
        assert_eq!(
            expense.paid_by,
            PaidBy::SinglePayer {
                payer: "A".to_string()
            }
        );
        assert_eq!(expense.splits.len(), 3);
        assert!(expense.splits.iter().all(|s| s.amount == Amount::from_units(20)));
    }

    #[test]
    fn repeated_contributions_accumulate() {
        let mut draft = ExpenseDraft::new(Amount::from_units(90), SplitType::Equal);
        draft.absorb(contribution("A", 50.0));
        draft.absorb(contribution("B", 10.0));
        draft.absorb(contribution("A", 30.0));
        draft.absorb(participant("A", None));
        draft.absorb(participant("B", None));

        let expense = draft.build().unwrap();
        let PaidBy::MultiPayer { contributions } = expense.paid_by else {
            panic!("expected contributors");
        };
        assert_eq!(contributions.get("A"), Some(&Amount::from_units(80)));
        assert_eq!(contributions.get("B"), Some(&Amount::from_units(10)));
    }

    #[test]
    fn repeated_participant_keeps_first_position() {
        let mut draft = ExpenseDraft::new(Amount::from_units(30), SplitType::Shares);
        draft.absorb(payer("A"));
        draft.absorb(participant("A", Some(1.0)));
        draft.absorb(participant("B", Some(1.0)));
        draft.absorb(participant("A", Some(2.0)));

        let expense = draft.build().unwrap();
        assert_eq!(expense.splits[0].member, "A");
        assert_eq!(expense.splits[0].amount, Amount::from_units(20));
        assert_eq!(expense.splits[1].amount, Amount::from_units(10));
    }

    #[test]
    fn share_rounding_does_not_reject_consistent_draft() {
        // 10.02 / 4 = 2.505 each, rounding every share up would total 10.04
        let mut draft = ExpenseDraft::new(Amount::from_float(10.02), SplitType::Shares);
        draft.absorb(payer("A"));
        for member in ["A", "B", "C", "D"] {
            draft.absorb(participant(member, Some(1.0)));
        }

        let expense = draft.build().unwrap();
        let total: Amount = expense.splits.iter().map(|s| s.amount).sum();
        assert_eq!(total, Amount::from_float(10.02));
    }

    #[test]
    fn metadata_is_carried_into_expense() {
        let mut draft = ExpenseDraft::new(Amount::from_units(10), SplitType::Equal);
        draft.description = Some("taxi".to_string());
        draft.date = Some(1_700_000_000_000);
        draft.absorb(payer("A"));
        draft.absorb(participant("B", None));

        let expense = draft.build().unwrap();
        assert_eq!(expense.description.as_deref(), Some("taxi"));
        assert_eq!(expense.date, Some(1_700_000_000_000));
    }

    #[test]
    fn payer_forms_are_exclusive() {
        let mut draft = ExpenseDraft::new(Amount::from_units(10), SplitType::Equal);
        draft.absorb(participant("A", None));
        assert_eq!(draft.build(), Err(ValidationError::MissingPayer));

        draft.absorb(payer("A"));
        draft.absorb(contribution("A", 10.0));
        assert_eq!(draft.build(), Err(ValidationError::ConflictingPayers));
    }

    #[test]
    fn zero_shares_and_no_participants_are_reported() {
        let mut draft = ExpenseDraft::new(Amount::from_units(10), SplitType::Shares);
        draft.absorb(payer("A"));
        assert_eq!(draft.build(), Err(ValidationError::NoParticipants));

        draft.absorb(participant("A", Some(0.0)));
        assert_eq!(draft.build(), Err(ValidationError::ZeroTotalShares));
    }

    #[test]
    fn unbalanced_percentages_fail_validation() {
        let mut draft = ExpenseDraft::new(Amount::from_units(100), SplitType::Percentage);
        draft.absorb(payer("A"));
        draft.absorb(participant("A", Some(50.0)));
        draft.absorb(participant("B", Some(40.0)));

        assert!(matches!(
            draft.build(),
            Err(ValidationError::SplitSumMismatch { .. })
        ));
    }
}
