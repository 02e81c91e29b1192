//! Split calculator: turns an expense total and a split rule into per-member owed amounts.

use std::collections::BTreeMap;

use tracing::debug;

use crate::Amount;
use crate::model::{MemberId, Split, SplitParams, SplitType};

/// Compute what each participant owes toward `amount`.
///
/// Participants are processed in the given order; for [`SplitType::Equal`] and
/// [`SplitType::Shares`] the rounding remainder lands on the first participant
/// (the first with a positive weight for shares), so callers must pass a
/// deterministic order. Never fails: no participants, or zero total shares,
/// yield an empty list. Checking that the result sums to `amount` is left to
/// the caller (see [`validate_expense`](crate::validate_expense)).
pub fn compute_splits(
    amount: Amount,
    split_type: SplitType,
    participants: &[MemberId],
    params: &BTreeMap<MemberId, SplitParams>,
) -> Vec<Split> {
    if participants.is_empty() {
        return Vec::new();
    }

    let param = |member: &MemberId| params.get(member).copied().unwrap_or_default();

    match split_type {
        SplitType::Equal => equal(amount, participants),
        SplitType::Unequal => participants
            .iter()
            .map(|member| Split::new(member.clone(), param(member).amount.unwrap_or_default()))
            .collect(),
        SplitType::Shares => {
            let weights: Vec<Amount> = participants
                .iter()
                .map(|member| param(member).shares.unwrap_or(Amount::from_units(1)))
                .collect();
            let total_shares: Amount = weights.iter().sum();
            if total_shares <= Amount::ZERO {
                debug!(amount = %amount, "zero total shares, no splits computed");
                return Vec::new();
            }
            let mut splits: Vec<Split> = participants
                .iter()
                .zip(weights)
                .map(|(member, shares)| Split {
                    member: member.clone(),
                    amount: amount.scale_to_cents(shares, total_shares),
                    shares: Some(shares),
                    percentage: None,
                })
                .collect();

            // rounding residual goes to the first weighted participant
            let remainder = amount - splits.iter().map(|split| split.amount).sum::<Amount>();
            if let Some(first) = splits
                .iter_mut()
                .find(|split| split.shares.is_some_and(|shares| shares > Amount::ZERO))
            {
                first.amount += remainder;
            }
            splits
        }
        SplitType::Percentage => participants
            .iter()
            .map(|member| {
                let percentage = param(member).percentage.unwrap_or_default();
                Split {
                    member: member.clone(),
                    amount: amount.scale_to_cents(percentage, Amount::from_units(100)),
                    shares: None,
                    percentage: Some(percentage),
                }
            })
            .collect(),
    }
}

/// Equal shares rounded to cents, remainder assigned to the first participant.
fn equal(amount: Amount, participants: &[MemberId]) -> Vec<Split> {
    let count = Amount::from_units(participants.len() as i64);
    let share = amount.scale_to_cents(Amount::from_units(1), count);
    let remainder = amount - participants.iter().map(|_| share).sum::<Amount>();

    participants
        .iter()
        .enumerate()
        .map(|(idx, member)| {
            let owed = if idx == 0 { share + remainder } else { share };
            Split::new(member.clone(), owed)
        })
        .collect()
}
