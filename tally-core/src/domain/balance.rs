//! Group balance computation
//!
//! A balance tells, for every member, how far they are from an even split:
//! positive means the group owes them money, negative means they owe the
//! group. Everything is integer cents.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::result::{Error, Result};
use super::{Expense, PersonId, Transfer};

/// Net position of each member of a group, in cents
///
/// Serializes as a JSON object keyed by member id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balance(BTreeMap<PersonId, i64>);

impl Balance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of a member; people absent from the mapping are at 0
    pub fn get(&self, person_id: PersonId) -> i64 {
        self.0.get(&person_id).copied().unwrap_or(0)
    }

    pub fn set(&mut self, person_id: PersonId, cents: i64) {
        self.0.insert(person_id, cents);
    }

    /// Move `amount_cents` from `sender` to `receiver`
    ///
    /// The sender's balance goes down and the receiver's goes up, so the total
    /// is unchanged. Unknown ids are added to the mapping. Fails if a
    /// balance would leave the `i64` range.
    pub fn apply_transfer(
        &mut self,
        sender: PersonId,
        receiver: PersonId,
        amount_cents: i64,
    ) -> Result<()> {
        let sent = self.get(sender).checked_sub(amount_cents).ok_or_else(overflow)?;
        self.0.insert(sender, sent);
        let received = self.get(receiver).checked_add(amount_cents).ok_or_else(overflow)?;
        self.0.insert(receiver, received);
        Ok(())
    }

    /// Sum of all balances
    ///
    /// Zero for balances built from an evenly divisible expense total, off by
    /// the truncation remainder of the average otherwise.
    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    /// True when every member is at exactly 0
    pub fn is_settled(&self) -> bool {
        self.0.values().all(|&cents| cents == 0)
    }

    pub fn members(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.0.keys().copied()
    }

    /// Iterate `(member, cents)` pairs in ascending member id order
    pub fn iter(&self) -> impl Iterator<Item = (PersonId, i64)> + '_ {
        self.0.iter().map(|(&id, &cents)| (id, cents))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(PersonId, i64)> for Balance {
    fn from_iter<I: IntoIterator<Item = (PersonId, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Balance {
    type Item = (PersonId, i64);
    type IntoIter = btree_map::IntoIter<PersonId, i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn overflow() -> Error {
    Error::validation("Amounts exceed the supported range")
}

/// Compute the balance of a group
///
/// Every expense is split evenly: the average is taken over the number of
/// expense records (not the number of members) with truncating integer
/// division, and each member's balance starts at what they paid minus that
/// average. Transfers are then applied on top.
///
/// A group with no expenses has an average of 0, so only transfers move
/// balances away from 0. Payers or transfer participants that are not in
/// `members` are still reported, as extra entries.
///
/// Sums are checked; amounts large enough to overflow give a validation
/// error instead of a wrapped balance.
pub fn compute_balance(
    members: &[PersonId],
    expenses: &[Expense],
    transfers: &[Transfer],
) -> Result<Balance> {
    let mut paid_by: BTreeMap<PersonId, i64> = BTreeMap::new();
    let mut total = 0i64;
    for expense in expenses {
        total = total.checked_add(expense.amount_cents).ok_or_else(overflow)?;
        let paid = paid_by.entry(expense.payer_id).or_insert(0);
        *paid = paid.checked_add(expense.amount_cents).ok_or_else(overflow)?;
    }

    let average = if expenses.is_empty() {
        debug!("no expenses recorded, balances start at zero");
        0
    } else {
        total / expenses.len() as i64
    };

    let mut balance = Balance::new();
    for &member in members {
        let paid = paid_by.get(&member).copied().unwrap_or(0);
        balance.set(member, paid.checked_sub(average).ok_or_else(overflow)?);
    }

    // Former members who still have expenses on record
    for (&payer, &paid) in &paid_by {
        if !balance.0.contains_key(&payer) {
            debug!(payer, "expense payer is not a current member");
            balance.set(payer, paid.checked_sub(average).ok_or_else(overflow)?);
        }
    }

    for transfer in transfers {
        balance.apply_transfer(transfer.sender_id, transfer.receiver_id, transfer.amount_cents)?;
    }

    Ok(balance)
}
