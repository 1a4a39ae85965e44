//! Settlement planning
//!
//! Turns a balance into a list of payments that brings every member back to
//! zero. The matching is greedy: the smallest outstanding debt is always paid
//! to the smallest outstanding credit first. This keeps the plan short in
//! practice but does not guarantee the minimum number of payments.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{Balance, PersonId};

/// A payment proposed to even out a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransfer {
    pub amount_cents: i64,
    pub sender_id: PersonId,
    pub receiver_id: PersonId,
}

/// Outstanding amount for one side of the matching, always positive
#[derive(Debug, Clone, Copy)]
struct Position {
    person_id: PersonId,
    remaining: i64,
}

/// Plan the payments that settle `balance`
///
/// Members at exactly 0 take no part. Debtors and creditors are each sorted
/// by ascending amount (stable, so ties keep ascending member id order), then
/// the head of both lists is matched repeatedly for `min(debt, credit)` until
/// one of the lists runs out.
///
/// If the balance does not sum to 0 (the truncated average leaves a few
/// cents), one side ends with a remainder nobody can match. That remainder
/// is dropped from the plan.
pub fn plan_settlement(balance: &Balance) -> Vec<SettlementTransfer> {
    let mut debtors = Vec::new();
    let mut creditors = Vec::new();
    for (person_id, cents) in balance.iter() {
        if cents < 0 {
            debtors.push(Position { person_id, remaining: -cents });
        } else if cents > 0 {
            creditors.push(Position { person_id, remaining: cents });
        }
    }

    debtors.sort_by_key(|p| p.remaining);
    creditors.sort_by_key(|p| p.remaining);

    let mut transfers = Vec::with_capacity(debtors.len() + creditors.len());
    let (mut d, mut c) = (0, 0);
    while d < debtors.len() && c < creditors.len() {
        let debtor = &mut debtors[d];
        let creditor = &mut creditors[c];
        let amount = debtor.remaining.min(creditor.remaining);

        transfers.push(SettlementTransfer {
            amount_cents: amount,
            sender_id: debtor.person_id,
            receiver_id: creditor.person_id,
        });

        debtor.remaining -= amount;
        creditor.remaining -= amount;
        if debtor.remaining == 0 {
            d += 1;
        }
        if creditor.remaining == 0 {
            c += 1;
        }
    }

    let unmatched: i64 = debtors[d..].iter().chain(&creditors[c..]).map(|p| p.remaining).sum();
    if unmatched != 0 {
        warn!(
            unmatched_cents = unmatched,
            unpaid_debtors = debtors.len() - d,
            unpaid_creditors = creditors.len() - c,
            "balance does not sum to zero, dropping remainder from settlement plan"
        );
    }

    transfers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(entries: &[(PersonId, i64)]) -> Balance {
        entries.iter().copied().collect()
    }

    fn settle(mut balance: Balance, plan: &[SettlementTransfer]) -> Balance {
        for t in plan {
            // paying a debt raises the sender and lowers the receiver
            balance.apply_transfer(t.receiver_id, t.sender_id, t.amount_cents).unwrap();
        }
        balance
    }

    #[test]
    fn test_smallest_debt_first() {
        let plan = plan_settlement(&balance(&[(1, 308), (2, -142), (3, 163), (4, -329)]));

        assert_eq!(
            plan,
            vec![
                SettlementTransfer { amount_cents: 142, sender_id: 2, receiver_id: 3 },
                SettlementTransfer { amount_cents: 21, sender_id: 4, receiver_id: 3 },
                SettlementTransfer { amount_cents: 308, sender_id: 4, receiver_id: 1 },
            ]
        );
    }

    #[test]
    fn test_plan_settles_every_member() {
        let initial = balance(&[(1, 571), (2, 4508), (3, -1269), (4, -3810)]);
        let plan = plan_settlement(&initial);

        assert!(settle(initial, &plan).is_settled());
    }

    #[test]
    fn test_settled_balance_needs_no_payments() {
        assert!(plan_settlement(&balance(&[(1, 0), (2, 0)])).is_empty());
        assert!(plan_settlement(&Balance::new()).is_empty());
    }

    #[test]
    fn test_zero_members_are_left_out() {
        let plan = plan_settlement(&balance(&[(1, 50), (2, 0), (3, -50)]));

        assert_eq!(
            plan,
            vec![SettlementTransfer { amount_cents: 50, sender_id: 3, receiver_id: 1 }]
        );
    }

    #[test]
    fn test_equal_debt_and_credit_close_together() {
        let plan = plan_settlement(&balance(&[(1, 100), (2, -100), (3, 200), (4, -200)]));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0], SettlementTransfer { amount_cents: 100, sender_id: 2, receiver_id: 1 });
        assert_eq!(plan[1], SettlementTransfer { amount_cents: 200, sender_id: 4, receiver_id: 3 });
    }

    #[test]
    fn test_ties_keep_member_order() {
        let plan = plan_settlement(&balance(&[(5, -10), (2, -10), (9, 20)]));

        assert_eq!(plan[0].sender_id, 2);
        assert_eq!(plan[1].sender_id, 5);
    }

    #[test]
    fn test_surplus_credit_is_dropped() {
        // 7617 / 6 leaves 3 extra cents on the credit side
        let plan = plan_settlement(&balance(&[(1, 571), (2, 4508), (3, -1269), (4, -3807)]));

        let paid: i64 = plan.iter().map(|t| t.amount_cents).sum();
        assert_eq!(paid, 1269 + 3807);
        assert!(plan.iter().all(|t| t.amount_cents > 0));
    }

    #[test]
    fn test_surplus_debt_is_dropped() {
        let plan = plan_settlement(&balance(&[(1, -10), (2, -15), (3, 20)]));

        assert_eq!(
            plan,
            vec![
                SettlementTransfer { amount_cents: 10, sender_id: 1, receiver_id: 3 },
                SettlementTransfer { amount_cents: 10, sender_id: 2, receiver_id: 3 },
            ]
        );
    }

    #[test]
    fn test_only_debtors() {
        assert!(plan_settlement(&balance(&[(1, -5), (2, -7)])).is_empty());
    }
}
