//! Expense service - recording group spending

use std::sync::Arc;

use tracing::info;

use crate::domain::money::{format_cents, MAX_AMOUNT_CENTS};
use crate::domain::result::{Error, Result};
use crate::domain::{Expense, GroupId, PersonId};
use crate::ports::Repository;

/// Expense service for recording and listing group expenses
pub struct ExpenseService {
    repository: Arc<dyn Repository>,
}

impl ExpenseService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Record an expense paid by `payer_id` for the whole group
    ///
    /// Only current members may record expenses against a group.
    pub async fn record_expense(
        &self,
        group_id: GroupId,
        payer_id: PersonId,
        amount_cents: i64,
        description: Option<&str>,
    ) -> Result<Expense> {
        if amount_cents < 0 {
            return Err(Error::validation("Expense amount must not be negative"));
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(Error::validation(format!(
                "Expense amount must not exceed {}",
                format_cents(MAX_AMOUNT_CENTS)
            )));
        }
        if self.repository.get_group_by_id(group_id).await?.is_none() {
            return Err(Error::not_found(format!("Group {}", group_id)));
        }
        if !self.repository.is_person_in_group(group_id, payer_id).await? {
            return Err(Error::not_a_member(payer_id, group_id));
        }

        let mut expense = Expense::new(group_id, payer_id, amount_cents);
        if let Some(text) = description.map(str::trim).filter(|d| !d.is_empty()) {
            expense = expense.with_description(text);
        }

        let expense = self.repository.create_expense(&expense).await?;
        info!(
            expense_id = expense.id,
            group_id,
            payer_id,
            amount_cents,
            "expense recorded"
        );
        Ok(expense)
    }

    pub async fn list_for_group(&self, group_id: GroupId) -> Result<Vec<Expense>> {
        if self.repository.get_group_by_id(group_id).await?.is_none() {
            return Err(Error::not_found(format!("Group {}", group_id)));
        }
        self.repository.get_expenses_by_group(group_id).await
    }
}
