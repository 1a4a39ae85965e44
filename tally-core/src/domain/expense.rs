//! Expense domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ExpenseId, GroupId, PersonId};

/// Money a member spent on behalf of the whole group
///
/// Amounts are integer cents and never negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub payer_id: PersonId,
    pub amount_cents: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Build an expense that has not been persisted yet (id 0)
    pub fn new(group_id: GroupId, payer_id: PersonId, amount_cents: i64) -> Self {
        Self {
            id: 0,
            group_id,
            payer_id,
            amount_cents,
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
