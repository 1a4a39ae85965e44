//! Group service - membership, balance and settlement
//!
//! This is where stored records meet the pure computations in
//! [`crate::domain::balance`] and [`crate::domain::settlement`]: the service
//! loads a group's members, expenses and transfers, then hands them over.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::result::{Error, Result};
use crate::domain::{
    compute_balance, invitation_code, plan_settlement, Balance, Group, GroupId, PersonId,
    SettlementTransfer,
};
use crate::ports::Repository;

/// Group service for membership and balance queries
pub struct GroupService {
    repository: Arc<dyn Repository>,
}

/// Everything recorded in a group, for display
#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub group: Group,
    pub expense_count: usize,
    pub transfer_count: usize,
    pub total_spent_cents: i64,
}

impl GroupService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Create a group owned (and joined) by `owner_id`
    pub async fn create_group(&self, name: &str, owner_id: PersonId) -> Result<Group> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Group name must not be empty"));
        }
        if self.repository.get_person_by_id(owner_id).await?.is_none() {
            return Err(Error::not_found(format!("Person {}", owner_id)));
        }

        let code = invitation_code(name, owner_id);
        let group = self.repository.create_group(name, owner_id, &code).await?;
        info!(group_id = group.id, owner_id, "group created");
        Ok(group)
    }

    pub async fn get_group(&self, group_id: GroupId) -> Result<Group> {
        self.repository
            .get_group_by_id(group_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Group {}", group_id)))
    }

    /// Add `person_id` to a group, provided they know its invitation code
    pub async fn join_group(
        &self,
        group_id: GroupId,
        person_id: PersonId,
        code: &str,
    ) -> Result<Group> {
        let group = self.get_group(group_id).await?;

        if group.invitation_code != code.trim() {
            return Err(Error::Unauthorized(format!(
                "Wrong invitation code for group {}",
                group_id
            )));
        }
        if self.repository.get_person_by_id(person_id).await?.is_none() {
            return Err(Error::not_found(format!("Person {}", person_id)));
        }
        if group.is_member(person_id) {
            return Err(Error::validation(format!(
                "Person {} already belongs to group {}",
                person_id, group_id
            )));
        }

        self.repository.add_person_to_group(group_id, person_id).await?;
        info!(group_id, person_id, "person joined group");
        self.get_group(group_id).await
    }

    /// Groups `person_id` belongs to
    pub async fn list_groups_for(&self, person_id: PersonId) -> Result<Vec<Group>> {
        self.repository.get_groups_by_member(person_id).await
    }

    pub async fn get_summary(&self, group_id: GroupId) -> Result<GroupSummary> {
        let group = self.get_group(group_id).await?;
        let (expenses, transfers) = tokio::try_join!(
            self.repository.get_expenses_by_group(group_id),
            self.repository.get_transfers_by_group(group_id),
        )?;

        Ok(GroupSummary {
            group,
            expense_count: expenses.len(),
            transfer_count: transfers.len(),
            total_spent_cents: expenses.iter().map(|e| e.amount_cents).sum(),
        })
    }

    /// Current balance of every member of the group
    pub async fn get_group_balance(&self, group_id: GroupId) -> Result<Balance> {
        // Unknown groups would otherwise come back as an empty balance
        self.get_group(group_id).await?;

        let (members, expenses, transfers) = tokio::try_join!(
            self.repository.get_group_member_ids(group_id),
            self.repository.get_expenses_by_group(group_id),
            self.repository.get_transfers_by_group(group_id),
        )?;

        debug!(
            group_id,
            members = members.len(),
            expenses = expenses.len(),
            transfers = transfers.len(),
            "computing group balance"
        );
        compute_balance(&members, &expenses, &transfers)
    }

    /// Payments that would bring every member of the group back to zero
    pub async fn get_settlement_plan(&self, group_id: GroupId) -> Result<Vec<SettlementTransfer>> {
        let balance = self.get_group_balance(group_id).await?;
        let plan = plan_settlement(&balance);
        debug!(group_id, payments = plan.len(), "settlement planned");
        Ok(plan)
    }
}
