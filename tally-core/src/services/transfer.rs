//! Transfer service - recording money moved between members

use std::sync::Arc;

use tracing::info;

use crate::domain::money::{format_cents, MAX_AMOUNT_CENTS};
use crate::domain::result::{Error, Result};
use crate::domain::{GroupId, PersonId, Transfer};
use crate::ports::Repository;

/// Transfer service for recording and listing group transfers
pub struct TransferService {
    repository: Arc<dyn Repository>,
}

impl TransferService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Record that `sender_id` handed `amount_cents` to `receiver_id`
    ///
    /// Both sides must be current members of the group.
    pub async fn record_transfer(
        &self,
        group_id: GroupId,
        sender_id: PersonId,
        receiver_id: PersonId,
        amount_cents: i64,
    ) -> Result<Transfer> {
        if amount_cents < 0 {
            return Err(Error::validation("Transfer amount must not be negative"));
        }
        if amount_cents > MAX_AMOUNT_CENTS {
            return Err(Error::validation(format!(
                "Transfer amount must not exceed {}",
                format_cents(MAX_AMOUNT_CENTS)
            )));
        }
        if sender_id == receiver_id {
            return Err(Error::validation("Sender and receiver must be different people"));
        }
        if self.repository.get_group_by_id(group_id).await?.is_none() {
            return Err(Error::not_found(format!("Group {}", group_id)));
        }

        let (sender_in, receiver_in) = tokio::try_join!(
            self.repository.is_person_in_group(group_id, sender_id),
            self.repository.is_person_in_group(group_id, receiver_id),
        )?;
        if !sender_in {
            return Err(Error::not_a_member(sender_id, group_id));
        }
        if !receiver_in {
            return Err(Error::not_a_member(receiver_id, group_id));
        }

        let transfer = self
            .repository
            .create_transfer(&Transfer::new(group_id, sender_id, receiver_id, amount_cents))
            .await?;
        info!(
            transfer_id = transfer.id,
            group_id,
            sender_id,
            receiver_id,
            amount_cents,
            "transfer recorded"
        );
        Ok(transfer)
    }

    pub async fn list_for_group(&self, group_id: GroupId) -> Result<Vec<Transfer>> {
        if self.repository.get_group_by_id(group_id).await?.is_none() {
            return Err(Error::not_found(format!("Group {}", group_id)));
        }
        self.repository.get_transfers_by_group(group_id).await
    }
}
