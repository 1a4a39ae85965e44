//! Transfer domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, PersonId, TransferId};

/// Money already handed from one member to another, outside any split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub group_id: GroupId,
    pub sender_id: PersonId,
    pub receiver_id: PersonId,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl Transfer {
    /// Build a transfer that has not been persisted yet (id 0)
    pub fn new(group_id: GroupId, sender_id: PersonId, receiver_id: PersonId, amount_cents: i64) -> Self {
        Self {
            id: 0,
            group_id,
            sender_id,
            receiver_id,
            amount_cents,
            created_at: Utc::now(),
        }
    }
}
