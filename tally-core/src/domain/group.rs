//! Group domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{GroupId, PersonId};

/// Length of the code a person must present to join a group
pub const INVITATION_CODE_LEN: usize = 6;

/// A set of people sharing expenses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub owner_id: PersonId,
    /// Current members, owner included
    pub member_ids: Vec<PersonId>,
    pub invitation_code: String,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn is_member(&self, person_id: PersonId) -> bool {
        self.member_ids.contains(&person_id)
    }
}

/// FNV-1a, 32 bit
fn fnv1a_32(data: &[u8]) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for &b in data {
        h ^= b as u32;
        h = h.wrapping_mul(0x0100_0193);
    }
    h
}

/// Derive the invitation code for a group
///
/// The code only depends on the group name and its owner, so it can be
/// recomputed at any time. Two groups with the same name and owner share a
/// code, which is fine since joining also requires the group id.
pub fn invitation_code(group_name: &str, owner_id: PersonId) -> String {
    let hash = fnv1a_32(format!("{} {}", group_name, owner_id).as_bytes());
    let mut code = format!("{:0>width$}", hash, width = INVITATION_CODE_LEN);
    code.truncate(INVITATION_CODE_LEN);
    code
}
