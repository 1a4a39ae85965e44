//! Repository port - storage abstraction

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{Expense, Group, GroupId, Person, PersonId, Transfer};

/// Storage abstraction for people, groups and their records
///
/// Implementations (adapters) own id assignment and timestamps. Reads never
/// filter by membership; membership rules live in the services.
#[async_trait]
pub trait Repository: Send + Sync {
    // === Persons ===

    /// Persist a new person and return it with its assigned id
    async fn create_person(&self, name: &str, email: &str) -> Result<Person>;

    async fn get_person_by_id(&self, id: PersonId) -> Result<Option<Person>>;

    async fn get_person_by_email(&self, email: &str) -> Result<Option<Person>>;

    /// All persons, ordered by id
    async fn get_persons(&self) -> Result<Vec<Person>>;

    // === Groups ===

    /// Persist a new group with its owner as first member
    async fn create_group(
        &self,
        name: &str,
        owner_id: PersonId,
        invitation_code: &str,
    ) -> Result<Group>;

    /// Get a group with its current member ids
    async fn get_group_by_id(&self, id: GroupId) -> Result<Option<Group>>;

    /// Groups a person belongs to, ordered by id
    async fn get_groups_by_member(&self, person_id: PersonId) -> Result<Vec<Group>>;

    async fn add_person_to_group(&self, group_id: GroupId, person_id: PersonId) -> Result<()>;

    /// Member ids of a group, ordered by id
    async fn get_group_member_ids(&self, group_id: GroupId) -> Result<Vec<PersonId>>;

    async fn is_person_in_group(&self, group_id: GroupId, person_id: PersonId) -> Result<bool>;

    // === Expenses ===

    /// Persist an expense and return it with its assigned id
    async fn create_expense(&self, expense: &Expense) -> Result<Expense>;

    /// Expenses of a group in recording order
    async fn get_expenses_by_group(&self, group_id: GroupId) -> Result<Vec<Expense>>;

    // === Transfers ===

    /// Persist a transfer and return it with its assigned id
    async fn create_transfer(&self, transfer: &Transfer) -> Result<Transfer>;

    /// Transfers of a group in recording order
    async fn get_transfers_by_group(&self, group_id: GroupId) -> Result<Vec<Transfer>>;
}
