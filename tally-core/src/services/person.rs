//! Person service - registration and lookup

use std::sync::Arc;

use tracing::info;

use crate::domain::result::{Error, Result};
use crate::domain::{Person, PersonId};
use crate::ports::Repository;

/// Person service for registration and lookup
pub struct PersonService {
    repository: Arc<dyn Repository>,
}

impl PersonService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    /// Register a new person
    ///
    /// Emails are stored lowercased and must be unique.
    pub async fn register(&self, name: &str, email: &str) -> Result<Person> {
        let (name, email) = Person::validate(name, email)?;

        if self.repository.get_person_by_email(&email).await?.is_some() {
            return Err(Error::validation(format!("Email already registered: {}", email)));
        }

        let person = self.repository.create_person(&name, &email).await?;
        info!(person_id = person.id, "person registered");
        Ok(person)
    }

    pub async fn get(&self, id: PersonId) -> Result<Person> {
        self.repository
            .get_person_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Person {}", id)))
    }

    pub async fn list(&self) -> Result<Vec<Person>> {
        self.repository.get_persons().await
    }
}
