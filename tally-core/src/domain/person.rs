//! Person domain model

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::PersonId;

/// A registered person who can own, join and spend in groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

impl Person {
    /// Normalize and validate registration input
    ///
    /// Returns the trimmed name and the lowercased email.
    pub fn validate(name: &str, email: &str) -> Result<(String, String)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Name must not be empty"));
        }

        let email = email.trim().to_lowercase();
        if !email_regex().is_match(&email) {
            return Err(Error::validation(format!("Invalid email address: {}", email)));
        }

        Ok((name.to_string(), email))
    }
}
