//! Output formatting utilities

use std::collections::HashMap;

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use serde::Serialize;

use tally_core::domain::money::format_cents;
use tally_core::{OperationResult, Person, PersonId};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print `result` wrapped in an [`OperationResult`] envelope
///
/// Failures are still returned so the process exits non-zero.
pub fn print_json<T: Serialize>(result: tally_core::Result<T>) -> anyhow::Result<()> {
    match result {
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
            Ok(())
        }
        Err(e) => {
            let envelope = OperationResult::<T>::fail(e.to_string());
            println!("{}", serde_json::to_string_pretty(&envelope)?);
            Err(e.into())
        }
    }
}

/// `12.50 EUR`
pub fn money(cents: i64, currency: &str) -> String {
    format!("{} {}", format_cents(cents), currency)
}

/// Signed amount coloured by direction: green is owed, red owes
pub fn signed_money(cents: i64, currency: &str) -> String {
    let text = money(cents, currency);
    match cents.signum() {
        1 => format!("+{}", text).green().to_string(),
        -1 => text.red().to_string(),
        _ => text,
    }
}

/// Display names keyed by person id
pub struct Names(HashMap<PersonId, String>);

impl Names {
    pub fn new(persons: Vec<Person>) -> Self {
        Self(persons.into_iter().map(|p| (p.id, p.name)).collect())
    }

    /// `Ada (#3)`, or just `#3` for ids with no record
    pub fn label(&self, id: PersonId) -> String {
        match self.0.get(&id) {
            Some(name) => format!("{} (#{})", name, id),
            None => format!("#{}", id),
        }
    }
}
