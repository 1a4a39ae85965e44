//! CLI command implementations

pub mod balance;
pub mod expense;
pub mod group;
pub mod person;
pub mod settle;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tally_core::{PersonId, TallyContext};

use crate::output::Names;

/// Get the tally directory from environment or default
pub fn get_tally_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TALLY_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".tally"))
        .context("Could not find home directory, set TALLY_DIR")
}

/// Get or create tally context
pub fn get_context() -> Result<TallyContext> {
    let tally_dir = get_tally_dir()?;

    std::fs::create_dir_all(&tally_dir)
        .with_context(|| format!("Failed to create tally directory: {:?}", tally_dir))?;

    TallyContext::new(&tally_dir).context("Failed to initialize tally context")
}

/// Person the command acts as
///
/// Priority: `--as` flag > TALLY_PERSON > active person from settings (the
/// last two are resolved by [`tally_core::config::Config`]).
pub fn acting_person(ctx: &TallyContext, flag: Option<PersonId>) -> Result<PersonId> {
    flag.or(ctx.config.active_person).context(
        "No acting person. Pass --as <ID>, set TALLY_PERSON, or run `tally person use <ID>`",
    )
}

/// Names of everyone registered, for labelling balances and records
pub async fn load_names(ctx: &TallyContext) -> Result<Names> {
    Ok(Names::new(ctx.person_service.list().await?))
}
