//! Person command - register people and pick who you act as

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use tally_core::PersonId;

use super::{acting_person, get_context};
use crate::output;

#[derive(Subcommand)]
pub enum PersonCommands {
    /// Register a new person
    Add {
        /// Display name
        name: String,
        /// Email address (must be unique)
        email: String,
        /// Also make the new person the active person
        #[arg(long = "use")]
        use_after: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List registered people
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remember a person as the one commands act as
    Use {
        /// Person ID
        id: PersonId,
    },

    /// Show the person commands currently act as
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: PersonCommands, acting: Option<PersonId>) -> Result<()> {
    match command {
        PersonCommands::Add { name, email, use_after, json } => {
            run_add(&name, &email, use_after, json).await
        }
        PersonCommands::List { json } => run_list(json).await,
        PersonCommands::Use { id } => run_use(id).await,
        PersonCommands::Whoami { json } => run_whoami(acting, json).await,
    }
}

async fn run_add(name: &str, email: &str, use_after: bool, json: bool) -> Result<()> {
    let mut ctx = get_context()?;
    let result = ctx.person_service.register(name, email).await;

    if let (Ok(person), true) = (&result, use_after) {
        ctx.config.set_active_person(person.id);
        ctx.save_config()?;
    }

    if json {
        return output::print_json(result);
    }

    let person = result?;
    output::success(&format!("Registered {} (#{})", person.name, person.id));
    if use_after {
        println!("  Now acting as {}", person.name.bold());
    }
    Ok(())
}

async fn run_list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.person_service.list().await;

    if json {
        return output::print_json(result);
    }

    let persons = result?;
    if persons.is_empty() {
        output::info("No people registered yet. Add one with `tally person add <NAME> <EMAIL>`");
        return Ok(());
    }

    let active = ctx.config.active_person;
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Email", "Since", ""]);
    for person in &persons {
        let marker = if active == Some(person.id) { "*" } else { "" };
        table.add_row(vec![
            person.id.to_string(),
            person.name.clone(),
            person.email.clone(),
            person.created_at.format("%Y-%m-%d").to_string(),
            marker.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

async fn run_use(id: PersonId) -> Result<()> {
    let mut ctx = get_context()?;
    let person = ctx.person_service.get(id).await?;

    ctx.config.set_active_person(person.id);
    ctx.save_config()?;

    output::success(&format!("Now acting as {} (#{})", person.name, person.id));
    Ok(())
}

async fn run_whoami(acting: Option<PersonId>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let id = acting_person(&ctx, acting)?;
    let result = ctx.person_service.get(id).await;

    if json {
        return output::print_json(result);
    }

    let person = result?;
    println!("{} (#{}) <{}>", person.name.bold(), person.id, person.email);
    Ok(())
}
