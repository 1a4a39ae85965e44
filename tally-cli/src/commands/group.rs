//! Group command - create, join and inspect groups

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use tally_core::{GroupId, PersonId};

use super::{acting_person, get_context, load_names};
use crate::output;

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a group owned by the acting person
    New {
        /// Group name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Join a group with its invitation code
    Join {
        /// Group ID
        group: GroupId,
        /// Invitation code shared by a member
        #[arg(long)]
        code: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the groups the acting person belongs to
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show members and totals of a group
    Show {
        /// Group ID
        group: GroupId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: GroupCommands, acting: Option<PersonId>) -> Result<()> {
    match command {
        GroupCommands::New { name, json } => run_new(&name, acting, json).await,
        GroupCommands::Join { group, code, json } => run_join(group, &code, acting, json).await,
        GroupCommands::List { json } => run_list(acting, json).await,
        GroupCommands::Show { group, json } => run_show(group, json).await,
    }
}

async fn run_new(name: &str, acting: Option<PersonId>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let owner = acting_person(&ctx, acting)?;
    let result = ctx.group_service.create_group(name, owner).await;

    if json {
        return output::print_json(result);
    }

    let group = result?;
    output::success(&format!("Created group {} (#{})", group.name, group.id));
    println!("  Invitation code: {}", group.invitation_code.bold());
    println!(
        "  Others join with: tally group join {} --code {}",
        group.id, group.invitation_code
    );
    Ok(())
}

async fn run_join(group_id: GroupId, code: &str, acting: Option<PersonId>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let person = acting_person(&ctx, acting)?;
    let result = ctx.group_service.join_group(group_id, person, code).await;

    if json {
        return output::print_json(result);
    }

    let group = result?;
    output::success(&format!(
        "Joined {} (#{}), {} members",
        group.name,
        group.id,
        group.member_ids.len()
    ));
    Ok(())
}

async fn run_list(acting: Option<PersonId>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let person = acting_person(&ctx, acting)?;
    let result = ctx.group_service.list_groups_for(person).await;

    if json {
        return output::print_json(result);
    }

    let groups = result?;
    if groups.is_empty() {
        output::info("Not a member of any group yet");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Members", "Code", "Created"]);
    for group in &groups {
        table.add_row(vec![
            group.id.to_string(),
            group.name.clone(),
            group.member_ids.len().to_string(),
            group.invitation_code.clone(),
            group.created_at.format("%Y-%m-%d").to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

async fn run_show(group_id: GroupId, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.group_service.get_summary(group_id).await;

    if json {
        return output::print_json(result);
    }

    let summary = result?;
    let names = load_names(&ctx).await?;
    let group = &summary.group;

    println!("{}", group.name.bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Owner".to_string(), names.label(group.owner_id)]);
    table.add_row(vec!["Invitation code".to_string(), group.invitation_code.clone()]);
    table.add_row(vec!["Expenses".to_string(), summary.expense_count.to_string()]);
    table.add_row(vec!["Transfers".to_string(), summary.transfer_count.to_string()]);
    table.add_row(vec![
        "Total spent".to_string(),
        output::money(summary.total_spent_cents, &ctx.config.currency),
    ]);
    println!("{}", table);
    println!();

    println!("{}", "Members".bold());
    for member in &group.member_ids {
        println!("  • {}", names.label(*member));
    }
    Ok(())
}
