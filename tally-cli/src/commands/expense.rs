//! Expense command - record and list what members spent for the group

use anyhow::Result;
use clap::Subcommand;

use tally_core::domain::money::parse_cents;
use tally_core::{GroupId, PersonId};

use super::{acting_person, get_context, load_names};
use crate::output;

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense paid by the acting person
    Add {
        /// Group ID
        group: GroupId,
        /// Amount, e.g. 12.50 or 12,50
        amount: String,
        /// What the money was spent on
        #[arg(long, short)]
        description: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the expenses of a group
    List {
        /// Group ID
        group: GroupId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: ExpenseCommands, acting: Option<PersonId>) -> Result<()> {
    match command {
        ExpenseCommands::Add { group, amount, description, json } => {
            run_add(group, &amount, description.as_deref(), acting, json).await
        }
        ExpenseCommands::List { group, json } => run_list(group, json).await,
    }
}

async fn run_add(
    group_id: GroupId,
    amount: &str,
    description: Option<&str>,
    acting: Option<PersonId>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let payer = acting_person(&ctx, acting)?;

    let result = match parse_cents(amount) {
        Ok(cents) => {
            ctx.expense_service
                .record_expense(group_id, payer, cents, description)
                .await
        }
        Err(e) => Err(e),
    };

    if json {
        return output::print_json(result);
    }

    let expense = result?;
    output::success(&format!(
        "Recorded expense #{} of {} in group {}",
        expense.id,
        output::money(expense.amount_cents, &ctx.config.currency),
        expense.group_id
    ));
    Ok(())
}

async fn run_list(group_id: GroupId, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.expense_service.list_for_group(group_id).await;

    if json {
        return output::print_json(result);
    }

    let expenses = result?;
    if expenses.is_empty() {
        output::info("No expenses recorded in this group");
        return Ok(());
    }

    let names = load_names(&ctx).await?;
    let currency = &ctx.config.currency;
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Date", "Paid by", "Amount", "Description"]);
    for expense in &expenses {
        table.add_row(vec![
            expense.id.to_string(),
            expense.created_at.format("%Y-%m-%d %H:%M").to_string(),
            names.label(expense.payer_id),
            output::money(expense.amount_cents, currency),
            expense.description.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);

    let total: i64 = expenses.iter().map(|e| e.amount_cents).sum();
    println!("Total: {}", output::money(total, currency));
    Ok(())
}
