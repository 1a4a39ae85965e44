//! Transfer command - record money the acting person handed to another member

use anyhow::Result;
use clap::Subcommand;

use tally_core::domain::money::parse_cents;
use tally_core::{GroupId, PersonId};

use super::{acting_person, get_context, load_names};
use crate::output;

#[derive(Subcommand)]
pub enum TransferCommands {
    /// Record a transfer from the acting person to another member
    Add {
        /// Group ID
        group: GroupId,
        /// Receiving person ID
        receiver: PersonId,
        /// Amount, e.g. 12.50 or 12,50
        amount: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the transfers of a group
    List {
        /// Group ID
        group: GroupId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: TransferCommands, acting: Option<PersonId>) -> Result<()> {
    match command {
        TransferCommands::Add { group, receiver, amount, json } => {
            run_add(group, receiver, &amount, acting, json).await
        }
        TransferCommands::List { group, json } => run_list(group, json).await,
    }
}

async fn run_add(
    group_id: GroupId,
    receiver: PersonId,
    amount: &str,
    acting: Option<PersonId>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let sender = acting_person(&ctx, acting)?;

    let result = match parse_cents(amount) {
        Ok(cents) => {
            ctx.transfer_service
                .record_transfer(group_id, sender, receiver, cents)
                .await
        }
        Err(e) => Err(e),
    };

    if json {
        return output::print_json(result);
    }

    let transfer = result?;
    let names = load_names(&ctx).await?;
    output::success(&format!(
        "Recorded transfer #{}: {} to {}, {}",
        transfer.id,
        names.label(transfer.sender_id),
        names.label(transfer.receiver_id),
        output::money(transfer.amount_cents, &ctx.config.currency)
    ));
    Ok(())
}

async fn run_list(group_id: GroupId, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.transfer_service.list_for_group(group_id).await;

    if json {
        return output::print_json(result);
    }

    let transfers = result?;
    if transfers.is_empty() {
        output::info("No transfers recorded in this group");
        return Ok(());
    }

    let names = load_names(&ctx).await?;
    let mut table = output::create_table();
    table.set_header(vec!["ID", "Date", "From", "To", "Amount"]);
    for transfer in &transfers {
        table.add_row(vec![
            transfer.id.to_string(),
            transfer.created_at.format("%Y-%m-%d %H:%M").to_string(),
            names.label(transfer.sender_id),
            names.label(transfer.receiver_id),
            output::money(transfer.amount_cents, &ctx.config.currency),
        ]);
    }
    println!("{}", table);
    Ok(())
}
