//! Settle command - payments that bring a group back to even

use anyhow::Result;
use colored::Colorize;

use tally_core::GroupId;

use super::{get_context, load_names};
use crate::output;

pub async fn run(group_id: GroupId, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.group_service.get_settlement_plan(group_id).await;

    if json {
        return output::print_json(result);
    }

    let plan = result?;
    if plan.is_empty() {
        output::success("Nothing to settle, everyone is even");
        return Ok(());
    }

    let names = load_names(&ctx).await?;
    let currency = &ctx.config.currency;

    println!("{}", format!("Settling group {}", group_id).bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["From", "To", "Amount"]);
    for payment in &plan {
        table.add_row(vec![
            names.label(payment.sender_id),
            names.label(payment.receiver_id),
            output::money(payment.amount_cents, currency),
        ]);
    }
    println!("{}", table);
    Ok(())
}
