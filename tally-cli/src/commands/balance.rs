//! Balance command - how far each member is from an even split

use anyhow::Result;
use colored::Colorize;

use tally_core::GroupId;

use super::{get_context, load_names};
use crate::output;

pub async fn run(group_id: GroupId, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let result = ctx.group_service.get_group_balance(group_id).await;

    if json {
        return output::print_json(result);
    }

    let balance = result?;
    let names = load_names(&ctx).await?;
    let currency = &ctx.config.currency;

    println!("{}", format!("Balance of group {}", group_id).bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Member", "Balance"]);
    for (member, cents) in balance.iter() {
        table.add_row(vec![names.label(member), output::signed_money(cents, currency)]);
    }
    println!("{}", table);

    if balance.is_settled() {
        output::success("Everyone is even");
    } else if balance.total() != 0 {
        output::warning(&format!(
            "{} cannot be split evenly and stays unassigned",
            output::money(balance.total(), currency)
        ));
    }
    Ok(())
}
