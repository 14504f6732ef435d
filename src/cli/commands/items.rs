use tracing::debug;

use crate::cli::advisory::Severity;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io::confirm_action;
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::ledger::{parse_amount, AcceptOverage, AddOutcome, ItemId, OverageNotice};

const FORCE_FLAG: &str = "--force";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "budget",
            "Set the shopping budget",
            "budget <amount>",
            cmd_budget,
        ),
        CommandEntry::new(
            "add",
            "Add an item to the list",
            "add <name> <price> [--force]",
            cmd_add,
        ),
        CommandEntry::new(
            "remove",
            "Remove an item by id or by #row",
            "remove <id|#row>",
            cmd_remove,
        ),
        CommandEntry::new("list", "Show items and spending", "list", cmd_list),
        CommandEntry::new(
            "status",
            "Show the spending summary and recent notices",
            "status",
            cmd_status,
        ),
        CommandEntry::new(
            "reset",
            "Discard the budget and every item",
            "reset",
            cmd_reset,
        ),
    ]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(CommandError::usage("budget <amount>"));
    }
    let amount = parse_amount(&args.concat())?;
    context.session.set_budget(amount)?;
    let message = format!("Budget set to {:.2} {}.", amount, context.config.currency);
    context.show_advisory(message, Severity::Success);
    context.render_ledger();
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let force = args.iter().any(|arg| *arg == FORCE_FLAG);
    let positional: Vec<&str> = args
        .iter()
        .copied()
        .filter(|arg| *arg != FORCE_FLAG)
        .collect();
    let Some((price, name)) = positional.split_last() else {
        return Err(CommandError::usage("add <name> <price> [--force]"));
    };
    if name.is_empty() {
        return Err(CommandError::usage("add <name> <price> [--force]"));
    }
    let name = name.join(" ");
    let price = parse_amount(price)?;

    let outcome = if force {
        context.session.add_item(&name, price, &mut AcceptOverage)?
    } else {
        let mode = context.mode();
        let currency = context.config.currency.clone();
        let theme = &context.theme;
        let mut ask = |notice: &OverageNotice| {
            let prompt = format!(
                "This purchase goes over your budget. Continue?\n  Budget: {:.2} {cur}\n  Total after adding: {:.2} {cur}",
                notice.budget,
                notice.projected_total,
                cur = currency
            );
            confirm_action(mode, theme, &prompt, false).unwrap_or_else(|err| {
                debug!(error = %err, "overage prompt failed; declining");
                false
            })
        };
        context.session.add_item(&name, price, &mut ask)?
    };

    match outcome {
        AddOutcome::Added { id, over_budget } => {
            output::success(format!("Added `{}` ({}).", name.trim(), id));
            if over_budget {
                debug!(%id, "item added past the budget");
            }
            context.render_ledger();
        }
        AddOutcome::Declined => {
            output::info("Item not added.");
            if !context.session.has_budget() {
                output::hint("Set a budget first with `budget <amount>`.");
            } else {
                output::hint("Use `add <name> <price> --force` to go over budget.");
            }
        }
    }
    Ok(())
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [target] = args else {
        return Err(CommandError::usage("remove <id|#row>"));
    };
    let Some(id) = resolve_item(context, target)? else {
        output::warning(format!("No item matches `{}`.", target));
        return Ok(());
    };
    match context.session.remove_item(id)? {
        Some(item) => {
            output::success(format!("Removed `{}`.", item.name()));
            context.render_ledger();
        }
        None => output::warning(format!("No item with id {}.", id)),
    }
    Ok(())
}

/// `#3` picks the third listed row; anything else is read as an item id.
fn resolve_item(context: &ShellContext, target: &str) -> Result<Option<ItemId>, CommandError> {
    if let Some(row) = target.strip_prefix('#') {
        let row: usize = row.parse().map_err(|_| {
            CommandError::InvalidArguments(format!("`{}` is not a row number", target))
        })?;
        let items = context.ledger().items();
        return Ok(row
            .checked_sub(1)
            .and_then(|idx| items.get(idx))
            .map(|item| item.id()));
    }
    let id: ItemId = target.parse().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not an item id; try `#<row>`", target))
    })?;
    Ok(Some(id))
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Shopping list");
    context.render_ledger();
    Ok(())
}

fn cmd_status(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Status");
    let style = crate::cli::ui::UiStyle::detect();
    for line in crate::cli::render::summary_lines(context.ledger(), &context.config, &style) {
        output::plain(line);
    }
    let notices = context.active_advisories();
    if !notices.is_empty() {
        output::section("Recent notices");
        for (severity, message) in notices {
            output::plain(format!("  [{:?}] {}", severity, message));
        }
    }
    Ok(())
}

fn cmd_reset(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if !context.confirm("Discard the budget and all items?", false)? {
        output::info("Nothing changed.");
        return Ok(());
    }
    context.session.reset()?;
    context.show_advisory("Shopping list cleared.", Severity::Success);
    Ok(())
}
