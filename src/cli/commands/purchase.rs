use std::fs;

use crate::cli::core::{short_id, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::domain::{Transaction, TransactionStatus, MAX_NAG_COUNT};
use crate::lifecycle::QuickAction;

use super::{parse_purchase, require_arg};

const LOG_USAGE: &str =
    "log <item> <amount> [category] [--returnable] [--return-by YYYY-MM-DD] [--why TEXT] [--feeling TEXT]";
const URGE_USAGE: &str = "urge <item> <amount> [category] [--returnable] [--why TEXT] [--feeling TEXT]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("log", "Log a purchase for judgement", LOG_USAGE, cmd_log),
        CommandEntry::new(
            "urge",
            "Log something you want but have not bought",
            URGE_USAGE,
            cmd_urge,
        ),
        CommandEntry::new(
            "scan",
            "Read a receipt file and optionally log it",
            "scan <path> [--log] [--returnable]",
            cmd_scan,
        ),
        CommandEntry::new("list", "List purchases, newest first", "list [status]", cmd_list)
            .with_choices(&["pending", "approved", "flagged", "returned", "kept", "urge"]),
        CommandEntry::new("show", "Show one purchase in detail", "show <#|id>", cmd_show),
        CommandEntry::new("return", "Mark a purchase as returned", "return <#|id>", cmd_return),
        CommandEntry::new("keep", "Mark a purchase as kept", "keep <#|id>", cmd_keep),
        CommandEntry::new("buy", "Buy an urge after all", "buy <#|id>", cmd_buy),
        CommandEntry::new(
            "toggle",
            "Flip a settled purchase between kept and returned",
            "toggle <#|id>",
            cmd_toggle,
        ),
    ]
}

fn cmd_log(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let draft = parse_purchase(args, LOG_USAGE)?;
    let txn = context.block_on(context.controller.submit_purchase(draft))?;
    report_outcome(context, &txn);
    Ok(())
}

fn cmd_urge(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let draft = parse_purchase(args, URGE_USAGE)?.urge();
    let txn = context.block_on(context.controller.submit_purchase(draft))?;
    report_outcome(context, &txn);
    Ok(())
}

fn cmd_scan(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = require_arg(args, 0, "scan <path> [--log] [--returnable]")?;
    let image = fs::read(path)?;
    let scan = context.block_on(context.controller.scan_receipt(&image))?;
    io::print_info(format!(
        "Receipt: {} {} [{}]",
        scan.item,
        context.format_amount(scan.amount),
        scan.category
    ));
    if !args.contains(&"--log") {
        return Ok(());
    }
    let mut draft = scan.into_draft();
    if args.contains(&"--returnable") {
        draft = draft.returnable(None);
    }
    let txn = context.block_on(context.controller.submit_purchase(draft))?;
    report_outcome(context, &txn);
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = args.first().map(|raw| parse_status(raw)).transpose()?;
    let transactions = context.block_on(context.controller.transactions());
    output_section("Purchases");
    let mut shown = 0;
    for (index, txn) in transactions.iter().enumerate() {
        if filter.map(|status| txn.status != status).unwrap_or(false) {
            continue;
        }
        io::print_info(format_row(context, index + 1, txn));
        shown += 1;
    }
    if shown == 0 {
        io::print_info("  (nothing to show)");
    } else if transactions.iter().all(|txn| txn.is_example) {
        io::print_info("These are examples; log a purchase to start your own history.");
    }
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let txn = context.resolve_transaction(require_arg(args, 0, "show <#|id>")?)?;
    output_section(format!("{} ({})", txn.item, short_id(txn.id)));
    io::print_info(format!("  Status     : {}", txn.status));
    io::print_info(format!("  Amount     : {}", context.format_amount(txn.amount)));
    io::print_info(format!("  Category   : {}", txn.category));
    io::print_info(format!("  Date       : {}", txn.date));
    io::print_info(format!(
        "  Returnable : {}",
        match (txn.is_returnable, txn.return_by) {
            (true, Some(by)) => format!("yes, by {}", by),
            (true, None) => "yes".to_string(),
            (false, _) => "no".to_string(),
        }
    ));
    io::print_info(format!("  Calls      : {}/{}", txn.nag_count, MAX_NAG_COUNT));
    if let Some(next) = txn.next_nag_at {
        io::print_info(format!("  Next call  : {}", next.format("%Y-%m-%d %H:%M UTC")));
    }
    for (label, value) in [
        ("Why", &txn.justification),
        ("Feeling", &txn.emotional_context),
        ("Verdict", &txn.reasoning),
        ("Hot take", &txn.hot_take),
    ] {
        if let Some(value) = value {
            io::print_info(format!("  {:<11}: {}", label, value));
        }
    }
    if let Some(error) = &txn.error {
        io::print_warning(error);
    }
    Ok(())
}

fn cmd_return(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    quick_action(context, args, QuickAction::Return, "return <#|id>")
}

fn cmd_keep(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    quick_action(context, args, QuickAction::Keep, "keep <#|id>")
}

fn cmd_buy(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    quick_action(context, args, QuickAction::Buy, "buy <#|id>")
}

fn quick_action(
    context: &mut ShellContext,
    args: &[&str],
    action: QuickAction,
    usage: &str,
) -> CommandResult {
    let target = context.resolve_transaction(require_arg(args, 0, usage)?)?;
    let txn = context.block_on(context.controller.quick_action(target.id, action))?;
    match action {
        QuickAction::Return => io::print_success(format!(
            "{} returned; {} back in your pocket.",
            txn.item,
            context.format_amount(txn.amount)
        )),
        QuickAction::Keep => io::print_info(format!("{} kept.", txn.item)),
        QuickAction::Buy => report_outcome(context, &txn),
    }
    Ok(())
}

fn cmd_toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = context.resolve_transaction(require_arg(args, 0, "toggle <#|id>")?)?;
    let txn = context.block_on(context.controller.toggle_status(target.id))?;
    io::print_success(format!("{} is now {}.", txn.item, txn.status));
    Ok(())
}

fn report_outcome(context: &ShellContext, txn: &Transaction) {
    let amount = context.format_amount(txn.amount);
    match txn.status {
        TransactionStatus::Kept => io::print_warning(format!(
            "{} ({}) is fast food you cannot return. Kept with full shame.",
            txn.item, amount
        )),
        TransactionStatus::Approved => {
            io::print_success(format!("{} ({}) approved.", txn.item, amount));
            if let Some(reasoning) = &txn.reasoning {
                io::print_info(format!("  {}", reasoning));
            }
        }
        TransactionStatus::Pending => io::print_warning(format!(
            "{} ({}) looks unnecessary. Your phone is ringing.",
            txn.item, amount
        )),
        TransactionStatus::Flagged => io::print_warning(format!(
            "{} ({}) flagged. {}",
            txn.item,
            amount,
            txn.error.as_deref().unwrap_or("")
        )),
        TransactionStatus::Urge => {
            io::print_info(format!("Urge logged: {} ({}).", txn.item, amount));
            if let Some(take) = &txn.hot_take {
                io::print_info(format!("  Hot take: {}", take));
            }
            if let Some(error) = &txn.error {
                io::print_warning(error);
            }
        }
        TransactionStatus::Returned => {
            io::print_success(format!("{} ({}) returned.", txn.item, amount))
        }
    }
}

fn format_row(context: &ShellContext, number: usize, txn: &Transaction) -> String {
    let mut row = format!(
        "{:>3}. {:<9} {:<28} {:>10}  {:<13} {}  #{}",
        number,
        txn.status.label(),
        truncate(&txn.item, 28),
        context.format_amount(txn.amount),
        txn.category.label(),
        txn.date,
        short_id(txn.id)
    );
    if txn.nag_count > 0 {
        row.push_str(&format!("  calls {}/{}", txn.nag_count, MAX_NAG_COUNT));
    }
    if txn.is_example {
        row.push_str("  (example)");
    }
    if txn.error.is_some() {
        row.push_str("  !");
    }
    row
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

fn parse_status(raw: &str) -> Result<TransactionStatus, CommandError> {
    let wanted = raw.trim().to_ascii_lowercase();
    [
        TransactionStatus::Pending,
        TransactionStatus::Approved,
        TransactionStatus::Flagged,
        TransactionStatus::Returned,
        TransactionStatus::Kept,
        TransactionStatus::Urge,
    ]
    .into_iter()
    .find(|status| status.label().to_ascii_lowercase() == wanted)
    .ok_or_else(|| CommandError::InvalidArguments(format!("unknown status `{}`", raw)))
}
