use crate::cli::core::{print_call, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::core::controller::NagCycleOutcome;
use crate::domain::{Transaction, TransactionStatus};
use crate::lifecycle::CallResolution;

use super::require_arg;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("call", "Show the call that is ringing", "call", cmd_call),
        CommandEntry::new(
            "answer",
            "Answer the ringing call",
            "answer <return|keep>",
            cmd_answer,
        )
        .with_choices(&["return", "keep"]),
        CommandEntry::new(
            "decline",
            "Decline the ringing call (counts as keeping)",
            "decline",
            cmd_decline,
        ),
        CommandEntry::new(
            "hangup",
            "Drop a call that cannot be played",
            "hangup",
            cmd_hangup,
        ),
        CommandEntry::new(
            "nag",
            "Check for due follow-up calls now",
            "nag",
            cmd_nag,
        ),
    ]
}

fn cmd_call(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let Some(call) = context.block_on(context.controller.active_call()) else {
        io::print_info("No call right now.");
        return Ok(());
    };
    let item = context
        .block_on(context.controller.transaction(call.transaction_id))?
        .item;
    print_call(&call, &item);
    Ok(())
}

fn cmd_answer(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let choice = require_arg(args, 0, "answer <return|keep>")?;
    let resolution = match choice.to_ascii_lowercase().as_str() {
        "return" | "r" => CallResolution::Return,
        "keep" | "k" => CallResolution::Keep,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "answer with `return` or `keep`, not `{}`",
                other
            )))
        }
    };
    let txn = context.block_on(context.controller.resolve_call(resolution))?;
    report_resolution(context, &txn);
    Ok(())
}

fn cmd_decline(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let txn = context.block_on(context.controller.decline_call())?;
    report_resolution(context, &txn);
    Ok(())
}

fn cmd_hangup(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.block_on(context.controller.abandon_call())?;
    io::print_info("Call dropped; the purchase stays flagged.");
    Ok(())
}

fn cmd_nag(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.block_on(context.controller.run_nag_cycle())? {
        NagCycleOutcome::Busy => io::print_info("A call is already in progress."),
        NagCycleOutcome::Idle => io::print_info("No follow-up calls are due."),
        NagCycleOutcome::Staged(_) => {}
        NagCycleOutcome::Dropped(_) => {
            io::print_info("The purchase was settled before its follow-up was ready.")
        }
        NagCycleOutcome::Failed(id) => {
            let txn = context.block_on(context.controller.transaction(id))?;
            io::print_warning(format!(
                "Could not prepare the follow-up for {}: {}",
                txn.item,
                txn.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }
    Ok(())
}

fn report_resolution(context: &ShellContext, txn: &Transaction) {
    match txn.status {
        TransactionStatus::Returned => io::print_success(format!(
            "Good call. {} saved by returning {}.",
            context.format_amount(txn.amount),
            txn.item
        )),
        TransactionStatus::Kept => io::print_warning(format!(
            "{} kept after {} calls. The calls stop here.",
            txn.item, txn.nag_count
        )),
        _ => match txn.next_nag_at {
            Some(next) => io::print_warning(format!(
                "{} kept for now. Expect another call after {}.",
                txn.item,
                next.format("%Y-%m-%d %H:%M UTC")
            )),
            None => io::print_info(format!("{} kept and flagged.", txn.item)),
        },
    }
}
