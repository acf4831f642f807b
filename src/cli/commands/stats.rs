use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::core::services::LeaderboardView;
use crate::domain::Category;

use super::{require_arg, CATEGORY_CHOICES};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("stats", "Show savings and badges", "stats", cmd_stats),
        CommandEntry::new(
            "leaderboard",
            "Compare your savings with other savers",
            "leaderboard [monthly|overall]",
            cmd_leaderboard,
        )
        .with_choices(&["monthly", "overall"]),
        CommandEntry::new(
            "tip",
            "Get a money-saving tip for a category",
            "tip <category>",
            cmd_tip,
        )
        .with_choices(CATEGORY_CHOICES),
    ]
}

fn cmd_stats(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let summary = context.block_on(context.controller.summary());
    let progress = context.block_on(context.controller.goal_progress());

    output_section("Savings");
    if summary.using_examples {
        io::print_info("Showing example data until you log your first purchase.");
    }
    io::print_info(format!(
        "  Total saved   : {}",
        context.format_amount(summary.total_saved)
    ));
    io::print_info(format!(
        "  This month    : {}",
        context.format_amount(summary.monthly_saved)
    ));
    io::print_info(format!(
        "  To your goal  : {}",
        context.format_amount(summary.goal_allocation)
    ));
    io::print_info(format!(
        "  Back to bank  : {}",
        context.format_amount(summary.bank_refund)
    ));
    if let Some(progress) = progress {
        io::print_info(format!("  Goal progress : {:.1}%", progress));
    }
    io::print_info(format!(
        "  Badges        : {} returned, {} kept",
        summary.returned_count, summary.kept_count
    ));
    Ok(())
}

fn cmd_leaderboard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let view = match args.first() {
        Some(raw) => raw.parse::<LeaderboardView>()?,
        None => context.config.leaderboard_view,
    };
    let board = context.block_on(context.controller.leaderboard(view));
    output_section(format!("Leaderboard ({})", board.view));
    for entry in &board.entries {
        let line = format!(
            "{:>3}. {:<12} {:>10}  {}",
            entry.rank,
            entry.name,
            context.format_amount(entry.saved),
            entry.tier
        );
        if entry.is_user {
            io::print_success(line);
        } else {
            io::print_info(line);
        }
    }
    Ok(())
}

fn cmd_tip(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let category: Category = require_arg(args, 0, "tip <category>")?.parse()?;
    let tip = context.block_on(context.controller.financial_tip(category))?;
    io::print_info(format!("Tip for {}: {}", category, tip));
    Ok(())
}
