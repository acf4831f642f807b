use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::domain::{AiTone, UserProfile};

use super::{parse_amount, require_arg};

const ONBOARD_USAGE: &str = "onboard <income> <goal-name> <goal-amount> [weakness]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "onboard",
            "Create or replace your profile",
            ONBOARD_USAGE,
            cmd_onboard,
        ),
        CommandEntry::new("profile", "Show your profile", "profile", cmd_profile),
        CommandEntry::new(
            "tone",
            "Show or set how harsh the calls are",
            "tone [encouraging|stern|ruthless]",
            cmd_tone,
        )
        .with_choices(&["encouraging", "stern", "ruthless"]),
        CommandEntry::new(
            "clear-history",
            "Start over with the example purchases",
            "clear-history",
            cmd_clear_history,
        ),
    ]
}

fn cmd_onboard(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let income = parse_amount(require_arg(args, 0, ONBOARD_USAGE)?)?;
    let goal_name = require_arg(args, 1, ONBOARD_USAGE)?;
    let goal_amount = parse_amount(require_arg(args, 2, ONBOARD_USAGE)?)?;
    let weakness = args.get(3..).map(|rest| rest.join(" ")).unwrap_or_default();

    let profile = UserProfile::new(income, weakness, goal_name, goal_amount);
    context.block_on(context.controller.save_profile(profile))?;
    io::print_success(format!(
        "Profile saved. Saving toward {} ({}).",
        goal_name,
        context.format_amount(goal_amount)
    ));
    Ok(())
}

fn cmd_profile(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let state = context.block_on(context.controller.snapshot());
    let Some(profile) = state.profile else {
        io::print_warning("No profile yet.");
        io::print_info(format!("Usage: {}", ONBOARD_USAGE));
        return Ok(());
    };
    output_section("Profile");
    io::print_info(format!(
        "  Monthly income : {}",
        context.format_amount(profile.monthly_income)
    ));
    io::print_info(format!(
        "  Goal           : {} ({})",
        profile.goal_name,
        context.format_amount(profile.goal_amount)
    ));
    if !profile.weakness.is_empty() {
        io::print_info(format!("  Weakness       : {}", profile.weakness));
    }
    io::print_info(format!("  Tone           : {}", state.tone));
    Ok(())
}

fn cmd_tone(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        None => {
            let state = context.block_on(context.controller.snapshot());
            io::print_info(format!("Current tone: {}", state.tone));
        }
        Some(raw) => {
            let tone: AiTone = raw.parse()?;
            context.block_on(context.controller.set_tone(tone))?;
            io::print_success(format!("Tone set to {}.", tone));
        }
    }
    Ok(())
}

fn cmd_clear_history(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if !context.confirm("Erase all purchases, your profile and tone?")? {
        io::print_info("Nothing was cleared.");
        return Ok(());
    }
    context.block_on(context.controller.clear_history())?;
    io::print_success("History cleared; example purchases restored.");
    Ok(())
}

