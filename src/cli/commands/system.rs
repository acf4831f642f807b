use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::core::utils::PathResolver;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new(
            "config",
            "Show or change settings",
            "config [currency <symbol> | nag-interval <seconds> | poll-interval <seconds> | leaderboard <monthly|overall>]",
            cmd_config,
        )
        .with_choices(&["currency", "nag-interval", "poll-interval", "leaderboard"]),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
        CommandEntry::new("quit", "Exit the shell", "quit", cmd_exit),
    ]
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output_section(format!("Conscience Core {}", meta.version));
    io::print_info(format!("  CLI version  : {}", build_info::CLI_VERSION));
    io::print_info(format!("  Build hash   : {}", meta.git_hash));
    io::print_info(format!("  Built at     : {}", meta.timestamp));
    io::print_info(format!("  Target       : {}", meta.target));
    io::print_info(format!("  Profile      : {}", meta.profile));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(command) = args.first().map(|name| name.to_lowercase()) {
        if let Some(command) = context.command(&command) {
            help::print_command(command);
        } else {
            context.suggest_command(args[0]);
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(key) = args.first() else {
        let config = &context.config;
        output_section("Settings");
        io::print_info(format!("  Data dir      : {}", PathResolver::base_dir().display()));
        io::print_info(format!("  Currency      : {}", config.currency_symbol));
        io::print_info(format!("  Nag interval  : {}s", config.nag_interval_secs));
        io::print_info(format!("  Poll interval : {}s", config.poll_interval_secs));
        io::print_info(format!("  Leaderboard   : {}", config.leaderboard_view));
        return Ok(());
    };
    let value = args
        .get(1)
        .ok_or_else(|| CommandError::InvalidArguments(format!("`config {}` needs a value", key)))?;

    let mut updated = context.config.clone();
    match key.to_ascii_lowercase().as_str() {
        "currency" => updated.currency_symbol = value.to_string(),
        "nag-interval" => updated.nag_interval_secs = parse_seconds(value)?,
        "poll-interval" => updated.poll_interval_secs = parse_seconds(value)? as u64,
        "leaderboard" => updated.leaderboard_view = value.parse()?,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown setting `{}`",
                other
            )))
        }
    }
    context.config_manager.save(&updated)?;
    context.config = updated;
    io::print_success(format!("Saved `{}`; interval changes apply on next start.", key));
    Ok(())
}

fn parse_seconds(input: &str) -> Result<i64, CommandError> {
    input
        .parse::<i64>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!("`{}` is not a positive number of seconds", input))
        })
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
