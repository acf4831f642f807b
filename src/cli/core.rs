use std::{io, sync::Arc};

use chrono::{DateTime, Utc};
use strsim::levenshtein;
use tokio::runtime::Runtime;
use tracing::warn;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    core::{
        controller::AppController,
        time::{Clock, SystemClock},
        utils::PathResolver,
    },
    domain::{CallKind, CallState, Transaction},
    errors::ConscienceError,
    gateway::OfflineGateway,
    scheduler::{NagScheduler, SchedulerHandle},
    storage::JsonStorage,
};

use super::commands;
use super::io as cli_io;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub controller: AppController,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub running: bool,
    runtime: Runtime,
    scheduler: Option<SchedulerHandle>,
    announced_call: Option<(Uuid, DateTime<Utc>)>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let base = PathResolver::base_dir();
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load().unwrap_or_else(|err| {
            warn!(error = %err, "unusable config; falling back to defaults");
            Config::default()
        });
        let storage = JsonStorage::new(Some(base))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let gateway = Arc::new(OfflineGateway::new(Arc::clone(&clock)));
        let controller =
            AppController::bootstrap(gateway, Arc::new(storage), clock, config.nag_policy());

        // Script runs stay deterministic; follow-ups there come from `nag`.
        let scheduler = match mode {
            CliMode::Interactive => {
                let _guard = runtime.enter();
                Some(NagScheduler::spawn(
                    controller.clone(),
                    config.poll_interval(),
                ))
            }
            CliMode::Script => None,
        };

        Ok(Self {
            mode,
            registry,
            controller,
            config_manager,
            config,
            running: true,
            runtime,
            scheduler,
            announced_call: None,
        })
    }

    /// Runs a controller future to completion on the shell's runtime.
    pub(crate) fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        if self.block_on(self.controller.active_call()).is_some() {
            "conscience (ringing)> ".into()
        } else {
            "conscience> ".into()
        }
    }

    pub(crate) fn format_amount(&self, amount: f64) -> String {
        self.config.format_amount(amount)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&raw.to_lowercase(), raw, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action("Exit shell?", true)?)
    }

    /// Asks before destructive commands; script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                self.print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Core(ConscienceError::TransactionNotFound(_)) => {
                self.print_error("No purchase matches that reference.");
                self.print_hint("Use `list` to see numbers and ids.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }

    pub(crate) fn print_hint(&self, message: &str) {
        cli_io::print_info(message);
    }

    /// Shows a call that appeared since the last announcement.
    pub(crate) fn announce_call(&mut self) {
        let Some(call) = self.block_on(self.controller.active_call()) else {
            self.announced_call = None;
            return;
        };
        let key = (call.transaction_id, call.started_at);
        if self.announced_call == Some(key) {
            return;
        }
        self.announced_call = Some(key);
        let item = self
            .block_on(self.controller.transaction(call.transaction_id))
            .map(|txn| txn.item)
            .unwrap_or_else(|_| "your purchase".into());
        print_call(&call, &item);
    }

    /// Resolves a list number (1-based, newest first) or an id prefix.
    pub(crate) fn resolve_transaction(&self, reference: &str) -> Result<Transaction, CommandError> {
        let transactions = self.block_on(self.controller.transactions());
        if let Ok(index) = reference.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|idx| transactions.get(idx).cloned())
                .ok_or_else(|| {
                    CommandError::InvalidArguments(format!(
                        "no purchase numbered {} (the list has {})",
                        reference,
                        transactions.len()
                    ))
                });
        }
        let needle = reference.to_ascii_lowercase();
        let mut matches = transactions
            .into_iter()
            .filter(|txn| txn.id.simple().to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(txn), None) => Ok(txn),
            (Some(_), Some(_)) => Err(CommandError::InvalidArguments(format!(
                "id prefix `{}` is ambiguous",
                reference
            ))),
            (None, _) => Err(CommandError::InvalidArguments(format!(
                "no purchase with id starting `{}`",
                reference
            ))),
        }
    }

    pub(crate) fn shutdown(&mut self) {
        if let Some(handle) = self.scheduler.take() {
            self.runtime.block_on(handle.shutdown());
        }
    }
}

impl Drop for ShellContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub(crate) fn print_call(call: &CallState, item: &str) {
    let heading = match call.kind {
        CallKind::Verdict => format!("Incoming call about {item}"),
        CallKind::FollowUp { number } => format!("Incoming call about {item} (follow-up #{number})"),
    };
    super::output::section(heading);
    cli_io::print_spoken(call.script());
    cli_io::print_info(format!("  Why: {}", call.analysis.reasoning));
    match &call.audio {
        Some(handle) => cli_io::print_info(format!("  Audio: {}", handle.as_str())),
        None => cli_io::print_info("  Audio: unavailable, read the script above"),
    }
    cli_io::print_info("Answer with `answer return`, `answer keep`, or `decline`.");
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] ConscienceError),
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Command(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] ConscienceError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Input(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn process_script(lines: &[&str]) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::new(CliMode::Script)?;
    for line in lines {
        match app.process_line(line)? {
            LoopControl::Continue => {}
            LoopControl::Exit => break,
        }
    }
    Ok(app)
}
