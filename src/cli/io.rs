//! Thin layer between command handlers and the terminal.

use std::fmt;

use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::cli::core::CommandError;
use crate::cli::output;

pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

/// A line of the caller's script, quoted.
pub fn print_spoken(script: &str) {
    output::call(format!("\"{}\"", script.trim()));
}

/// Yes/no prompt; `default` is picked when the user just presses enter.
pub fn confirm_action(prompt: &str, default: bool) -> Result<bool, CommandError> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
